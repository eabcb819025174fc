//! Path: native/transdim_core/src/controller.rs
//! Summary: プレイヤー 1 tick の更新（入力 → 加速/スクロール → ジャンプ → 摩擦・重力 → 積分 → タイル衝突 → クランプ）

use crate::constants::{JUMP_IMPULSE_MULTIPLIER, SCREEN_WIDTH, SCROLL_DEADZONE, TILE_SIZE};
use crate::physics::tile_collision::{resolve_tile_overlap, CollisionSide};
use crate::player::PlayerState;
use crate::tile::{Tile, TileCode};

/// 1 tick ぶんの移動入力
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub left:  bool,
    pub right: bool,
    /// 押した瞬間だけ true
    pub jump:  bool,
}

/// プレイヤーを 1 tick 進める。
///
/// `tiles` はアクティブ世界の派生タイルリスト（ワールド座標）。行優先の順に 1 枚ずつ解決し、
/// 同じ tick で複数タイルに当たった場合は後のタイルの速度変更が残る。
/// `blocks_passable` が true のとき転送ブロックはすり抜ける（世界 B ではブロックは拾う対象）。
pub fn step_player(
    p: &mut PlayerState,
    intent: MoveIntent,
    tiles: &[Tile],
    blocks_passable: bool,
    map_width: f32,
) {
    let speed = p.params.speed;
    let accel = p.params.acceleration;

    // ── 横移動 / カメラスクロール ──────────────────────────────
    if intent.right {
        let in_deadzone = p.position.x + p.params.width < SCREEN_WIDTH - SCROLL_DEADZONE;
        let at_right_edge = p.view.x + SCREEN_WIDTH >= map_width;
        if in_deadzone || at_right_edge {
            if p.velocity.x < speed && p.position.x + p.params.width < SCREEN_WIDTH {
                p.velocity.x += accel;
            }
        } else {
            p.velocity.x = 0.0;
            p.view.x += speed;
        }
    }

    if intent.left {
        if p.position.x > SCROLL_DEADZONE || p.view.x <= 0.0 {
            if p.velocity.x > -speed && p.position.x > 0.0 {
                p.velocity.x -= accel;
            }
        } else {
            p.velocity.x = 0.0;
            p.view.x -= speed;
        }
    }

    // ── ジャンプ ──────────────────────────────────────────────
    if intent.jump && !p.jumping && p.grounded {
        p.jumping = true;
        p.grounded = false;
        p.velocity.y = -speed * JUMP_IMPULSE_MULTIPLIER;
    }

    // ── 摩擦・重力・積分 ──────────────────────────────────────
    p.velocity.x *= p.params.friction;
    p.velocity.y += p.params.gravity;
    p.grounded = false;
    p.position += p.velocity;

    // ── タイル衝突 ────────────────────────────────────────────
    let size = p.size();
    for tile in tiles {
        let collides = match tile.code {
            TileCode::Transferable => !blocks_passable,
            code => code.is_solid(),
        };
        if !collides {
            continue;
        }
        let screen_pos = tile.position - p.view;
        match resolve_tile_overlap(&mut p.position, size, screen_pos, TILE_SIZE) {
            Some(CollisionSide::Left | CollisionSide::Right) => {
                p.velocity.x = 0.0;
                p.jumping = false;
            }
            Some(CollisionSide::Bottom) => {
                p.grounded = true;
                p.jumping = false;
            }
            Some(CollisionSide::Top) => {
                // 天井は反発させる
                p.velocity.y = -p.velocity.y;
            }
            None => {}
        }
    }

    // ── 後処理クランプ ────────────────────────────────────────
    if p.grounded {
        p.velocity.y = 0.0;
    }
    p.position.x = p.position.x.clamp(0.0, SCREEN_WIDTH - p.params.width);
    p.view.x = p.view.x.clamp(0.0, (map_width - SCREEN_WIDTH).max(0.0));
}
