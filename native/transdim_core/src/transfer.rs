//! Path: native/transdim_core/src/transfer.rs
//! Summary: 転送ブロックの拾い上げ・設置ルールと、設置失敗メッセージのタイマー

use crate::constants::{PLACE_ERROR_DURATION, TILE_SIZE};
use crate::physics::aabb::{boxes_touch, Aabb, Vec2};
use crate::player::PlayerState;
use crate::tile::{Tile, TileCode};
use crate::world::{WorldId, WorldPair};

/// プレイヤーのセルの左右どちらに置くか
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceDirection {
    Left,
    Right,
}

impl PlaceDirection {
    fn offset(self) -> i64 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// 設置を拒否した理由（判定順）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementRejection {
    /// グリッド外。メッセージは出さない
    OutOfBounds,
    OccupiedInWorldB,
    OccupiedInWorldA,
    /// 世界 A に残したプレイヤーと重なる
    OverlapsWorldAPlayer,
}

impl PlacementRejection {
    /// プレイヤーに表示する文言
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::OutOfBounds => None,
            Self::OccupiedInWorldB => Some("Blocks can only be placed on blank areas."),
            Self::OccupiedInWorldA => Some("Blocks can only be placed on blank areas in world 1."),
            Self::OverlapsWorldAPlayer => Some("Blocks can't be placed where you're standing."),
        }
    }
}

/// プレイヤー（ワールド座標）と重なっている転送ブロックを拾う。
/// 拾えたら両グリッドからそのセルを消し、セル位置を返す。
pub fn try_pickup(worlds: &mut WorldPair, player: &PlayerState, tiles: &[Tile]) -> Option<(usize, usize)> {
    let body = player.world_bounds();
    let hit = tiles
        .iter()
        .filter(|t| t.code == TileCode::Transferable)
        .find(|t| boxes_touch(&body, &Aabb::square(t.position, TILE_SIZE)))?;
    worlds.set_transferable_cell(hit.row, hit.col, false);
    Some((hit.row, hit.col))
}

/// プレイヤーの現在セルの左右隣にブロックを置く。成功したら両グリッドに書き込んでセル位置を返す。
///
/// `player` はアクティブな世界 B のプレイヤー、`world_a_player` は世界 A に保存されたプレイヤー。
pub fn try_place(
    worlds: &mut WorldPair,
    player: &PlayerState,
    world_a_player: &PlayerState,
    direction: PlaceDirection,
) -> Result<(usize, usize), PlacementRejection> {
    let origin = player.view + player.position;
    let row = (origin.y / TILE_SIZE).floor() as i64;
    let col = (origin.x / TILE_SIZE).floor() as i64 + direction.offset();

    if !worlds.grid(WorldId::B).in_bounds(row, col) {
        return Err(PlacementRejection::OutOfBounds);
    }
    let (row, col) = (row as usize, col as usize);

    if !worlds.grid(WorldId::B).is_blank(row, col) {
        return Err(PlacementRejection::OccupiedInWorldB);
    }
    if !worlds.grid(WorldId::A).is_blank(row, col) {
        return Err(PlacementRejection::OccupiedInWorldA);
    }
    let cell = Aabb::square(Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE), TILE_SIZE);
    if boxes_touch(&world_a_player.world_bounds(), &cell) {
        return Err(PlacementRejection::OverlapsWorldAPlayer);
    }

    worlds.set_transferable_cell(row, col, true);
    Ok((row, col))
}

/// 設置失敗メッセージ。新しい失敗はタイマーを延長せずに最初からやり直す
#[derive(Clone, Copy, Debug, Default)]
pub struct PlacementNotice {
    message:   Option<&'static str>,
    remaining: f32,
}

impl PlacementNotice {
    pub fn show(&mut self, message: &'static str) {
        self.message = Some(message);
        self.remaining = PLACE_ERROR_DURATION;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining -= dt;
            if self.remaining <= 0.0 {
                self.remaining = 0.0;
                self.message = None;
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
