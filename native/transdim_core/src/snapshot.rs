//! Path: native/transdim_core/src/snapshot.rs
//! Summary: GameSession から描画用スナップショット（RenderFrame）を構築
//!
//! 描画側はセッションを直接触らず、毎フレームこのコピーだけを読む。

use crate::constants::TILE_SIZE;
use crate::player::{Facing, PlayerState};
use crate::session::{GameSession, Phase};
use crate::tile::TileCode;
use crate::world::WorldId;

/// 描画するタイル 1 枚（ワールド座標）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSprite {
    pub x:    f32,
    pub y:    f32,
    pub code: TileCode,
}

/// プレイヤーのスプライト（画面座標）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSprite {
    pub x:      f32,
    pub y:      f32,
    pub width:  f32,
    pub height: f32,
    pub facing: Facing,
    pub frame:  u8,
}

/// HUD 描画用データ
#[derive(Clone, Debug, PartialEq)]
pub struct HudData {
    pub phase:         Phase,
    pub world:         WorldId,
    pub show_hud:      bool,
    pub carrying:      bool,
    /// 0.0 = 透明, 1.0 = 真っ黒
    pub fade_opacity:  f32,
    /// 設置失敗メッセージ（表示中のみ Some）
    pub place_message: Option<String>,
    pub hint:          Option<String>,
    /// 案内タイルの "?" を描く画面座標（タイル中心）
    pub markers:       Vec<(f32, f32)>,
}

impl Default for HudData {
    fn default() -> Self {
        Self {
            phase:         Phase::Loading,
            world:         WorldId::A,
            show_hud:      false,
            carrying:      false,
            fade_opacity:  0.0,
            place_message: None,
            hint:          None,
            markers:       Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
    pub tiles:         Vec<TileSprite>,
    pub player:        Option<PlayerSprite>,
    /// 世界 B にいる間、世界 A に残したプレイヤーを半透明で描く
    pub ghost:         Option<PlayerSprite>,
    /// ワールド → 画面の平行移動量（= アクティブプレイヤーのビュー）
    pub camera_offset: (f32, f32),
    pub hud:           HudData,
}

fn sprite_at(x: f32, y: f32, p: &PlayerState, facing: Facing, frame: u8) -> PlayerSprite {
    PlayerSprite { x, y, width: p.params.width, height: p.params.height, facing, frame }
}

pub fn build_render_frame(session: &GameSession) -> RenderFrame {
    let fade_opacity = session.fade().opacity();
    let place_message = session.notice().message().map(str::to_owned);

    let Some(player) = session.active_player() else {
        return RenderFrame {
            hud: HudData { phase: session.phase(), fade_opacity, place_message, ..HudData::default() },
            ..RenderFrame::default()
        };
    };
    let world = session.current_world();
    let view = player.view;

    // 1. タイル（Empty は描かない）
    let tiles = session
        .tiles()
        .iter()
        .filter(|t| t.code != TileCode::Empty)
        .map(|t| TileSprite { x: t.position.x, y: t.position.y, code: t.code })
        .collect();

    // 2. プレイヤー
    let anim = session.animation();
    let sprite = sprite_at(player.position.x, player.position.y, player, anim.facing, anim.frame());

    // 3. 世界 A のプレイヤーの残像（常に待機の先頭フレーム）
    let ghost = match (world, session.player_in(WorldId::A)) {
        (WorldId::B, Some(a)) => {
            let pos = a.view + a.position - view;
            Some(sprite_at(pos.x, pos.y, a, Facing::Idle, 0))
        }
        _ => None,
    };

    // 4. 案内タイルの位置
    let markers = session
        .worlds()
        .map(|w| {
            w.get(world)
                .markers
                .iter()
                .map(|m| {
                    (
                        m.position.x + TILE_SIZE / 2.0 - view.x,
                        m.position.y + TILE_SIZE / 2.0 - view.y,
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    RenderFrame {
        tiles,
        player: Some(sprite),
        ghost,
        camera_offset: (view.x, view.y),
        hud: HudData {
            phase: session.phase(),
            world,
            show_hud: session.show_hud(),
            carrying: session.is_carrying(),
            fade_opacity,
            place_message,
            hint: session.hint().map(str::to_owned),
            markers,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Actions, FrameInput};
    use crate::level::LevelDocument;
    use serde_json::json;

    fn session() -> GameSession {
        let doc = |spawn_x: i64| -> LevelDocument {
            serde_json::from_value(json!({
                "map": [[0, 0, 0, 0], [0, 0, 3, 0], [1, 1, 1, 1]],
                "spawnpoint": {"x": spawn_x, "y": 64},
                "informationalTiles": [{"x": 192, "y": 0, "text": "hi"}]
            }))
            .unwrap()
        };
        let mut s = GameSession::new();
        s.submit_level(WorldId::A, doc(0)).unwrap();
        s.submit_level(WorldId::B, doc(128)).unwrap();
        s
    }

    #[test]
    fn loading_frame_has_no_player() {
        let frame = build_render_frame(&GameSession::new());
        assert!(frame.player.is_none());
        assert!(frame.tiles.is_empty());
        assert_eq!(frame.hud.phase, Phase::Loading);
    }

    #[test]
    fn playing_frame_skips_empty_tiles() {
        let mut s = session();
        s.step(&FrameInput::default(), 1.0 / 60.0);
        let frame = build_render_frame(&s);
        assert_eq!(frame.tiles.len(), 5);
        assert!(frame.tiles.iter().any(|t| t.code == TileCode::Transferable && t.x == 128.0));
        assert_eq!(frame.hud.world, WorldId::A);
        assert!(frame.ghost.is_none());
        assert_eq!(frame.hud.markers, vec![(224.0, 32.0)]);
        let p = frame.player.unwrap();
        assert_eq!((p.width, p.height), (37.0, 64.0));
    }

    #[test]
    fn ghost_is_drawn_in_world_b() {
        let mut s = session();
        s.step(&FrameInput { held: Actions::TOGGLE_WORLD, pressed: Actions::TOGGLE_WORLD }, 1.0 / 60.0);
        while s.is_fading() {
            let frame = build_render_frame(&s);
            assert!((0.0..=1.0).contains(&frame.hud.fade_opacity));
            s.step(&FrameInput::default(), 1.0 / 60.0);
        }
        let frame = build_render_frame(&s);
        assert_eq!(frame.hud.world, WorldId::B);
        assert!(frame.hud.show_hud);
        let ghost = frame.ghost.unwrap();
        assert_eq!(ghost.x, 0.0);
        assert_eq!(frame.hud.hint.as_deref(), Some(crate::constants::BLOCK_PICKUP_PROMPT));
    }
}
