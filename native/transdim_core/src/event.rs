//! Path: native/transdim_core/src/event.rs
//! Summary: 1 tick 内で発生したゲームイベント（オーディオ・HUD・レベル遷移の通知用）

use crate::transfer::PlacementRejection;
use crate::world::WorldId;

/// tick 内で発生したイベント。`GameSession::drain_events` で毎フレーム取り出す
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// 両方の世界のレベルが揃いゲーム開始
    LevelsReady,
    FadeStarted,
    WorldSwitched     { to: WorldId },
    BlockPickedUp,
    BlockPlaced       { row: usize, col: usize },
    PlacementRejected { reason: PlacementRejection },
    HudActivated,
    Respawned,
    ReachedNextLevel  { target_a: String, target_b: String },
    GameCompleted,
}
