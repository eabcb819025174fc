//! Path: native/transdim_core/src/lib.rs
//! Summary: 2 つの世界を行き来するタイル型プラットフォーマーのコアロジック
//!
//! タイルマップ・衝突解決・プレイヤー操作・世界切り替えフェード・ブロック転送を
//! `GameSession` が 1 tick ずつ進める。描画・音・ウィンドウは扱わない。

pub mod constants;
pub mod controller;
pub mod event;
pub mod input;
pub mod level;
pub mod physics;
pub mod player;
pub mod session;
pub mod snapshot;
pub mod tile;
pub mod transfer;
pub mod transition;
pub mod world;

pub use event::FrameEvent;
pub use input::{Actions, FrameInput, InputTracker};
pub use level::{LevelDocument, LevelError};
pub use session::{GameSession, Phase};
pub use snapshot::{build_render_frame, RenderFrame};
pub use world::WorldId;
