//! Path: native/transdim_core/src/constants.rs
//! Summary: 画面解像度・タイルサイズ・物理定数・フェード定数などの定数定義

// Background clear color (light grey, タイルシート背景に合わせる)
pub const BG_R: f64 = 0.93;
pub const BG_G: f64 = 0.93;
pub const BG_B: f64 = 0.95;

// Canvas resolution
pub const SCREEN_WIDTH:  f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 640.0;

// Tile grid
pub const TILE_SIZE: f32 = 64.0;

/// 画面左右端からのスクロール不感帯（px）。これより内側ではプレイヤー自身が動く
pub const SCROLL_DEADZONE: f32 = 384.0;

// Player body
pub const PLAYER_WIDTH:  f32 = 37.0;
pub const PLAYER_HEIGHT: f32 = 64.0;

// Player physics（1 tick あたりの値。dt スケーリングはしない）
pub const PLAYER_GRAVITY:      f32 = 0.6;
pub const PLAYER_FRICTION:     f32 = 0.85;
pub const PLAYER_SPEED:        f32 = 8.0;
pub const PLAYER_ACCELERATION: f32 = 1.0;

/// ジャンプ初速 = speed × この倍率（上向き）
pub const JUMP_IMPULSE_MULTIPLIER: f32 = 1.3;

// World fade（暗転 0.09 / 明転 0.05 の組み合わせで固定）
pub const FADE_OUT_STEP:     f32 = 0.09;
pub const FADE_IN_STEP:      f32 = 0.05;
/// 暗転完了時に不透明度をここまで戻す（完全な黒が 1 フレーム見えるのを避ける）
pub const FADE_SWAP_OPACITY: f32 = 0.999;

/// ブロック設置エラー表示の残り時間（秒）
pub const PLACE_ERROR_DURATION: f32 = 2.5;

// Fixed simulation rate
pub const TICK_RATE: f32 = 60.0;
pub const FRAME_DT:  f32 = 1.0 / TICK_RATE;

// Player animation（steps は次フレームに進むまでの待ち tick 数 - 1）
pub const IDLE_ANIM_FRAMES: u8 = 12;
pub const IDLE_ANIM_STEPS:  u8 = 5;
pub const RUN_ANIM_FRAMES:  u8 = 8;
pub const RUN_ANIM_STEPS:   u8 = 2;

pub const BLOCK_PICKUP_PROMPT: &str = "Press [E] to pick up the transdimensional block.";
