//! Path: native/transdim_core/src/player.rs
//! Summary: プレイヤーの運動状態・物理パラメータ・世界ごとの保存スロット・アニメーションカウンタ

use crate::constants::{
    IDLE_ANIM_FRAMES, IDLE_ANIM_STEPS, PLAYER_ACCELERATION, PLAYER_FRICTION, PLAYER_GRAVITY,
    PLAYER_HEIGHT, PLAYER_SPEED, PLAYER_WIDTH, RUN_ANIM_FRAMES, RUN_ANIM_STEPS,
};
use crate::physics::aabb::{Aabb, Vec2};
use crate::world::WorldId;

/// プレイヤーの物理パラメータ
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerParams {
    pub width:        f32,
    pub height:       f32,
    pub gravity:      f32,
    /// 0 < friction < 1
    pub friction:     f32,
    /// 横方向の最大速度
    pub speed:        f32,
    pub acceleration: f32,
}

impl Default for PlayerParams {
    fn default() -> Self {
        Self {
            width:        PLAYER_WIDTH,
            height:       PLAYER_HEIGHT,
            gravity:      PLAYER_GRAVITY,
            friction:     PLAYER_FRICTION,
            speed:        PLAYER_SPEED,
            acceleration: PLAYER_ACCELERATION,
        }
    }
}

/// プレイヤー状態。`position` は画面座標、ワールド座標は `view + position`
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub params:   PlayerParams,
    pub jumping:  bool,
    pub grounded: bool,
    /// カメラ（ワールドスクロール）オフセット
    pub view:     Vec2,
}

impl PlayerState {
    pub fn new(spawn: Vec2, params: PlayerParams) -> Self {
        Self {
            position: spawn,
            velocity: Vec2::ZERO,
            params,
            jumping:  false,
            grounded: false,
            view:     Vec2::ZERO,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.params.width, self.params.height)
    }

    /// 画面座標の矩形
    pub fn screen_bounds(&self) -> Aabb {
        Aabb::new(self.position, self.size())
    }

    /// ワールド座標の矩形
    pub fn world_bounds(&self) -> Aabb {
        Aabb::new(self.view + self.position, self.size())
    }

    /// スポーン地点へ戻す（速度・ビューもリセット）
    pub fn respawn(&mut self, spawn: Vec2) {
        *self = Self::new(spawn, self.params);
    }
}

/// アクティブなプレイヤーと、世界ごとの保存スロット。
///
/// 世界の切り替え（`switch_to`）だけがアクティブなプレイヤーを入れ替える。
#[derive(Clone, Debug)]
pub struct PlayerSlots {
    current: WorldId,
    active:  PlayerState,
    stored:  [PlayerState; 2],
}

impl PlayerSlots {
    /// 両方の世界のプレイヤーをスポーン地点に置き、世界 A をアクティブにする
    pub fn new(spawn_a: Vec2, spawn_b: Vec2, params: PlayerParams) -> Self {
        let a = PlayerState::new(spawn_a, params);
        let b = PlayerState::new(spawn_b, params);
        Self { current: WorldId::A, active: a.clone(), stored: [a, b] }
    }

    pub fn current(&self) -> WorldId {
        self.current
    }

    pub fn active(&self) -> &PlayerState {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut PlayerState {
        &mut self.active
    }

    /// 指定世界のプレイヤー（アクティブ側なら生きている状態、そうでなければ保存スロット）
    pub fn player_in(&self, world: WorldId) -> &PlayerState {
        if world == self.current {
            &self.active
        } else {
            &self.stored[world.index()]
        }
    }

    /// 出ていく世界のスロットへ現在の状態を保存し、入ってくる世界のスロットを読み込む
    pub fn switch_to(&mut self, incoming: WorldId) {
        if incoming == self.current {
            return;
        }
        self.stored[self.current.index()] = self.active.clone();
        self.active = self.stored[incoming.index()].clone();
        self.current = incoming;
    }
}

/// 向き（スプライト選択用）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Idle,
    Right,
    Left,
}

/// フレーム数と待ち tick 数を持つループアニメーション
#[derive(Clone, Copy, Debug)]
pub struct SpriteCounter {
    frames:        u8,
    steps:         u8,
    current_step:  u8,
    current_frame: u8,
}

impl SpriteCounter {
    pub const fn new(frames: u8, steps: u8) -> Self {
        Self { frames, steps, current_step: 0, current_frame: 0 }
    }

    pub fn tick(&mut self) {
        if self.current_step < self.steps {
            self.current_step += 1;
            return;
        }
        self.current_step = 0;
        self.current_frame = if self.current_frame + 1 < self.frames { self.current_frame + 1 } else { 0 };
    }

    pub fn frame(&self) -> u8 {
        self.current_frame
    }
}

/// 待機・走りのアニメーション状態
#[derive(Clone, Copy, Debug)]
pub struct PlayerAnimation {
    idle:       SpriteCounter,
    run:        SpriteCounter,
    pub facing: Facing,
}

impl Default for PlayerAnimation {
    fn default() -> Self {
        Self {
            idle:   SpriteCounter::new(IDLE_ANIM_FRAMES, IDLE_ANIM_STEPS),
            run:    SpriteCounter::new(RUN_ANIM_FRAMES, RUN_ANIM_STEPS),
            facing: Facing::Idle,
        }
    }
}

impl PlayerAnimation {
    /// 待機カウンタは常に進め、走りカウンタは移動キーが押されている間だけ進める
    pub fn tick(&mut self, left_held: bool, right_held: bool) {
        self.idle.tick();
        self.facing = match (left_held, right_held) {
            (false, false) => Facing::Idle,
            (true, _) => Facing::Left,
            (false, true) => Facing::Right,
        };
        if self.facing != Facing::Idle {
            self.run.tick();
        }
    }

    /// 現在の向きで表示するフレーム番号
    pub fn frame(&self) -> u8 {
        match self.facing {
            Facing::Idle => self.idle.frame(),
            Facing::Right | Facing::Left => self.run.frame(),
        }
    }
}
