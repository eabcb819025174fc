//! Path: native/transdim_core/src/transition.rs
//! Summary: 世界切り替えのフェード状態機械（暗転 → 中間点でプレイヤー/世界を交換 → 明転）

use crate::constants::{FADE_IN_STEP, FADE_OUT_STEP, FADE_SWAP_OPACITY};
use crate::player::PlayerSlots;
use crate::world::WorldId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FadePhase {
    #[default]
    Idle,
    /// 不透明度 → 1
    FadingOut,
    /// 不透明度 → 0
    FadingIn,
}

/// `Fade::tick` の結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeTick {
    Idle,
    Progress,
    /// 暗転しきった。この tick で世界を交換する
    Swap,
    /// 明転しきって Idle に戻った
    Finished,
}

/// フェードの不透明度と向き
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    opacity:  f32,
    phase:    FadePhase,
    out_step: f32,
    in_step:  f32,
}

impl Default for Fade {
    fn default() -> Self {
        Self::new(FADE_OUT_STEP, FADE_IN_STEP)
    }
}

impl Fade {
    pub fn new(out_step: f32, in_step: f32) -> Self {
        Self { opacity: 0.0, phase: FadePhase::Idle, out_step, in_step }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    pub fn is_fading(&self) -> bool {
        self.phase != FadePhase::Idle
    }

    /// 暗転を開始する。フェード中なら何もせず false
    pub fn start(&mut self) -> bool {
        if self.is_fading() {
            return false;
        }
        self.phase = FadePhase::FadingOut;
        true
    }

    pub fn tick(&mut self) -> FadeTick {
        match self.phase {
            FadePhase::Idle => FadeTick::Idle,
            FadePhase::FadingOut => {
                if self.opacity < 1.0 {
                    self.opacity += self.out_step;
                }
                if self.opacity >= 1.0 {
                    self.opacity = FADE_SWAP_OPACITY;
                    self.phase = FadePhase::FadingIn;
                    FadeTick::Swap
                } else {
                    FadeTick::Progress
                }
            }
            FadePhase::FadingIn => {
                if self.opacity > 0.0 {
                    self.opacity -= self.in_step;
                }
                if self.opacity <= 0.0 {
                    self.opacity = 0.0;
                    self.phase = FadePhase::Idle;
                    FadeTick::Finished
                } else {
                    FadeTick::Progress
                }
            }
        }
    }

    /// 定数はそのままで Idle に戻す
    pub fn reset(&mut self) {
        self.opacity = 0.0;
        self.phase = FadePhase::Idle;
    }

    #[cfg(test)]
    pub(crate) fn with_state(opacity: f32, phase: FadePhase) -> Self {
        Self { opacity, phase, ..Self::default() }
    }
}

/// フェードと、その中間点でのアクティブ世界/プレイヤー交換をまとめて扱う
#[derive(Clone, Copy, Debug, Default)]
pub struct WorldTransition {
    fade: Fade,
}

impl WorldTransition {
    pub fn new(fade: Fade) -> Self {
        Self { fade }
    }

    pub fn fade(&self) -> &Fade {
        &self.fade
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_fading()
    }

    pub fn reset(&mut self) {
        self.fade.reset();
    }

    /// 世界切り替え要求。フェード中は無視して false
    pub fn request_toggle(&mut self) -> bool {
        self.fade.start()
    }

    /// 1 tick 進める。交換が起きたら入ってきた世界を返す
    pub fn tick(&mut self, players: &mut PlayerSlots) -> Option<WorldId> {
        match self.fade.tick() {
            FadeTick::Swap => {
                let incoming = players.current().other();
                players.switch_to(incoming);
                Some(incoming)
            }
            FadeTick::Idle | FadeTick::Progress | FadeTick::Finished => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::aabb::Vec2;
    use crate::player::PlayerParams;

    #[test]
    fn fade_out_reaches_swap_then_fades_in() {
        let mut fade = Fade::default();
        assert!(fade.start());
        let mut ticks = 0;
        loop {
            ticks += 1;
            match fade.tick() {
                FadeTick::Progress => continue,
                FadeTick::Swap => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        // 0.09 × 12 = 1.08
        assert_eq!(ticks, 12);
        assert_eq!(fade.opacity(), FADE_SWAP_OPACITY);
        assert_eq!(fade.phase(), FadePhase::FadingIn);

        let mut ticks = 0;
        while fade.tick() == FadeTick::Progress {
            ticks += 1;
        }
        assert_eq!(fade.phase(), FadePhase::Idle);
        assert_eq!(fade.opacity(), 0.0);
        assert!(ticks >= 19);
    }

    #[test]
    fn start_is_ignored_while_fading() {
        let mut fade = Fade::with_state(0.5, FadePhase::FadingOut);
        assert!(!fade.start());
        assert_eq!(fade.phase(), FadePhase::FadingOut);
        assert_eq!(fade.opacity(), 0.5);
    }

    #[test]
    fn opacity_stays_in_unit_range() {
        let mut fade = Fade::default();
        fade.start();
        for _ in 0..100 {
            fade.tick();
            assert!((0.0..=1.0).contains(&fade.opacity()));
        }
    }

    #[test]
    fn full_cycle_swaps_exactly_once() {
        let mut players = PlayerSlots::new(Vec2::new(64.0, 64.0), Vec2::new(128.0, 64.0), PlayerParams::default());
        players.active_mut().velocity = Vec2::new(1.25, 0.5);
        let before = players.active().clone();

        let mut transition = WorldTransition::default();
        assert!(transition.request_toggle());
        let mut swaps = Vec::new();
        for _ in 0..200 {
            if let Some(to) = transition.tick(&mut players) {
                swaps.push(to);
            }
            if !transition.is_fading() {
                break;
            }
            assert!(!transition.request_toggle());
        }
        assert_eq!(swaps, vec![WorldId::B]);
        assert_eq!(players.current(), WorldId::B);
        assert_eq!(players.player_in(WorldId::A), &before);

        transition.request_toggle();
        while transition.tick(&mut players).is_none() {}
        assert_eq!(players.current(), WorldId::A);
        assert_eq!(players.active(), &before);
    }
}
