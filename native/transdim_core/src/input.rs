//! Path: native/transdim_core/src/input.rs
//! Summary: ゲーム操作（アクション）のビットフラグと、押下エッジ検出付きの入力トラッカー

use crate::controller::MoveIntent;

bitflags::bitflags! {
    /// 1 tick で参照するアクション
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct Actions: u8 {
        const MOVE_LEFT    = 1 << 0;
        const MOVE_RIGHT   = 1 << 1;
        const JUMP         = 1 << 2;
        const TOGGLE_WORLD = 1 << 3;
        const PICKUP       = 1 << 4;
        const PLACE_LEFT   = 1 << 5;
        const PLACE_RIGHT  = 1 << 6;
    }
}

/// 1 tick ぶんの入力。`held` は押し続け、`pressed` はこの tick で押された瞬間
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub held:    Actions,
    pub pressed: Actions,
}

impl FrameInput {
    pub fn move_intent(&self) -> MoveIntent {
        MoveIntent {
            left:  self.held.contains(Actions::MOVE_LEFT),
            right: self.held.contains(Actions::MOVE_RIGHT),
            jump:  self.pressed.contains(Actions::JUMP),
        }
    }
}

/// キーイベントを受けて、tick ごとの `FrameInput` を作る
#[derive(Clone, Copy, Debug, Default)]
pub struct InputTracker {
    held:    Actions,
    pressed: Actions,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーリピートで押しっぱなしの間は押下エッジを立てない
    pub fn press(&mut self, action: Actions) {
        let fresh = action - self.held;
        self.pressed |= fresh;
        self.held |= action;
    }

    pub fn release(&mut self, action: Actions) {
        self.held -= action;
    }

    /// 現在の状態を取り出し、押下エッジを消費する
    pub fn sample(&mut self) -> FrameInput {
        let frame = FrameInput { held: self.held, pressed: self.pressed };
        self.pressed = Actions::empty();
        frame
    }

    /// フォーカス喪失時などにすべて離したことにする
    pub fn clear_held(&mut self) {
        self.held = Actions::empty();
        self.pressed = Actions::empty();
    }
}
