//! Path: native/transdim_window/src/input_map.rs
//! Summary: 物理キー → ゲームアクションの対応

use transdim_core::Actions;
use winit::keyboard::KeyCode;

pub fn action_for_key(code: KeyCode) -> Option<Actions> {
    match code {
        KeyCode::KeyA       => Some(Actions::MOVE_LEFT),
        KeyCode::KeyD       => Some(Actions::MOVE_RIGHT),
        KeyCode::KeyW       => Some(Actions::JUMP),
        KeyCode::Space      => Some(Actions::TOGGLE_WORLD),
        KeyCode::KeyE       => Some(Actions::PICKUP),
        KeyCode::ArrowLeft  => Some(Actions::PLACE_LEFT),
        KeyCode::ArrowRight => Some(Actions::PLACE_RIGHT),
        _ => None,
    }
}
