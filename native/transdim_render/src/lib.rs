//! Path: native/transdim_render/src/lib.rs
//! Summary: コアの RenderFrame を wgpu + egui で描くレンダラー

mod renderer;

pub use renderer::{build_instances, Renderer, SceneImages, SheetMode, SpriteInstance};
pub use transdim_core::snapshot::{HudData, RenderFrame};
