//! Path: native/transdim_core/src/physics/mod.rs
//! Summary: 物理モジュールの再エクスポート（矩形判定・タイル衝突解決）

pub mod aabb;
pub mod tile_collision;
