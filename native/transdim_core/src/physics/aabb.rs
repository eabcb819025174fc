//! Path: native/transdim_core/src/physics/aabb.rs
//! Summary: 2D ベクトルと矩形の重なり判定（ピクセル包含判定）

use serde::Deserialize;
use std::ops::{Add, AddAssign, Sub};

/// 位置・速度・ビューオフセット共通の 2D ベクトル
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// 左上座標 + サイズの矩形
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub pos:  Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn square(pos: Vec2, side: f32) -> Self {
        Self::new(pos, Vec2::new(side, side))
    }
}

/// ピクセル単位の包含判定。片方がもう片方の最終ピクセルより先から始まる場合のみ離れている。
/// 辺がちょうど接しているだけ（a の右端 == b の左端）なら重なりではない。
pub fn boxes_touch(a: &Aabb, b: &Aabb) -> bool {
    !(a.pos.x > b.pos.x + b.size.x - 1.0
        || a.pos.y > b.pos.y + b.size.y - 1.0
        || b.pos.x > a.pos.x + a.size.x - 1.0
        || b.pos.y > a.pos.y + a.size.y - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes_touch() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(37.0, 64.0));
        let b = Aabb::square(Vec2::new(20.0, 10.0), 64.0);
        assert!(boxes_touch(&a, &b));
        assert!(boxes_touch(&b, &a));
    }

    #[test]
    fn shared_edge_does_not_touch() {
        let a = Aabb::square(Vec2::new(0.0, 0.0), 64.0);
        let edge = Aabb::square(Vec2::new(64.0, 0.0), 64.0);
        assert!(!boxes_touch(&a, &edge));
        assert!(!boxes_touch(&edge, &a));

        // 最終ピクセルが 1 列重なれば接触
        let one_px = Aabb::square(Vec2::new(63.0, 0.0), 64.0);
        assert!(boxes_touch(&a, &one_px));
    }

    #[test]
    fn separated_boxes_do_not_touch() {
        let a = Aabb::square(Vec2::new(0.0, 0.0), 64.0);
        let b = Aabb::square(Vec2::new(65.0, 0.0), 64.0);
        assert!(!boxes_touch(&a, &b));
        let c = Aabb::square(Vec2::new(0.0, 200.0), 64.0);
        assert!(!boxes_touch(&a, &c));
    }
}
