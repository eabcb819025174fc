//! Path: native/transdim_core/src/physics/tile_collision.rs
//! Summary: プレイヤー矩形とタイル 1 枚の最小侵入軸による衝突解決・押し出し処理

use super::aabb::Vec2;

/// どの面でぶつかったか（プレイヤー側から見た面）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionSide {
    /// 頭をタイルの下面にぶつけた
    Top,
    /// タイルの上に着地した
    Bottom,
    /// 左側面がタイルに当たった
    Left,
    /// 右側面がタイルに当たった
    Right,
}

impl CollisionSide {
    pub fn is_horizontal(self) -> bool {
        matches!(self, CollisionSide::Left | CollisionSide::Right)
    }
}

/// プレイヤー矩形がタイルに重なっていれば侵入の浅い軸で押し出し、当たった面を返す。
///
/// `pos` は呼び出し側の座標系（プレイヤーは画面座標なので、タイルもビュー分ずらして渡す）。
/// 侵入量が両軸で等しい場合は縦方向で解決する。
/// 複数タイルの同時解決はしない。呼び出し側がタイル順に 1 枚ずつ呼び、補正を積み重ねる。
pub fn resolve_tile_overlap(
    pos: &mut Vec2,
    size: Vec2,
    tile_pos: Vec2,
    tile_size: f32,
) -> Option<CollisionSide> {
    let half_tile = tile_size / 2.0;
    let vector_x = (pos.x + size.x / 2.0) - (tile_pos.x + half_tile);
    let vector_y = (pos.y + size.y / 2.0) - (tile_pos.y + half_tile);
    let half_widths = size.x / 2.0 + half_tile;
    let half_heights = size.y / 2.0 + half_tile;

    if vector_x.abs() >= half_widths || vector_y.abs() >= half_heights {
        return None;
    }

    let overlap_x = half_widths - vector_x.abs();
    let overlap_y = half_heights - vector_y.abs();

    if overlap_x >= overlap_y {
        if vector_y > 0.0 {
            pos.y += overlap_y;
            Some(CollisionSide::Top)
        } else {
            pos.y -= overlap_y;
            Some(CollisionSide::Bottom)
        }
    } else if vector_x > 0.0 {
        pos.x += overlap_x;
        Some(CollisionSide::Left)
    } else {
        pos.x -= overlap_x;
        Some(CollisionSide::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PLAYER_HEIGHT, PLAYER_WIDTH, TILE_SIZE};

    const PLAYER: Vec2 = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn no_overlap_leaves_position_untouched() {
        let mut pos = Vec2::new(200.0, 0.0);
        let side = resolve_tile_overlap(&mut pos, PLAYER, Vec2::new(0.0, 0.0), TILE_SIZE);
        assert_eq!(side, None);
        assert_eq!(pos, Vec2::new(200.0, 0.0));
    }

    #[test]
    fn touching_edges_are_not_a_collision() {
        // プレイヤー左端 == タイル右端
        let mut pos = Vec2::new(64.0, 0.0);
        assert_eq!(resolve_tile_overlap(&mut pos, PLAYER, Vec2::new(0.0, 0.0), TILE_SIZE), None);
    }

    #[test]
    fn landing_pushes_up_and_reports_bottom() {
        let mut pos = Vec2::new(64.0, 64.6);
        let side = resolve_tile_overlap(&mut pos, PLAYER, Vec2::new(64.0, 128.0), TILE_SIZE);
        assert_eq!(side, Some(CollisionSide::Bottom));
        assert!(approx(pos.y, 64.0));
        assert!(approx(pos.x, 64.0));
    }

    #[test]
    fn ceiling_bump_pushes_down_and_reports_top() {
        let mut pos = Vec2::new(64.0, 60.0);
        let side = resolve_tile_overlap(&mut pos, PLAYER, Vec2::new(64.0, 0.0), TILE_SIZE);
        assert_eq!(side, Some(CollisionSide::Top));
        assert!(approx(pos.y, 64.0));
    }

    #[test]
    fn wall_on_the_right_pushes_left() {
        // 縦はほぼ完全に重なり、横は 3px だけ食い込んでいる
        let mut pos = Vec2::new(30.0, 0.0);
        let side = resolve_tile_overlap(&mut pos, PLAYER, Vec2::new(64.0, 0.0), TILE_SIZE);
        assert_eq!(side, Some(CollisionSide::Right));
        assert!(approx(pos.x, 27.0));
    }

    #[test]
    fn wall_on_the_left_pushes_right() {
        let mut pos = Vec2::new(60.0, 0.0);
        let side = resolve_tile_overlap(&mut pos, PLAYER, Vec2::new(0.0, 0.0), TILE_SIZE);
        assert_eq!(side, Some(CollisionSide::Left));
        assert!(approx(pos.x, 64.0));
        assert!(side.is_some_and(CollisionSide::is_horizontal));
    }

    #[test]
    fn equal_penetration_resolves_vertically() {
        // 侵入量 x = 50.5 - 40.5 = 10, y = 64 - 54 = 10
        let tile = Vec2::new(100.0, 100.0);
        let center = Vec2::new(132.0 + 40.5, 132.0 + 54.0);
        let mut pos = Vec2::new(center.x - PLAYER_WIDTH / 2.0, center.y - PLAYER_HEIGHT / 2.0);
        let before_x = pos.x;
        let before_y = pos.y;
        let side = resolve_tile_overlap(&mut pos, PLAYER, tile, TILE_SIZE);
        assert_eq!(side, Some(CollisionSide::Top));
        assert_eq!(pos.x, before_x);
        assert!(approx(pos.y, before_y + 10.0));
    }
}
