//! Path: native/transdim_core/src/tile.rs
//! Summary: タイルコード・タイルグリッド・派生タイルリスト（TileMap 変換とキャッシュ）

use crate::constants::TILE_SIZE;
use crate::physics::aabb::Vec2;
use std::sync::atomic::{AtomicU64, Ordering};

/// グリッド 1 セルのタイル種別
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum TileCode {
    #[default]
    Empty        = 0,
    SolidA       = 1,
    SolidB       = 2,
    /// 世界間で持ち運べるブロック（同時に 1 個まで）
    Transferable = 3,
    Decorative   = 4,
}

impl TileCode {
    /// プレイヤーと衝突するか。Transferable の扱いは呼び出し側が世界ごとに決める
    pub fn is_solid(self) -> bool {
        matches!(self, Self::SolidA | Self::SolidB | Self::Transferable)
    }
}

impl TryFrom<i64> for TileCode {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Empty),
            1 => Ok(Self::SolidA),
            2 => Ok(Self::SolidB),
            3 => Ok(Self::Transferable),
            4 => Ok(Self::Decorative),
            other => Err(other),
        }
    }
}

/// 派生タイル 1 枚（ピクセル座標 + グリッドへの逆参照）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub position: Vec2,
    pub code:     TileCode,
    pub row:      usize,
    pub col:      usize,
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn fresh_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// グリッド形状の検証エラー。`LevelError` へ変換される
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridShapeError {
    Empty,
    Ragged { row: usize, expected: usize, found: usize },
}

/// 矩形の 2D タイルグリッド（行 = Y, 列 = X）。
///
/// `None` はプレースホルダーセル（派生リストに含めない）。
/// 生成時と書き換えのたびに `revision` が新しい値になるので、
/// 派生リストのキャッシュは revision の一致だけで有効性を判定できる。
#[derive(Clone, Debug)]
pub struct TileGrid {
    cells:    Vec<Vec<Option<TileCode>>>,
    width:    usize,
    revision: u64,
}

impl PartialEq for TileGrid {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl TileGrid {
    pub fn from_rows(cells: Vec<Vec<Option<TileCode>>>) -> Result<Self, GridShapeError> {
        let width = cells.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(GridShapeError::Empty);
        }
        for (row, cols) in cells.iter().enumerate() {
            if cols.len() != width {
                return Err(GridShapeError::Ragged { row, expected: width, found: cols.len() });
            }
        }
        Ok(Self { cells, width, revision: fresh_revision() })
    }

    /// テスト・ツール用: 整数コードの行から組み立てる（未知コードは Empty 扱いにしない）
    pub fn from_codes(rows: &[&[u8]]) -> Result<Self, GridShapeError> {
        let cells = rows
            .iter()
            .map(|r| r.iter().map(|&c| TileCode::try_from(c as i64).ok()).collect())
            .collect();
        Self::from_rows(cells)
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.width
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn pixel_height(&self) -> f32 {
        self.cells.len() as f32 * TILE_SIZE
    }

    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows() && (col as usize) < self.width
    }

    /// 範囲外・プレースホルダーは `None`
    pub fn get(&self, row: usize, col: usize) -> Option<TileCode> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// 空きセルか（Empty またはプレースホルダー）
    pub fn is_blank(&self, row: usize, col: usize) -> bool {
        matches!(self.get(row, col), None | Some(TileCode::Empty))
    }

    pub fn positions_of(&self, code: TileCode) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (r, cols) in self.cells.iter().enumerate() {
            for (c, cell) in cols.iter().enumerate() {
                if *cell == Some(code) {
                    out.push((r, c));
                }
            }
        }
        out
    }

    /// セルを書き換える。Transferable の書き込みは `WorldPair` 経由に限定するため crate 内専用
    pub(crate) fn set(&mut self, row: usize, col: usize, code: TileCode) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = Some(code);
            self.revision = fresh_revision();
        }
    }
}

/// グリッドを派生タイルリストへ変換する（行優先、プレースホルダーは飛ばす）
pub fn to_tiles(grid: &TileGrid) -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(grid.rows() * grid.cols());
    for (row, cols) in grid.cells.iter().enumerate() {
        for (col, cell) in cols.iter().enumerate() {
            if let Some(code) = cell {
                tiles.push(Tile {
                    position: Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE),
                    code:     *code,
                    row,
                    col,
                });
            }
        }
    }
    tiles
}

/// アクティブ世界の派生タイルリストのキャッシュ
#[derive(Debug, Default)]
pub struct TileCache {
    revision: Option<u64>,
    tiles:    Vec<Tile>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// revision が変わっていれば作り直す。作り直したら true
    pub fn refresh(&mut self, grid: &TileGrid) -> bool {
        if self.revision == Some(grid.revision()) {
            return false;
        }
        self.tiles = to_tiles(grid);
        self.revision = Some(grid.revision());
        true
    }

    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_tiles_positions_and_back_references() {
        let grid = TileGrid::from_codes(&[&[1, 0, 2], &[3, 4, 0]]).unwrap();
        let tiles = to_tiles(&grid);
        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[2].position, Vec2::new(128.0, 0.0));
        assert_eq!(tiles[2].code, TileCode::SolidB);
        assert_eq!((tiles[3].row, tiles[3].col), (1, 0));
        assert_eq!(tiles[4].position, Vec2::new(64.0, 64.0));
    }

    #[test]
    fn placeholder_cells_are_skipped() {
        let grid = TileGrid::from_rows(vec![
            vec![Some(TileCode::SolidA), None],
            vec![None, Some(TileCode::Empty)],
        ])
        .unwrap();
        let tiles = to_tiles(&grid);
        assert_eq!(tiles.len(), 2);
        assert_eq!((tiles[1].row, tiles[1].col), (1, 1));
        assert!(grid.is_blank(0, 1));
    }

    #[test]
    fn conversion_is_idempotent() {
        let grid = TileGrid::from_codes(&[&[1, 1, 1], &[1, 0, 1], &[1, 1, 1]]).unwrap();
        assert_eq!(to_tiles(&grid), to_tiles(&grid));
    }

    #[test]
    fn ragged_and_empty_grids_are_rejected() {
        assert_eq!(TileGrid::from_rows(vec![]), Err(GridShapeError::Empty));
        assert_eq!(
            TileGrid::from_codes(&[&[1, 1], &[1]]),
            Err(GridShapeError::Ragged { row: 1, expected: 2, found: 1 })
        );
    }

    #[test]
    fn cache_rebuilds_only_after_mutation() {
        let mut grid = TileGrid::from_codes(&[&[0, 0], &[1, 1]]).unwrap();
        let mut cache = TileCache::new();
        assert!(cache.refresh(&grid));
        assert!(!cache.refresh(&grid));

        grid.set(0, 1, TileCode::Transferable);
        assert!(cache.refresh(&grid));
        assert_eq!(cache.tiles()[1].code, TileCode::Transferable);

        cache.invalidate();
        assert!(cache.refresh(&grid));
    }

    #[test]
    fn tile_code_conversion() {
        assert_eq!(TileCode::try_from(3), Ok(TileCode::Transferable));
        assert_eq!(TileCode::try_from(9), Err(9));
        assert!(!TileCode::Decorative.is_solid());
        assert!(TileCode::SolidB.is_solid());
    }
}
