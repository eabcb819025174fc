//! Path: native/transdim_core/src/world.rs
//! Summary: 世界 A/B の状態（グリッド・スポーン・案内タイル・次レベル）と、転送ブロックの両世界ミラー

use crate::constants::TILE_SIZE;
use crate::level::LevelError;
use crate::physics::aabb::{Aabb, Vec2};
use crate::tile::{TileCode, TileGrid};

/// どちらの世界か
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum WorldId {
    A,
    B,
}

impl WorldId {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// HUD 表示用の番号（1 / 2）
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// 触れるとテキストを表示する案内タイル
#[derive(Clone, Debug, PartialEq)]
pub struct InfoMarker {
    pub position:     Vec2,
    pub text:         String,
    pub activate_hud: bool,
}

impl InfoMarker {
    pub fn bounds(&self) -> Aabb {
        Aabb::square(self.position, TILE_SIZE)
    }
}

/// 次レベルへのゲート
#[derive(Clone, Debug, PartialEq)]
pub struct NextLevelTrigger {
    pub position:      Vec2,
    pub target_grid_a: String,
    pub target_grid_b: String,
    pub last_level:    bool,
}

impl NextLevelTrigger {
    pub fn bounds(&self) -> Aabb {
        Aabb::square(self.position, TILE_SIZE)
    }
}

/// 1 つの世界の状態
#[derive(Clone, Debug)]
pub struct WorldState {
    pub(crate) grid: TileGrid,
    pub spawn:       Vec2,
    pub markers:     Vec<InfoMarker>,
    pub next_level:  Option<NextLevelTrigger>,
}

impl WorldState {
    pub fn new(grid: TileGrid, spawn: Vec2) -> Self {
        Self { grid, spawn, markers: Vec::new(), next_level: None }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }
}

/// 2 つの世界をまとめて持つ。
///
/// 転送ブロック（コード 3）の書き換えは `set_transferable_cell` だけが行い、
/// 常に両方のグリッドへ同時に反映される。
#[derive(Clone, Debug)]
pub struct WorldPair {
    worlds: [WorldState; 2],
}

impl WorldPair {
    /// 寸法の一致とブロック数（0 か 1）を検証し、片側にしかないブロックはもう片側へミラーする
    pub fn new(a: WorldState, b: WorldState) -> Result<Self, LevelError> {
        let (ga, gb) = (&a.grid, &b.grid);
        if ga.rows() != gb.rows() || ga.cols() != gb.cols() {
            return Err(LevelError::DimensionMismatch {
                a: (ga.rows(), ga.cols()),
                b: (gb.rows(), gb.cols()),
            });
        }

        let mut cells = ga.positions_of(TileCode::Transferable);
        for pos in gb.positions_of(TileCode::Transferable) {
            if !cells.contains(&pos) {
                cells.push(pos);
            }
        }
        if cells.len() > 1 {
            return Err(LevelError::MultipleTransferableBlocks { count: cells.len() });
        }

        let mut pair = Self { worlds: [a, b] };
        if let Some(&(row, col)) = cells.first() {
            pair.set_transferable_cell(row, col, true);
        }
        Ok(pair)
    }

    pub fn get(&self, id: WorldId) -> &WorldState {
        &self.worlds[id.index()]
    }

    pub fn grid(&self, id: WorldId) -> &TileGrid {
        &self.worlds[id.index()].grid
    }

    /// 転送ブロックを置く（`present = true`）／取り除く（`false`）。両グリッドへ同時に書く。
    /// 置く場合、既存のブロックは先に消すのでブロックは常に高々 1 セル。
    pub fn set_transferable_cell(&mut self, row: usize, col: usize, present: bool) {
        if present {
            for (r, c) in self.transferable_cells() {
                if (r, c) != (row, col) {
                    self.write_both(r, c, TileCode::Empty);
                }
            }
            self.write_both(row, col, TileCode::Transferable);
        } else if self.worlds.iter().any(|w| w.grid.get(row, col) == Some(TileCode::Transferable)) {
            self.write_both(row, col, TileCode::Empty);
        }
    }

    /// ブロックが置かれているセル（両グリッドの和集合）
    pub fn transferable_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = self.worlds[0].grid.positions_of(TileCode::Transferable);
        for pos in self.worlds[1].grid.positions_of(TileCode::Transferable) {
            if !cells.contains(&pos) {
                cells.push(pos);
            }
        }
        cells
    }

    fn write_both(&mut self, row: usize, col: usize, code: TileCode) {
        for world in &mut self.worlds {
            world.grid.set(row, col, code);
        }
    }
}
