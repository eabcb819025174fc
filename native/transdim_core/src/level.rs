//! Path: native/transdim_core/src/level.rs
//! Summary: レベル JSON ドキュメントの読み込みと検証（LevelDocument → WorldState）

use crate::physics::aabb::Vec2;
use crate::tile::{GridShapeError, TileCode, TileGrid};
use crate::world::{InfoMarker, NextLevelTrigger, WorldPair, WorldState};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// レベルデータの読み込み・検証エラー
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid level JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("level map has no cells")]
    EmptyMap,

    #[error("level map row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("unknown tile code {code} at row {row}, column {col}")]
    UnknownTileCode { row: usize, col: usize, code: i64 },

    #[error("world maps differ in size: A is {a:?}, B is {b:?} (rows, cols)")]
    DimensionMismatch { a: (usize, usize), b: (usize, usize) },

    #[error("found {count} transferable blocks, at most one is allowed")]
    MultipleTransferableBlocks { count: usize },

    #[error("next-level trigger at ({x}, {y}) lies outside the map")]
    TriggerOutOfBounds { x: f32, y: f32 },
}

impl From<GridShapeError> for LevelError {
    fn from(e: GridShapeError) -> Self {
        match e {
            GridShapeError::Empty => Self::EmptyMap,
            GridShapeError::Ragged { row, expected, found } => Self::RaggedRow { row, expected, found },
        }
    }
}

/// マップの 1 セル。整数以外（null や文字列）はプレースホルダー
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Code(i64),
    Placeholder(serde_json::Value),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInfoTile {
    pub x:            f32,
    pub y:            f32,
    #[serde(default)]
    pub text:         String,
    #[serde(default)]
    pub activate_hud: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNextLevel {
    pub x:             f32,
    pub y:             f32,
    #[serde(default)]
    pub target_grid_a: String,
    #[serde(default)]
    pub target_grid_b: String,
    #[serde(default)]
    pub last_level:    bool,
}

/// 1 世界ぶんのレベルファイル
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDocument {
    pub map:                 Vec<Vec<RawCell>>,
    pub spawnpoint:          Vec2,
    #[serde(default)]
    pub informational_tiles: Vec<RawInfoTile>,
    #[serde(default)]
    pub next_level:          Option<RawNextLevel>,
}

impl LevelDocument {
    pub fn from_json_str(s: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    /// 検証して WorldState に変換する
    pub fn into_world(self) -> Result<WorldState, LevelError> {
        let mut rows = Vec::with_capacity(self.map.len());
        for (row, cells) in self.map.into_iter().enumerate() {
            let mut out = Vec::with_capacity(cells.len());
            for (col, cell) in cells.into_iter().enumerate() {
                out.push(match cell {
                    RawCell::Code(code) => Some(
                        TileCode::try_from(code)
                            .map_err(|code| LevelError::UnknownTileCode { row, col, code })?,
                    ),
                    RawCell::Placeholder(_) => None,
                });
            }
            rows.push(out);
        }
        let grid = TileGrid::from_rows(rows)?;

        let next_level = match self.next_level {
            Some(t) => {
                let inside = t.x >= 0.0
                    && t.y >= 0.0
                    && t.x < grid.pixel_width()
                    && t.y < grid.pixel_height();
                if !inside {
                    return Err(LevelError::TriggerOutOfBounds { x: t.x, y: t.y });
                }
                Some(NextLevelTrigger {
                    position:      Vec2::new(t.x, t.y),
                    target_grid_a: t.target_grid_a,
                    target_grid_b: t.target_grid_b,
                    last_level:    t.last_level,
                })
            }
            None => None,
        };

        let markers = self
            .informational_tiles
            .into_iter()
            .map(|m| InfoMarker {
                position:     Vec2::new(m.x, m.y),
                text:         m.text,
                activate_hud: m.activate_hud,
            })
            .collect();

        Ok(WorldState { grid, spawn: self.spawnpoint, markers, next_level })
    }
}

/// 世界 A/B のドキュメントからペアを組み立てる
pub fn build_pair(a: LevelDocument, b: LevelDocument) -> Result<WorldPair, LevelError> {
    WorldPair::new(a.into_world()?, b.into_world()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldId;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> LevelDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_full_document() {
        let d = doc(json!({
            "map": [[1, 1, 1], [1, 0, 1], [1, 1, 1]],
            "spawnpoint": {"x": 64, "y": 64},
            "informationalTiles": [{"x": 64, "y": 64, "text": "hello", "activateHud": true}],
            "nextLevel": {"x": 128, "y": 64, "targetGridA": "l2_w1", "targetGridB": "l2_w2", "lastLevel": false}
        }));
        let w = d.into_world().unwrap();
        assert_eq!(w.spawn, Vec2::new(64.0, 64.0));
        assert_eq!(w.grid().cols(), 3);
        assert_eq!(w.markers.len(), 1);
        assert!(w.markers[0].activate_hud);
        let t = w.next_level.unwrap();
        assert_eq!(t.target_grid_b, "l2_w2");
        assert!(!t.last_level);
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let w = LevelDocument::from_json_str(r#"{"map": [[0]], "spawnpoint": {"x": 0, "y": 0}}"#)
            .unwrap()
            .into_world()
            .unwrap();
        assert!(w.markers.is_empty());
        assert!(w.next_level.is_none());
    }

    #[test]
    fn non_numeric_cells_become_placeholders() {
        let w = doc(json!({"map": [[1, null], ["x", 0]], "spawnpoint": {"x": 0, "y": 0}}))
            .into_world()
            .unwrap();
        assert_eq!(w.grid().get(0, 1), None);
        assert_eq!(w.grid().get(1, 0), None);
        assert_eq!(w.grid().get(0, 0), Some(TileCode::SolidA));
    }

    #[test]
    fn rejects_malformed_maps() {
        let ragged = doc(json!({"map": [[1, 1], [1]], "spawnpoint": {"x": 0, "y": 0}}));
        assert!(matches!(ragged.into_world(), Err(LevelError::RaggedRow { row: 1, .. })));

        let empty = doc(json!({"map": [], "spawnpoint": {"x": 0, "y": 0}}));
        assert!(matches!(empty.into_world(), Err(LevelError::EmptyMap)));

        let unknown = doc(json!({"map": [[0, 7]], "spawnpoint": {"x": 0, "y": 0}}));
        assert!(matches!(
            unknown.into_world(),
            Err(LevelError::UnknownTileCode { row: 0, col: 1, code: 7 })
        ));
    }

    #[test]
    fn rejects_trigger_outside_map() {
        let d = doc(json!({
            "map": [[0, 0]],
            "spawnpoint": {"x": 0, "y": 0},
            "nextLevel": {"x": 128, "y": 0, "lastLevel": true}
        }));
        assert!(matches!(d.into_world(), Err(LevelError::TriggerOutOfBounds { .. })));
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(matches!(LevelDocument::from_json_str("{"), Err(LevelError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LevelDocument::from_path(Path::new("/nonexistent/l9_w1.json")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
        assert!(err.to_string().contains("l9_w1.json"));
    }

    #[test]
    fn build_pair_mirrors_block() {
        let a = doc(json!({"map": [[0, 3]], "spawnpoint": {"x": 0, "y": 0}}));
        let b = doc(json!({"map": [[0, 0]], "spawnpoint": {"x": 0, "y": 0}}));
        let pair = build_pair(a, b).unwrap();
        assert_eq!(pair.grid(WorldId::B).get(0, 1), Some(TileCode::Transferable));
    }
}
