//! Path: native/transdim_window/src/levels.rs
//! Summary: レベル JSON をワーカースレッドで読み込み、結果をチャネルで返す
//!
//! 2 つの世界の読み込みは独立に完了し、届いた順に `GameSession::submit_level` へ渡す。

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use rustc_hash::FxHashMap;
use transdim_core::{LevelDocument, LevelError, WorldId};

#[derive(Debug)]
pub struct LevelRequest {
    pub world: WorldId,
    /// 拡張子なしのファイル名（例: `l1_w1`）
    pub name:  String,
}

#[derive(Debug)]
pub struct LevelReply {
    pub world:  WorldId,
    pub name:   String,
    pub result: Result<LevelDocument, LevelError>,
}

/// 読み込みスレッドへのハンドル
pub struct LevelLoader {
    tx: Sender<LevelRequest>,
    rx: Receiver<LevelReply>,
}

impl LevelLoader {
    pub fn spawn(dir: PathBuf) -> Result<Self, String> {
        let (req_tx, req_rx) = mpsc::channel::<LevelRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<LevelReply>();
        thread::Builder::new()
            .name("level-loader".to_string())
            .spawn(move || run_loader(dir, req_rx, reply_tx))
            .map_err(|e| format!("failed to spawn level loader: {e}"))?;
        Ok(Self { tx: req_tx, rx: reply_rx })
    }

    pub fn request(&self, world: WorldId, name: &str) {
        log::debug!("requesting level {name} for world {}", world.number());
        if self.tx.send(LevelRequest { world, name: name.to_string() }).is_err() {
            log::error!("level loader thread is gone; {name} will never load");
        }
    }

    /// 世界 A/B の 2 つをまとめて要求する
    pub fn request_pair(&self, name_a: &str, name_b: &str) {
        self.request(WorldId::A, name_a);
        self.request(WorldId::B, name_b);
    }

    /// 届いている結果をすべて取り出す（ブロックしない）
    pub fn poll(&self) -> Vec<LevelReply> {
        self.rx.try_iter().collect()
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: std::time::Duration) -> Option<LevelReply> {
        self.rx.recv_timeout(timeout).ok()
    }
}

fn run_loader(dir: PathBuf, rx: Receiver<LevelRequest>, tx: Sender<LevelReply>) {
    let mut cache: FxHashMap<String, LevelDocument> = FxHashMap::default();

    while let Ok(LevelRequest { world, name }) = rx.recv() {
        let result = match cache.get(&name) {
            Some(doc) => Ok(doc.clone()),
            None => {
                let path = dir.join(format!("{name}.json"));
                let loaded = LevelDocument::from_path(&path);
                if let Ok(doc) = &loaded {
                    cache.insert(name.clone(), doc.clone());
                }
                loaded
            }
        };
        if tx.send(LevelReply { world, name, result }).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("transdim_levels_{tag}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_both_worlds_in_any_order() {
        let dir = temp_dir("pair");
        let json = r#"{"map": [[0, 0], [1, 1]], "spawnpoint": {"x": 0, "y": 0}}"#;
        std::fs::write(dir.join("x_w1.json"), json).unwrap();
        std::fs::write(dir.join("x_w2.json"), json).unwrap();

        let loader = LevelLoader::spawn(dir.clone()).unwrap();
        loader.request_pair("x_w1", "x_w2");
        let mut worlds = Vec::new();
        for _ in 0..2 {
            let reply = loader.recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(reply.result.is_ok(), "{:?}", reply.result);
            worlds.push(reply.world);
        }
        worlds.sort_by_key(|w| w.index());
        assert_eq!(worlds, vec![WorldId::A, WorldId::B]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bundled_levels_are_valid_pairs() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../levels");
        for level in ["l1", "l2"] {
            let a = LevelDocument::from_path(&dir.join(format!("{level}_w1.json"))).unwrap();
            let b = LevelDocument::from_path(&dir.join(format!("{level}_w2.json"))).unwrap();
            let pair = transdim_core::level::build_pair(a, b).unwrap();
            assert!(pair.transferable_cells().len() <= 1, "{level}");
        }
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = temp_dir("missing");
        let loader = LevelLoader::spawn(dir.clone()).unwrap();
        loader.request(WorldId::B, "nope");
        let reply = loader.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reply.world, WorldId::B);
        assert!(matches!(reply.result, Err(LevelError::Io { .. })));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn cached_document_survives_file_removal() {
        let dir = temp_dir("cache");
        let path = dir.join("c.json");
        std::fs::write(&path, r#"{"map": [[1]], "spawnpoint": {"x": 0, "y": 0}}"#).unwrap();

        let loader = LevelLoader::spawn(dir.clone()).unwrap();
        loader.request(WorldId::A, "c");
        assert!(loader.recv_timeout(Duration::from_secs(5)).unwrap().result.is_ok());

        std::fs::remove_file(&path).unwrap();
        loader.request(WorldId::A, "c");
        assert!(loader.recv_timeout(Duration::from_secs(5)).unwrap().result.is_ok());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
