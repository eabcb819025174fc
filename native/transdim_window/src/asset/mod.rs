//! Path: native/transdim_window/src/asset/mod.rs
//! Summary: アセット ID → パスの対応表と実行時ロード
//!
//! 見つからないアセットは `None` を返し、描画・音声側がそれぞれ代替動作をとる。

use std::path::{Path, PathBuf};

/// アセット ID とパスの定義を 1 箇所に集約する
macro_rules! define_assets {
    ($($id:ident => $path:literal),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum AssetId {
            $($id,)*
        }

        impl AssetId {
            pub const ALL: &'static [AssetId] = &[$(AssetId::$id,)*];

            /// ベースディレクトリからの相対パス
            pub fn default_path(&self) -> &'static str {
                match self {
                    $(AssetId::$id => $path,)*
                }
            }
        }
    };
}

define_assets! {
    Tilesheet   => "assets/images/tilesheet.png",
    Background  => "assets/images/background.png",
    Overlay     => "assets/images/overlay.png",
    Bgm         => "assets/audio/bgm.wav",
    SwitchSfx   => "assets/audio/switch.wav",
    PickupSfx   => "assets/audio/pickup.wav",
    PlaceSfx    => "assets/audio/place.wav",
}

#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    /// None の場合はカレントディレクトリのみを見る
    base_path: Option<PathBuf>,
}

impl AssetLoader {
    pub fn new(base_path: Option<PathBuf>) -> Self {
        Self { base_path }
    }

    #[cfg(test)]
    pub fn with_base_path<P: AsRef<Path>>(path: P) -> Self {
        Self::new(Some(path.as_ref().to_path_buf()))
    }

    /// 1. base_path + 相対パス
    /// 2. カレントディレクトリからの相対パス
    pub fn load_bytes(&self, id: AssetId) -> Option<Vec<u8>> {
        let rel = Path::new(id.default_path());
        let candidates = self.base_path.iter().map(|base| base.join(rel)).chain(std::iter::once(rel.to_path_buf()));

        for path in candidates {
            match std::fs::read(&path) {
                Ok(bytes) => {
                    log::debug!("asset {id:?} loaded from {}", path.display());
                    return Some(bytes);
                }
                Err(e) => log::trace!("asset {id:?} not at {}: {e}", path.display()),
            }
        }
        log::warn!("asset {id:?} ({}) not found", id.default_path());
        None
    }

    /// 描画用の画像 3 枚。背景とオーバーレイは無くても動く
    pub fn load_images(&self) -> ImageBytes {
        ImageBytes {
            tilesheet:  self.load_bytes(AssetId::Tilesheet),
            background: self.load_bytes(AssetId::Background),
            overlay:    self.load_bytes(AssetId::Overlay),
        }
    }
}

#[derive(Debug, Default)]
pub struct ImageBytes {
    pub tilesheet:  Option<Vec<u8>>,
    pub background: Option<Vec<u8>>,
    pub overlay:    Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_unique() {
        let mut paths: Vec<_> = AssetId::ALL.iter().map(AssetId::default_path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), AssetId::ALL.len());
    }

    #[test]
    fn base_path_is_searched_first() {
        let dir = std::env::temp_dir().join(format!("transdim_asset_test_{}", std::process::id()));
        let file = dir.join(AssetId::PlaceSfx.default_path());
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, b"RIFF").unwrap();

        let loader = AssetLoader::with_base_path(&dir);
        assert_eq!(loader.load_bytes(AssetId::PlaceSfx).as_deref(), Some(&b"RIFF"[..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn images_load_independently() {
        let dir = std::env::temp_dir().join(format!("transdim_image_test_{}", std::process::id()));
        let file = dir.join(AssetId::Overlay.default_path());
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, b"PNG").unwrap();

        let images = AssetLoader::with_base_path(&dir).load_images();
        assert_eq!(images.overlay.as_deref(), Some(&b"PNG"[..]));
        assert!(images.background.is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_asset_is_none() {
        let loader = AssetLoader::with_base_path("/nonexistent/transdim");
        assert!(loader.load_bytes(AssetId::Bgm).is_none());
    }
}
