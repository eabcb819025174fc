//! Path: native/transdim_window/src/config.rs
//! Summary: コマンドライン引数（clap）

use std::path::PathBuf;

use clap::Parser;

/// 環境変数でアセットの場所を指定する場合の名前
pub const ASSETS_ENV: &str = "TRANSDIM_ASSETS_PATH";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Two-world tile platformer")]
pub struct Cli {
    /// レベル JSON を置いたディレクトリ
    #[arg(long, default_value = "levels")]
    pub levels: PathBuf,
    /// 最初に読むレベルの接頭辞（`<level>_w1.json` / `<level>_w2.json`）
    #[arg(long, default_value = "l1")]
    pub level: String,
    /// アセットのベースディレクトリ
    #[arg(long, env = ASSETS_ENV)]
    pub assets: Option<PathBuf>,
    /// 音を出さない
    #[arg(long)]
    pub mute: bool,
}

impl Cli {
    /// 最初のレベルペアのファイル名（拡張子なし）
    pub fn first_pair(&self) -> (String, String) {
        (format!("{}_w1", self.level), format!("{}_w2", self.level))
    }
}
