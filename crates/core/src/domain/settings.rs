use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::shortcut::{HotKey, ShortcutParseError};
use super::text::DEFAULT_STORE_PATH;

/// ストアパスを上書きする環境変数
pub const STORE_PATH_ENV: &str = "MP_STORE_PATH";

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// コピー後に隠すウィンドウのラベル
    pub window_label: String,
    /// Copied 表示を保つ時間（ミリ秒）
    pub copy_duration_ms: u64,
    /// ストアファイル（相対パスならデータディレクトリ配下）
    pub store_path: String,
    /// ウィンドウ内のコピーショートカット
    pub copy_shortcut: String,
    /// ウィンドウを表示するグローバルショートカット（シェル側で登録）
    pub toggle_shortcut: String,
    /// ストアに値がないときの初期テキスト
    pub initial_text: String,
    /// アイコン色。None なら環境の文字色に従う
    pub icon_color: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_label: "main".to_string(),
            copy_duration_ms: 500,
            store_path: DEFAULT_STORE_PATH.to_string(),
            copy_shortcut: "CmdOrCtrl+C".to_string(),
            toggle_shortcut: "Ctrl+Shift+M".to_string(),
            initial_text: String::new(),
            icon_color: None,
        }
    }
}

impl AppSettings {
    /// JSON オブジェクトをデフォルト値の上にマージする（存在するキーだけ上書き）
    pub fn from_json(json: serde_json::Value) -> Self {
        match serde_json::from_value::<AppSettings>(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("設定の読み込みに失敗したためデフォルトを使用: {e}");
                Self::default()
            }
        }
    }

    /// 環境変数による上書きを適用する
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(std::env::var(STORE_PATH_ENV).ok())
    }

    fn apply_overrides(mut self, store_path: Option<String>) -> Self {
        if let Some(path) = store_path.filter(|p| !p.trim().is_empty()) {
            self.store_path = path;
        }
        self
    }

    pub fn copy_duration(&self) -> Duration {
        Duration::from_millis(self.copy_duration_ms)
    }

    pub fn copy_hotkey(&self) -> Result<HotKey, ShortcutParseError> {
        HotKey::parse(&self.copy_shortcut)
    }

    /// 表示切替ショートカット。`Ctrl` は主修飾キー扱いなので、デフォルトの
    /// `"Ctrl+Shift+M"` は Mac では Cmd+Shift+M、Windows では Ctrl+Shift+M になる。
    pub fn toggle_hotkey(&self) -> Result<HotKey, ShortcutParseError> {
        HotKey::parse(&self.toggle_shortcut)
    }

    /// アプリのデータディレクトリ
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("momentpad")
    }

    /// ストアファイルの絶対パス
    pub fn store_file(&self) -> PathBuf {
        let path = PathBuf::from(&self.store_path);
        if path.is_absolute() {
            path
        } else {
            Self::data_dir().join(path)
        }
    }
}
