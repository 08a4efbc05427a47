use parking_lot::Mutex;

use crate::domain::shortcut::Platform;

/// 実行環境から取得する情報。UI ランタイムのグローバル状態の代わりに注入する。
pub trait Environment: Send + Sync {
    /// プラットフォーム識別文字列（User-Agent や OS 名）
    fn platform_id(&self) -> String;

    /// 現在選択中のテキスト
    fn selected_text(&self) -> Option<String>;

    /// 周囲の文字色（アイコンのデフォルト色）
    fn ambient_color(&self) -> Option<String>;

    fn platform(&self) -> Platform {
        Platform::detect(&self.platform_id())
    }
}

/// ビルド対象 OS をプラットフォームとして報告する環境
pub struct NativeEnvironment;

impl Environment for NativeEnvironment {
    fn platform_id(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn selected_text(&self) -> Option<String> {
        None
    }

    fn ambient_color(&self) -> Option<String> {
        None
    }
}

/// 値を外から差し替えられる環境（ホストの UI 層やテストから更新する）
pub struct StaticEnvironment {
    platform_id: Mutex<String>,
    selection: Mutex<Option<String>>,
    ambient_color: Mutex<Option<String>>,
}

impl StaticEnvironment {
    pub fn new(platform_id: impl Into<String>) -> Self {
        Self {
            platform_id: Mutex::new(platform_id.into()),
            selection: Mutex::new(None),
            ambient_color: Mutex::new(None),
        }
    }

    pub fn set_platform_id(&self, id: impl Into<String>) {
        *self.platform_id.lock() = id.into();
    }

    pub fn set_selection(&self, selection: Option<String>) {
        *self.selection.lock() = selection;
    }

    pub fn set_ambient_color(&self, color: Option<String>) {
        *self.ambient_color.lock() = color;
    }
}

impl Environment for StaticEnvironment {
    fn platform_id(&self) -> String {
        self.platform_id.lock().clone()
    }

    fn selected_text(&self) -> Option<String> {
        self.selection.lock().clone()
    }

    fn ambient_color(&self) -> Option<String> {
        self.ambient_color.lock().clone()
    }
}
