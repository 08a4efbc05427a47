use serde::Serialize;

/// アプリケーション共通エラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_CLIPBOARD")]
    Clipboard,
    #[serde(rename = "E_WINDOW")]
    Window,
    #[serde(rename = "E_STORAGE")]
    Storage,
    #[serde(rename = "E_SHORTCUT")]
    Shortcut,
    #[serde(rename = "E_INVALID_STATE")]
    InvalidState,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

/// アプリケーションエラー（UI へのペイロード兼用）
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl AppError {
    pub fn clipboard(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Clipboard,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn window(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Window,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Storage,
            message: msg.into(),
            recoverable: false,
        }
    }

    pub fn shortcut(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Shortcut,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidState,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: msg.into(),
            recoverable: false,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<crate::infra::clipboard::ClipboardError> for AppError {
    fn from(e: crate::infra::clipboard::ClipboardError) -> Self {
        Self::clipboard(e.to_string())
    }
}

impl From<crate::infra::window::WindowError> for AppError {
    fn from(e: crate::infra::window::WindowError) -> Self {
        Self::window(e.to_string())
    }
}

impl From<crate::infra::store::StoreError> for AppError {
    fn from(e: crate::infra::store::StoreError) -> Self {
        Self::storage(e.to_string())
    }
}

impl From<super::shortcut::ShortcutParseError> for AppError {
    fn from(e: super::shortcut::ShortcutParseError) -> Self {
        Self::shortcut(e.to_string())
    }
}
