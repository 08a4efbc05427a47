use serde::Serialize;

/// コピー操作の状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
}

impl CopyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Copied => "copied",
        }
    }
}

/// `copy` 呼び出しの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyOutcome {
    /// クリップボードへ書き込み、Copied に遷移した
    Copied,
    /// テキストが空のためウィンドウを隠しただけ
    HiddenOnly,
    /// コピー中またはコピー済みのため何もしなかった
    Ignored,
}
