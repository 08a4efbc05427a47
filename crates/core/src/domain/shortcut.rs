//! キーボードショートカットの型とプラットフォーム別の修飾キー解決。
//!
//! `HotKey` はプラットフォーム非依存の指定（`cmd` = 主修飾キー）で、
//! マッチ時に `Platform` ごとの `KeyBinding`（ネイティブ修飾キーの期待値）へ解決される。

use serde::{Deserialize, Serialize};

/// アクセラレータ文字列のパースエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShortcutParseError {
    #[error("shortcut string is empty")]
    Empty,
    #[error("shortcut has no key, only modifiers")]
    MissingKey,
    #[error("shortcut has more than one key: '{0}' and '{1}'")]
    MultipleKeys(String, String),
}

/// 実行環境のプラットフォーム種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// 主修飾キー = meta (⌘)
    Mac,
    /// 主修飾キー = ctrl
    Windows,
    /// 主修飾キーなし
    Other,
}

impl Platform {
    /// 環境の識別文字列（User-Agent や OS 名）からプラットフォームを判定する
    pub fn detect(identifier: &str) -> Self {
        let id = identifier.to_lowercase();
        if id.contains("windows") {
            Self::Windows
        } else if id.contains("mac os x") || id.contains("macos") || id.contains("darwin") {
            Self::Mac
        } else {
            Self::Other
        }
    }
}

/// ショートカット指定（プラットフォーム非依存）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HotKey {
    /// キーイベントが報告するキー名。大文字小文字は区別する。
    pub key: String,
    #[serde(default)]
    pub cmd: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl HotKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            cmd: false,
            alt: false,
            shift: false,
        }
    }

    pub fn with_cmd(mut self) -> Self {
        self.cmd = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// `"CmdOrCtrl+Shift+M"` 形式のアクセラレータ文字列をパースする。
    ///
    /// `Ctrl` / `Control` も主修飾キー (`cmd`) として扱う。`HotKey` は ctrl を
    /// 独立して持たないため、`"Ctrl+Shift+M"` は Mac では meta+shift+m に解決される。
    /// 1文字のキーは `Shift` 指定がなければ小文字に揃える。
    pub fn parse(s: &str) -> Result<Self, ShortcutParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        let mut hotkey = HotKey::new("");
        let mut key: Option<&str> = None;

        for token in s.split('+').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_lowercase().as_str() {
                "cmd" | "command" | "cmdorctrl" | "commandorcontrol" | "ctrl" | "control" => {
                    hotkey.cmd = true
                }
                "alt" | "option" => hotkey.alt = true,
                "shift" => hotkey.shift = true,
                _ => {
                    if let Some(existing) = key {
                        return Err(ShortcutParseError::MultipleKeys(
                            existing.to_string(),
                            token.to_string(),
                        ));
                    }
                    key = Some(token);
                }
            }
        }

        let key = key.ok_or(ShortcutParseError::MissingKey)?;
        hotkey.key = if key.chars().count() == 1 && !hotkey.shift {
            key.to_lowercase()
        } else {
            key.to_string()
        };
        Ok(hotkey)
    }

    /// プラットフォームに応じたネイティブ修飾キーの期待値へ解決する
    pub fn resolve(&self, platform: Platform) -> KeyBinding {
        KeyBinding {
            key: self.key.clone(),
            meta_key: platform == Platform::Mac && self.cmd,
            ctrl_key: platform == Platform::Windows && self.cmd,
            alt_key: self.alt,
            shift_key: self.shift,
        }
    }

    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        self.resolve(platform).matches(event)
    }
}

/// ネイティブ修飾キーで表したショートカット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyBinding {
    pub key: String,
    pub meta_key: bool,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub shift_key: bool,
}

impl KeyBinding {
    /// キーと4つの修飾キーすべてが完全一致する場合のみ true
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.key == self.key
            && event.meta_key == self.meta_key
            && event.ctrl_key == self.ctrl_key
            && event.alt_key == self.alt_key
            && event.shift_key == self.shift_key
    }
}

/// keydown イベント
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub shift_key: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift_key = true;
        self
    }
}
