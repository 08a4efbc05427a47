use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;

use crate::domain::copy::CopyOutcome;
use crate::domain::error::AppError;
use crate::domain::settings::AppSettings;
use crate::domain::text::indent_with_tab;
use crate::infra::clipboard::Clipboard;
use crate::infra::environment::Environment;
use crate::infra::key_events::KeyEventSource;
use crate::infra::store::KeyValueStore;
use crate::infra::window::WindowManager;
use crate::usecase::copy_controller::CopyController;
use crate::usecase::shortcut_matcher::{ShortcutMatcher, ShortcutRegistration};
use crate::usecase::text_store::TextStore;

pub const WINDOW_TITLE: &str = "MomentPad";
pub const PLACEHOLDER: &str = "Write something...";
pub const DEFAULT_ICON_COLOR: &str = "currentColor";

/// 外部サービス一式
pub struct Collaborators {
    pub clipboard: Arc<dyn Clipboard>,
    pub windows: Arc<dyn WindowManager>,
    pub store: Arc<dyn KeyValueStore>,
    pub key_events: Arc<dyn KeyEventSource>,
    pub env: Arc<dyn Environment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyIcon {
    Copy,
    Check,
}

/// コピーボタンの表示状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyButtonView {
    pub label: &'static str,
    pub icon: CopyIcon,
    pub icon_color: String,
    pub disabled: bool,
}

/// ショートカットのコールバックに渡す値
#[derive(Clone)]
struct ShortcutContext {
    text: TextStore,
    copier: CopyController,
    env: Arc<dyn Environment>,
    runtime: Handle,
}

/// 選択範囲が空か全文と同じときだけショートカットでコピーする。
/// 一部だけ選択しているときはネイティブのコピーに任せる。
pub fn selection_allows_copy(selection: Option<&str>, text: &str) -> bool {
    match selection {
        None => true,
        Some(s) => s.is_empty() || s == text,
    }
}

fn on_copy_shortcut(ctx: ShortcutContext) {
    let text = ctx.text.read();
    if !selection_allows_copy(ctx.env.selected_text().as_deref(), &text) {
        log::debug!("部分選択中のためショートカットコピーをスキップ");
        return;
    }
    let copier = ctx.copier;
    ctx.runtime.spawn(async move {
        if let Err(e) = copier.copy(&text).await {
            log::warn!("ショートカットからのコピーに失敗: {e}");
        }
    });
}

/// メモ帳: テキスト・コピー・ショートカットを組み合わせる
pub struct ScratchPad {
    settings: AppSettings,
    text: TextStore,
    copier: CopyController,
    env: Arc<dyn Environment>,
    shortcut: ShortcutRegistration,
}

impl ScratchPad {
    /// tokio ランタイム外で呼ぶと `E_INVALID_STATE`
    pub fn new(settings: AppSettings, deps: Collaborators) -> Result<Self, AppError> {
        let hotkey = settings.copy_hotkey()?;
        let runtime = Handle::try_current()
            .map_err(|e| AppError::invalid_state(format!("no tokio runtime: {e}")))?;

        let text = TextStore::mount(
            deps.store,
            settings.store_path.clone(),
            settings.initial_text.clone(),
        )?;
        let copier = CopyController::from_settings(deps.clipboard, deps.windows, &settings);
        let matcher = ShortcutMatcher::new(deps.key_events, deps.env.clone());

        let shortcut = matcher.register(
            hotkey,
            on_copy_shortcut,
            ShortcutContext {
                text: text.clone(),
                copier: copier.clone(),
                env: deps.env.clone(),
                runtime,
            },
        );
        log::info!(
            "{WINDOW_TITLE} 起動: window={}, shortcut={}",
            settings.window_label,
            settings.copy_shortcut
        );

        Ok(Self {
            settings,
            text,
            copier,
            env: deps.env,
            shortcut,
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn text(&self) -> String {
        self.text.read()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.text.write(text);
    }

    pub fn text_store(&self) -> &TextStore {
        &self.text
    }

    pub fn copy_controller(&self) -> &CopyController {
        &self.copier
    }

    pub fn shortcut(&self) -> &ShortcutRegistration {
        &self.shortcut
    }

    /// コピーボタンのクリック
    pub async fn copy(&self) -> Result<CopyOutcome, AppError> {
        self.copier.copy(&self.text.read()).await
    }

    /// Tab キー。インデント後のカーソル位置を返す。
    pub fn indent(&self, selection_start: usize, selection_end: usize) -> usize {
        let (text, cursor) = indent_with_tab(&self.text.read(), selection_start, selection_end);
        self.text.write(text);
        cursor
    }

    pub fn copy_button(&self) -> CopyButtonView {
        let copied = self.copier.is_copied();
        let icon_color = self
            .settings
            .icon_color
            .clone()
            .or_else(|| self.env.ambient_color())
            .unwrap_or_else(|| DEFAULT_ICON_COLOR.to_string());

        CopyButtonView {
            label: if copied { "Copied!" } else { "Copy" },
            icon: if copied { CopyIcon::Check } else { CopyIcon::Copy },
            icon_color,
            disabled: copied || self.text.read().is_empty(),
        }
    }
}
