//! コピー操作のライフサイクル（Idle → Copied → Idle）。
//!
//! クリップボードへの書き込みに成功すると Copied に遷移し、一定時間後に Idle へ戻して
//! ウィンドウを隠す。Copied（および書き込み中）の間の `copy` は何もしない。

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::domain::copy::{CopyOutcome, CopyState};
use crate::domain::error::AppError;
use crate::domain::settings::AppSettings;
use crate::infra::clipboard::Clipboard;
use crate::infra::window::{hide_window, WindowManager};

pub const DEFAULT_COPY_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Writing,
    Copied,
}

struct Inner {
    clipboard: Arc<dyn Clipboard>,
    windows: Arc<dyn WindowManager>,
    window_label: String,
    duration: Duration,
    phase: Mutex<Phase>,
    state_tx: watch::Sender<CopyState>,
}

impl Inner {
    fn set_phase(&self, phase: Phase) {
        *self.phase.lock() = phase;
        let state = match phase {
            Phase::Copied => CopyState::Copied,
            Phase::Idle | Phase::Writing => CopyState::Idle,
        };
        let changed = self.state_tx.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
        if changed {
            log::debug!("コピー状態: {} ({})", state.as_str(), self.window_label);
        }
    }
}

/// 書き込み途中で future が破棄されたときに Idle へ戻す
struct WritingGuard<'a> {
    inner: &'a Inner,
    committed: bool,
}

impl Drop for WritingGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.inner.set_phase(Phase::Idle);
        }
    }
}

/// コピーコントローラ
#[derive(Clone)]
pub struct CopyController {
    inner: Arc<Inner>,
}

impl CopyController {
    pub fn new(
        clipboard: Arc<dyn Clipboard>,
        windows: Arc<dyn WindowManager>,
        window_label: impl Into<String>,
        duration: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(CopyState::Idle);
        Self {
            inner: Arc::new(Inner {
                clipboard,
                windows,
                window_label: window_label.into(),
                duration,
                phase: Mutex::new(Phase::Idle),
                state_tx,
            }),
        }
    }

    pub fn from_settings(
        clipboard: Arc<dyn Clipboard>,
        windows: Arc<dyn WindowManager>,
        settings: &AppSettings,
    ) -> Self {
        Self::new(
            clipboard,
            windows,
            settings.window_label.clone(),
            settings.copy_duration(),
        )
    }

    pub fn state(&self) -> CopyState {
        *self.inner.state_tx.borrow()
    }

    pub fn is_copied(&self) -> bool {
        self.state() == CopyState::Copied
    }

    /// 状態変化の購読
    pub fn subscribe(&self) -> watch::Receiver<CopyState> {
        self.inner.state_tx.subscribe()
    }

    pub fn window_label(&self) -> &str {
        &self.inner.window_label
    }

    /// テキストをコピーする。
    ///
    /// - コピー中・コピー済みなら何もしない
    /// - テキストが空ならウィンドウを隠すだけ
    /// - それ以外はクリップボードへ書き込み、Copied に遷移してタイマーを起動する
    pub async fn copy(&self, text: &str) -> Result<CopyOutcome, AppError> {
        let inner = self.inner.as_ref();

        {
            let mut phase = inner.phase.lock();
            if *phase != Phase::Idle {
                log::debug!("コピー済みのため無視");
                return Ok(CopyOutcome::Ignored);
            }
            if !text.is_empty() {
                *phase = Phase::Writing;
            }
        }

        if text.is_empty() {
            hide_window(inner.windows.as_ref(), &inner.window_label).await?;
            return Ok(CopyOutcome::HiddenOnly);
        }

        let mut guard = WritingGuard {
            inner,
            committed: false,
        };
        if let Err(e) = inner.clipboard.write_text(text).await {
            log::warn!("クリップボード書き込み失敗: {e}");
            return Err(e.into());
        }
        guard.committed = true;
        drop(guard);

        inner.set_phase(Phase::Copied);
        log::info!("コピー完了: {} 文字", text.chars().count());
        self.schedule_reset();
        Ok(CopyOutcome::Copied)
    }

    /// 一定時間後に Idle へ戻してウィンドウを隠す。コントローラが破棄済みなら何もしない。
    fn schedule_reset(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let duration = self.inner.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let Some(inner) = weak.upgrade() else {
                log::debug!("コントローラ破棄済みのためリセットをスキップ");
                return;
            };
            inner.set_phase(Phase::Idle);
            if let Err(e) = hide_window(inner.windows.as_ref(), &inner.window_label).await {
                log::warn!("ウィンドウ非表示に失敗: {e}");
            }
        });
    }
}
