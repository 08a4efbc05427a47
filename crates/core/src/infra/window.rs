use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

/// ウィンドウ操作エラー
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Window lookup failed: {0}")]
    Lookup(String),
    #[error("Window hide failed: {0}")]
    Hide(String),
}

/// ラベル付きウィンドウへの参照（hide のみ公開）
#[async_trait]
pub trait WindowHandle: Send + Sync {
    fn label(&self) -> &str;
    async fn hide(&self) -> Result<(), WindowError>;
}

/// ラベルからウィンドウを引く
#[async_trait]
pub trait WindowManager: Send + Sync {
    async fn get_by_label(&self, label: &str)
        -> Result<Option<Arc<dyn WindowHandle>>, WindowError>;
}

/// ラベルのウィンドウを隠す。見つからなければ何もしない。
///
/// 隠したウィンドウがあれば true を返す。
pub async fn hide_window(windows: &dyn WindowManager, label: &str) -> Result<bool, WindowError> {
    match windows.get_by_label(label).await? {
        Some(handle) => {
            handle.hide().await?;
            log::debug!("ウィンドウを非表示: {}", handle.label());
            Ok(true)
        }
        None => {
            log::debug!("ウィンドウが見つかりません: {label}");
            Ok(false)
        }
    }
}

/// プロセス内のウィンドウ
pub struct RegisteredWindow {
    label: String,
    visible: AtomicBool,
    hide_count: AtomicUsize,
}

impl RegisteredWindow {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    /// hide が呼ばれた回数
    pub fn hide_count(&self) -> usize {
        self.hide_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WindowHandle for RegisteredWindow {
    fn label(&self) -> &str {
        &self.label
    }

    async fn hide(&self) -> Result<(), WindowError> {
        self.visible.store(false, Ordering::SeqCst);
        self.hide_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// ラベル → ウィンドウのレジストリ。ホスト側のウィンドウシステムの代わりに使う。
#[derive(Default)]
pub struct WindowRegistry {
    windows: Mutex<HashMap<String, Arc<RegisteredWindow>>>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// ウィンドウを登録して表示状態にする。既存ならそれを表示する。
    pub fn open(&self, label: &str) -> Arc<RegisteredWindow> {
        let mut windows = self.windows.lock();
        let window = windows
            .entry(label.to_string())
            .or_insert_with(|| {
                Arc::new(RegisteredWindow {
                    label: label.to_string(),
                    visible: AtomicBool::new(false),
                    hide_count: AtomicUsize::new(0),
                })
            })
            .clone();
        window.show();
        window
    }

    pub fn close(&self, label: &str) -> bool {
        self.windows.lock().remove(label).is_some()
    }
}

#[async_trait]
impl WindowManager for WindowRegistry {
    async fn get_by_label(
        &self,
        label: &str,
    ) -> Result<Option<Arc<dyn WindowHandle>>, WindowError> {
        Ok(self
            .windows
            .lock()
            .get(label)
            .cloned()
            .map(|w| w as Arc<dyn WindowHandle>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hide_registered_window() {
        let registry = WindowRegistry::new();
        let main = registry.open("main");
        assert!(main.is_visible());

        let hidden = hide_window(&registry, "main").await.unwrap();
        assert!(hidden);
        assert!(!main.is_visible());
        assert_eq!(main.hide_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_window_is_noop() {
        let registry = WindowRegistry::new();
        let hidden = hide_window(&registry, "settings").await.unwrap();
        assert!(!hidden);
    }

    #[tokio::test]
    async fn test_open_existing_window_shows_it() {
        let registry = WindowRegistry::new();
        let first = registry.open("main");
        first.hide().await.unwrap();
        let second = registry.open("main");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_visible());
    }

    #[tokio::test]
    async fn test_closed_window_is_not_found() {
        let registry = WindowRegistry::new();
        registry.open("main");
        let found = registry.get_by_label("main").await.unwrap().unwrap();
        assert_eq!(found.label(), "main");

        assert!(registry.close("main"));
        assert!(registry.get_by_label("main").await.unwrap().is_none());
    }
}
