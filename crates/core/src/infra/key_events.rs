use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::shortcut::KeyEvent;

/// keydown イベント種別
pub const KEYDOWN: &str = "keydown";

/// キーイベントリスナー。削除は `Arc::ptr_eq` による同一性で判定する。
pub type KeyListener = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// グローバルなキーイベント発生源
pub trait KeyEventSource: Send + Sync {
    fn add_listener(&self, event_type: &str, listener: KeyListener);
    fn remove_listener(&self, event_type: &str, listener: &KeyListener);
}

/// イベント種別ごとのリスナー一覧を持つバス
#[derive(Default)]
pub struct KeyEventBus {
    listeners: Mutex<HashMap<String, Vec<KeyListener>>>,
}

impl KeyEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みリスナーへ同期的に配信する。
    ///
    /// 配信中にリスナーが追加・削除されても、その回の配信対象は変わらない。
    pub fn dispatch(&self, event_type: &str, event: &KeyEvent) {
        let snapshot: Vec<KeyListener> = self
            .listeners
            .lock()
            .get(event_type)
            .cloned()
            .unwrap_or_default();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn key_down(&self, event: &KeyEvent) {
        self.dispatch(KEYDOWN, event);
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .lock()
            .get(event_type)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl KeyEventSource for KeyEventBus {
    fn add_listener(&self, event_type: &str, listener: KeyListener) {
        self.listeners
            .lock()
            .entry(event_type.to_string())
            .or_default()
            .push(listener);
    }

    fn remove_listener(&self, event_type: &str, listener: &KeyListener) {
        let mut listeners = self.listeners.lock();
        if let Some(list) = listeners.get_mut(event_type) {
            if let Some(pos) = list.iter().position(|l| Arc::ptr_eq(l, listener)) {
                list.remove(pos);
            }
            if list.is_empty() {
                listeners.remove(event_type);
            }
        }
    }
}
