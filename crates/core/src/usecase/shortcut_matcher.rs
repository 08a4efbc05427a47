use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::shortcut::{HotKey, KeyEvent};
use crate::infra::environment::Environment;
use crate::infra::key_events::{KeyEventSource, KeyListener, KEYDOWN};

/// ショートカットを keydown イベントに登録する
#[derive(Clone)]
pub struct ShortcutMatcher {
    source: Arc<dyn KeyEventSource>,
    env: Arc<dyn Environment>,
}

impl ShortcutMatcher {
    pub fn new(source: Arc<dyn KeyEventSource>, env: Arc<dyn Environment>) -> Self {
        Self { source, env }
    }

    /// `hotkey` に一致する keydown で `callback(args)` を同期的に呼ぶリスナーを1つ登録する。
    ///
    /// プラットフォームはイベントごとに環境から判定する。
    pub fn register<A, F>(&self, hotkey: HotKey, callback: F, args: A) -> ShortcutRegistration
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        let env = self.env.clone();
        let matcher_key = hotkey.clone();
        let listener: KeyListener = Arc::new(move |event: &KeyEvent| {
            if matcher_key.matches(event, env.platform()) {
                log::debug!("ショートカット一致: {:?}", matcher_key);
                callback(args.clone());
            }
        });

        self.source.add_listener(KEYDOWN, listener.clone());
        ShortcutRegistration {
            source: self.source.clone(),
            hotkey,
            listener: Mutex::new(Some(listener)),
        }
    }
}

/// 登録ハンドル。drop または `dispose` でリスナーを外す。
pub struct ShortcutRegistration {
    source: Arc<dyn KeyEventSource>,
    hotkey: HotKey,
    listener: Mutex<Option<KeyListener>>,
}

impl ShortcutRegistration {
    pub fn hotkey(&self) -> &HotKey {
        &self.hotkey
    }

    pub fn is_active(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// 追加したのと同じリスナーを外す。2回目以降は何もしない。
    pub fn dispose(&self) {
        let listener = self.listener.lock().take();
        if let Some(listener) = listener {
            self.source.remove_listener(KEYDOWN, &listener);
        }
    }
}

impl Drop for ShortcutRegistration {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// 再描画ごとの再登録用スロット。`update` のたびに前の登録を外してから新しく登録する。
pub struct ShortcutSlot {
    matcher: ShortcutMatcher,
    current: Mutex<Option<ShortcutRegistration>>,
}

impl ShortcutSlot {
    pub fn new(matcher: ShortcutMatcher) -> Self {
        Self {
            matcher,
            current: Mutex::new(None),
        }
    }

    pub fn update<A, F>(&self, hotkey: HotKey, callback: F, args: A)
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        let mut current = self.current.lock();
        if let Some(old) = current.take() {
            old.dispose();
        }
        *current = Some(self.matcher.register(hotkey, callback, args));
    }

    pub fn clear(&self) {
        if let Some(old) = self.current.lock().take() {
            old.dispose();
        }
    }

    pub fn hotkey(&self) -> Option<HotKey> {
        self.current.lock().as_ref().map(|r| r.hotkey().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::environment::StaticEnvironment;
    use crate::infra::key_events::KeyEventBus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// add/remove に渡されたリスナーを記録するイベント源
    #[derive(Default)]
    struct SpySource {
        bus: KeyEventBus,
        added: Mutex<Vec<(String, KeyListener)>>,
        removed: Mutex<Vec<(String, KeyListener)>>,
    }

    impl KeyEventSource for SpySource {
        fn add_listener(&self, event_type: &str, listener: KeyListener) {
            self.added
                .lock()
                .push((event_type.to_string(), listener.clone()));
            self.bus.add_listener(event_type, listener);
        }

        fn remove_listener(&self, event_type: &str, listener: &KeyListener) {
            self.removed
                .lock()
                .push((event_type.to_string(), listener.clone()));
            self.bus.remove_listener(event_type, listener);
        }
    }

    fn setup(platform_id: &str) -> (Arc<KeyEventBus>, ShortcutMatcher) {
        let bus = Arc::new(KeyEventBus::new());
        let env = Arc::new(StaticEnvironment::new(platform_id));
        let matcher = ShortcutMatcher::new(bus.clone(), env);
        (bus, matcher)
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn(()) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move |_: ()| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_callback_on_matching_key() {
        let (bus, matcher) = setup("linux");
        let (count, cb) = counter();
        let _reg = matcher.register(HotKey::new("k"), cb, ());

        bus.key_down(&KeyEvent::new("k"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_callback_on_other_key() {
        let (bus, matcher) = setup("linux");
        let (count, cb) = counter();
        let _reg = matcher.register(HotKey::new("k"), cb, ());

        bus.key_down(&KeyEvent::new("j"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_mac_cmd_k() {
        let (bus, matcher) = setup("mac os x");
        let (count, cb) = counter();
        let _reg = matcher.register(HotKey::new("k").with_cmd(), cb, ());

        bus.key_down(&KeyEvent::new("k").ctrl());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        bus.key_down(&KeyEvent::new("k").meta());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mac_alt_shift_k() {
        let (bus, matcher) = setup("mac os x");
        let (count, cb) = counter();
        let _reg = matcher.register(HotKey::new("k").with_alt().with_shift(), cb, ());

        bus.key_down(&KeyEvent::new("k").alt().shift());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mac_missing_modifier() {
        let (bus, matcher) = setup("mac os x");
        let (count, cb) = counter();
        let _reg = matcher.register(HotKey::new("k").with_cmd().with_alt(), cb, ());

        bus.key_down(&KeyEvent::new("k").meta());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_windows_cmd_maps_to_ctrl() {
        let (bus, matcher) = setup("windows nt");
        let (count, cb) = counter();
        let _reg = matcher.register(HotKey::new("k").with_cmd(), cb, ());

        bus.key_down(&KeyEvent::new("k").meta());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        bus.key_down(&KeyEvent::new("k").ctrl());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_platform_is_read_per_event() {
        let bus = Arc::new(KeyEventBus::new());
        let env = Arc::new(StaticEnvironment::new("mac os x"));
        let matcher = ShortcutMatcher::new(bus.clone(), env.clone());
        let (count, cb) = counter();
        let _reg = matcher.register(HotKey::new("k").with_cmd(), cb, ());

        env.set_platform_id("windows nt");
        bus.key_down(&KeyEvent::new("k").ctrl());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_args_are_passed_to_callback() {
        let (bus, matcher) = setup("linux");
        let received: Arc<Mutex<Vec<(String, i32)>>> = Arc::new(Mutex::new(vec![]));
        let sink = received.clone();
        let _reg = matcher.register(
            HotKey::new("k"),
            move |(a, b): (String, i32)| sink.lock().push((a, b)),
            ("hello".to_string(), 123),
        );

        bus.key_down(&KeyEvent::new("k"));
        assert_eq!(*received.lock(), vec![("hello".to_string(), 123)]);
    }

    #[test]
    fn test_dispose_removes_same_listener() {
        let spy = Arc::new(SpySource::default());
        let env = Arc::new(StaticEnvironment::new("linux"));
        let matcher = ShortcutMatcher::new(spy.clone(), env);
        let (count, cb) = counter();

        let reg = matcher.register(HotKey::new("k"), cb, ());
        reg.dispose();
        reg.dispose();

        let added = spy.added.lock();
        let removed = spy.removed.lock();
        assert_eq!(added.len(), 1);
        assert_eq!(removed.len(), 1);
        assert_eq!(added[0].0, KEYDOWN);
        assert_eq!(removed[0].0, KEYDOWN);
        assert!(Arc::ptr_eq(&added[0].1, &removed[0].1));
        assert!(!reg.is_active());

        spy.bus.key_down(&KeyEvent::new("k"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_disposes() {
        let (bus, matcher) = setup("linux");
        let (count, cb) = counter();
        {
            let _reg = matcher.register(HotKey::new("k"), cb, ());
            assert_eq!(bus.listener_count(KEYDOWN), 1);
        }
        assert_eq!(bus.listener_count(KEYDOWN), 0);
        bus.key_down(&KeyEvent::new("k"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_slot_reregistration_does_not_double_fire() {
        let (bus, matcher) = setup("linux");
        let slot = ShortcutSlot::new(matcher);
        let (count, _) = counter();

        for _ in 0..3 {
            let c = count.clone();
            slot.update(
                HotKey::new("k"),
                move |_: ()| {
                    c.fetch_add(1, Ordering::SeqCst);
                },
                (),
            );
        }
        assert_eq!(bus.listener_count(KEYDOWN), 1);

        bus.key_down(&KeyEvent::new("k"));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        slot.update(HotKey::new("j"), |_: ()| {}, ());
        assert_eq!(slot.hotkey(), Some(HotKey::new("j")));

        slot.clear();
        assert_eq!(bus.listener_count(KEYDOWN), 0);
        assert!(slot.hotkey().is_none());
    }
}
