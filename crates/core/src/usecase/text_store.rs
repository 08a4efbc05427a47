//! テキストとキー/バリューストアの同期。
//!
//! `mount` でストアの読み込みを非同期に開始し、読み込めたら保存済みの値で
//! メモリ上のテキストを上書きする。`write` はメモリ上の値を即座に更新し、
//! ストアが読み込み済みのときだけ保存タスクへ最新値を渡す。
//! 保存タスクは1つだけで、未保存の値は最新のものへまとめられる。

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::domain::error::AppError;
use crate::domain::text::{PersistedText, TEXT_KEY};
use crate::infra::store::{KeyValueStore, StoreHandle};

/// ストアハンドルの取得状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingState {
    Unbound,
    Binding,
    Bound,
}

struct Inner {
    text_tx: watch::Sender<String>,
    binding_tx: watch::Sender<BindingState>,
    settled_tx: watch::Sender<bool>,
    /// ストア取得後の保存タスクへの送り口
    persist_tx: Mutex<Option<watch::Sender<String>>>,
}

impl Inner {
    fn set_text(&self, text: String) {
        self.text_tx.send_replace(text);
    }
}

#[derive(Clone)]
pub struct TextStore {
    inner: Arc<Inner>,
}

impl TextStore {
    /// ストアの読み込みを開始する。tokio ランタイム外で呼ぶと `E_INVALID_STATE`。
    pub fn mount(
        store: Arc<dyn KeyValueStore>,
        path: impl Into<String>,
        initial_text: impl Into<String>,
    ) -> Result<Self, AppError> {
        let runtime = Handle::try_current()
            .map_err(|e| AppError::invalid_state(format!("no tokio runtime: {e}")))?;
        let (text_tx, _) = watch::channel(initial_text.into());
        let (binding_tx, _) = watch::channel(BindingState::Unbound);
        let (settled_tx, _) = watch::channel(false);
        let inner = Arc::new(Inner {
            text_tx,
            binding_tx,
            settled_tx,
            persist_tx: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        runtime.spawn(bind(weak, store, path.into()));

        Ok(Self { inner })
    }

    /// 現在のテキスト
    pub fn read(&self) -> String {
        self.inner.text_tx.borrow().clone()
    }

    /// テキストを更新する。ストア未取得なら永続化はしない。
    pub fn write(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.set_text(text.clone());

        match self.inner.persist_tx.lock().as_ref() {
            Some(tx) => {
                tx.send_replace(text);
            }
            None => log::debug!("ストア未取得のため保存をスキップ"),
        }
    }

    pub fn binding_state(&self) -> BindingState {
        *self.inner.binding_tx.borrow()
    }

    pub fn is_bound(&self) -> bool {
        self.binding_state() == BindingState::Bound
    }

    /// テキストの変更を購読する
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.inner.text_tx.subscribe()
    }

    /// ストアの取得と初回読み込みが（成否にかかわらず）終わるまで待つ
    pub async fn settled(&self) {
        let mut rx = self.inner.settled_tx.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }
}

async fn persist(handle: &dyn StoreHandle, text: String) -> Result<(), AppError> {
    let value = serde_json::to_value(PersistedText::new(text))
        .map_err(|e| AppError::internal(format!("serialize text: {e}")))?;
    handle.set(TEXT_KEY, value).await?;
    handle.save().await?;
    Ok(())
}

/// 送り口が閉じる（TextStore が破棄される）まで最新値を順に保存する。
/// 閉じる前に送られた値は保存してから終わる。
async fn run_writer(handle: Arc<dyn StoreHandle>, mut rx: watch::Receiver<String>) {
    while rx.changed().await.is_ok() {
        let text = rx.borrow_and_update().clone();
        if let Err(e) = persist(handle.as_ref(), text).await {
            log::warn!("テキストの保存に失敗: {e}");
        }
    }
    log::debug!("保存タスク終了");
}

async fn bind(weak: Weak<Inner>, store: Arc<dyn KeyValueStore>, path: String) {
    if let Some(inner) = weak.upgrade() {
        inner.binding_tx.send_replace(BindingState::Binding);
    } else {
        return;
    }

    let loaded = store.load(&path).await;

    let Some(inner) = weak.upgrade() else {
        return;
    };
    let handle = match loaded {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("ストアの読み込みに失敗: {e}");
            inner.binding_tx.send_replace(BindingState::Unbound);
            inner.settled_tx.send_replace(true);
            return;
        }
    };
    let (persist_tx, persist_rx) = watch::channel(String::new());
    tokio::spawn(run_writer(handle.clone(), persist_rx));
    *inner.persist_tx.lock() = Some(persist_tx);
    inner.binding_tx.send_replace(BindingState::Bound);
    log::info!("ストア取得: {path}");
    drop(inner);

    let saved = handle.get(TEXT_KEY).await;

    let Some(inner) = weak.upgrade() else {
        return;
    };
    match saved {
        Ok(Some(value)) => match serde_json::from_value::<PersistedText>(value) {
            Ok(saved) => inner.set_text(saved.value),
            Err(e) => log::warn!("保存済みテキストの形式が不正: {e}"),
        },
        Ok(None) => log::debug!("保存済みテキストなし"),
        Err(e) => log::warn!("保存済みテキストの読み込みに失敗: {e}"),
    }
    inner.settled_tx.send_replace(true);
}
