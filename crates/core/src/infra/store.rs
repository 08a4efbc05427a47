//! キー/バリューストア。
//!
//! `load(path)` でハンドルを取得し、`get` / `set` はメモリ上の値を読み書き、
//! `save` でバッキングファイルへ書き出す。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

/// ストアエラー
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O failed ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Store file is not a JSON object ({path}): {message}")]
    Format { path: String, message: String },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// 読み込み済みストアへのハンドル
#[async_trait]
pub trait StoreHandle: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn save(&self) -> Result<(), StoreError>;
}

/// ストアの読み込み
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, path: &str) -> Result<Arc<dyn StoreHandle>, StoreError>;
}

// ─── JSON ファイル ──────────────────────────────────────────────

/// JSON オブジェクトを1ファイルに保存するストア。
/// 同じパスの `load` は同じハンドルを返す。
pub struct JsonFileStore {
    base_dir: PathBuf,
    handles: Mutex<HashMap<PathBuf, Arc<JsonFileHandle>>>,
}

impl JsonFileStore {
    /// 相対パスは `base_dir` 基準で解決する
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            handles: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, path: &str) -> Result<Arc<dyn StoreHandle>, StoreError> {
        let file = self.resolve(path);
        let cached = self.handles.lock().get(&file).cloned();
        if let Some(handle) = cached {
            return Ok(handle as Arc<dyn StoreHandle>);
        }

        let entries = read_entries(&file).await?;
        log::info!("ストア読み込み: {} ({} キー)", file.display(), entries.len());

        // 読み込み中に別の load が先に登録していればそちらを使う
        let handle = self
            .handles
            .lock()
            .entry(file.clone())
            .or_insert_with(|| {
                Arc::new(JsonFileHandle {
                    path: file,
                    entries: Mutex::new(entries),
                    save_lock: tokio::sync::Mutex::new(()),
                })
            })
            .clone();
        Ok(handle as Arc<dyn StoreHandle>)
    }
}

async fn read_entries(file: &Path) -> Result<Map<String, Value>, StoreError> {
    let raw = match tokio::fs::read_to_string(file).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: file.display().to_string(),
                source,
            })
        }
    };
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Format {
            path: file.display().to_string(),
            message: format!("expected object, found {other}"),
        }),
        Err(e) => Err(StoreError::Format {
            path: file.display().to_string(),
            message: e.to_string(),
        }),
    }
}

pub struct JsonFileHandle {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
    /// スナップショット取得からリネームまでを直列化する
    save_lock: tokio::sync::Mutex<()>,
}

#[async_trait]
impl StoreHandle for JsonFileHandle {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn save(&self) -> Result<(), StoreError> {
        let _saving = self.save_lock.lock().await;
        let body = {
            let entries = self.entries.lock();
            serde_json::to_string_pretty(&*entries).map_err(|e| StoreError::Format {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?
        };

        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        // 一時ファイルに書いてからリネームし、途中まで書かれたファイルを残さない
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, body).await.map_err(io_err)?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(io_err(e));
        }
        log::debug!("ストア保存: {}", self.path.display());
        Ok(())
    }
}

// ─── メモリ ─────────────────────────────────────────────────────

/// メモリ上のストア。パスに関係なく1つのハンドルを共有する。
#[derive(Default)]
pub struct MemoryStore {
    handle: Arc<MemoryHandle>,
}

#[derive(Default)]
pub struct MemoryHandle {
    entries: Mutex<Map<String, Value>>,
    saved: Mutex<Option<Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期値付きで作る
    pub fn with_entry(key: &str, value: Value) -> Self {
        let store = Self::new();
        store.handle.entries.lock().insert(key.to_string(), value);
        store
    }

    pub fn handle(&self) -> Arc<MemoryHandle> {
        self.handle.clone()
    }
}

impl MemoryHandle {
    /// 直近の save 時点の内容
    pub fn saved(&self) -> Option<Map<String, Value>> {
        self.saved.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        *self.saved.lock() = None;
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, _path: &str) -> Result<Arc<dyn StoreHandle>, StoreError> {
        Ok(self.handle.clone() as Arc<dyn StoreHandle>)
    }
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn save(&self) -> Result<(), StoreError> {
        let snapshot = self.entries.lock().clone();
        *self.saved.lock() = Some(snapshot);
        Ok(())
    }
}
