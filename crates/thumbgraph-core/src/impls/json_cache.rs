//! JsonFileCacheStore - JSON ファイルに永続化するキャッシュストア
//!
//! # 実装詳細
//! - 全エントリをメモリ上の BTreeMap に保持し、`set` のたびにファイルを書き直す
//! - 書き込みは一時ファイル + rename なので、クラッシュしても中途半端な
//!   エントリが残らない（キー単位でアトミック）
//! - tokio::sync::Mutex を await をまたいで保持し、書き込みを直列化する
//! - ファイル I/O は spawn_blocking で実行

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::inmem_store::parent_dir;
use crate::domain::{CacheError, CacheKey};
use crate::ports::{CacheEntry, CacheStore};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, CacheEntry>,
}

/// Durable cache backed by a single JSON file.
///
/// ```ignore
/// let cache = JsonFileCacheStore::open(".thumbgraph/cache.json").await?;
/// cache.set(&key, entry).await?;
/// ```
#[derive(Clone)]
pub struct JsonFileCacheStore {
    path: PathBuf,
    entries: Arc<Mutex<BTreeMap<String, CacheEntry>>>,
}

impl JsonFileCacheStore {
    /// Open (or lazily create) the cache file at `path`.
    ///
    /// The file is only created by the first `set`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => parse(&path, &bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened thumbnail cache");
        Ok(Self {
            path,
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

fn parse(path: &Path, bytes: &[u8]) -> Result<BTreeMap<String, CacheEntry>, CacheError> {
    let file: CacheFile = serde_json::from_slice(bytes).map_err(|e| CacheError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if file.version != FORMAT_VERSION {
        return Err(CacheError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("unsupported format version {}", file.version),
        });
    }
    Ok(file.entries)
}

fn persist(path: &Path, entries: BTreeMap<String, CacheEntry>) -> Result<(), CacheError> {
    use std::io::Write;

    let io_err = |source: std::io::Error, path: &Path| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = CacheFile {
        version: FORMAT_VERSION,
        entries,
    };
    let json = serde_json::to_vec_pretty(&file).map_err(|e| CacheError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| io_err(e, &dir))?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| io_err(e, &dir))?;
    tmp.write_all(&json).map_err(|e| io_err(e, tmp.path()))?;
    tmp.as_file().sync_all().map_err(|e| io_err(e, tmp.path()))?;
    tmp.persist(path).map_err(|e| io_err(e.error, path))?;
    Ok(())
}

#[async_trait]
impl CacheStore for JsonFileCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.lock().await.get(key.as_str()).cloned())
    }

    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.as_str().to_string(), entry);

        // ファイルへの書き込みが成功してからメモリ側を差し替える
        let path = self.path.clone();
        let to_disk = next.clone();
        tokio::task::spawn_blocking(move || persist(&path, to_disk))
            .await
            .map_err(|e| CacheError::Unavailable(format!("cache write task failed: {e}")))??;

        *entries = next;
        Ok(())
    }
}
