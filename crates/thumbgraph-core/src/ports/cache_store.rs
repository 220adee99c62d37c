//! CacheStore port - プロセスをまたいで残る key-value ストア
//!
//! 値は「どの生成物を指しているか」だけ。生成物そのもの（バイト列）は
//! エンティティストア側にあり、ここには入りません。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CacheError, CacheKey, FileId};

/// A persisted cache record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub file_node_id: FileId,
    pub cached_at: DateTime<Utc>,
}

/// Durable key-value persistence.
///
/// # 設計原則
/// - `get` は存在しないキーに対して `Ok(None)`（エラーにしない）
/// - `set` は上書き（冪等）で、キー単位でアトミック
/// - エントリはプロセス再起動後も残る
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError>;
}
