//! ArtifactCache - キャッシュキー → 生成物参照 のメモ化レイヤー
//!
//! # 学習ポイント
//! - ヒット時の keep-alive（touch）を get の副作用として持つ
//! - 参照先の存在確認はしない（dangling な参照もそのまま返す）
//! - touch の失敗はヒットをミスに変えない

use std::sync::Arc;

use crate::domain::{ArtifactRef, CacheError, CacheKey};
use crate::ports::{CacheEntry, CacheStore, Clock, EntityStore};

pub struct ArtifactCache {
    store: Arc<dyn CacheStore>,
    entities: Arc<dyn EntityStore>,
    clock: Arc<dyn Clock>,
}

impl ArtifactCache {
    pub fn new(
        store: Arc<dyn CacheStore>,
        entities: Arc<dyn EntityStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            entities,
            clock,
        }
    }

    /// Look up `key`; on a hit, keep the referenced artifact alive.
    ///
    /// A hit is returned even if the artifact no longer exists. Resolution
    /// happens lazily in `LinkResolver`.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<ArtifactRef>, CacheError> {
        let Some(entry) = self.store.get(key).await? else {
            return Ok(None);
        };

        match self.entities.touch(&entry.file_node_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(key = %key, file = %entry.file_node_id, "cached artifact is dangling");
            }
            Err(e) => {
                tracing::warn!(key = %key, file = %entry.file_node_id, error = %e, "keep-alive failed");
            }
        }
        Ok(Some(ArtifactRef::new(entry.file_node_id)))
    }

    /// Record `artifact` under `key`, replacing any previous entry.
    pub async fn set(&self, key: &CacheKey, artifact: &ArtifactRef) -> Result<(), CacheError> {
        let entry = CacheEntry {
            file_node_id: artifact.file_id().clone(),
            cached_at: self.clock.now(),
        };
        self.store.set(key, entry).await
    }
}
