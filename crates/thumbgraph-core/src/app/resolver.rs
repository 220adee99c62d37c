//! LinkResolver - クエリ時に `thumbnailRef` を File ノードへ解決
//!
//! # 設計原則
//! - 読み取り専用（副作用なし、独自キャッシュなし）
//! - 失敗しない: 参照なし・dangling・ストア障害はすべて `None`
//! - Clone して複数のクエリから同時に使える

use std::sync::Arc;

use crate::domain::{FileNode, SourceDocument};
use crate::ports::EntityStore;

#[derive(Clone)]
pub struct LinkResolver {
    entities: Arc<dyn EntityStore>,
}

impl LinkResolver {
    pub fn new(entities: Arc<dyn EntityStore>) -> Self {
        Self { entities }
    }

    /// The thumbnail artifact of `document`, if it still exists.
    pub async fn resolve(&self, document: &SourceDocument) -> Option<FileNode> {
        let artifact = document.thumbnail_ref.as_ref()?;
        match self.entities.file_by_id(artifact.file_id()).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(document = %document.id, file = %artifact, error = %e, "thumbnail lookup failed");
                None
            }
        }
    }
}
