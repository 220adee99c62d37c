//! StoreSourceLocator - `localFile` 参照を辿ってローカルパスを解決
//!
//! ドキュメント → File ノード → 絶対パス の 3 段。どこかで途切れたら
//! `LocalSource::Absent` を返します（エラーにはしない）。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{LocalSource, SourceDocument, StoreError};
use crate::ports::{EntityStore, SourceLocator};

pub struct StoreSourceLocator {
    entities: Arc<dyn EntityStore>,
}

impl StoreSourceLocator {
    pub fn new(entities: Arc<dyn EntityStore>) -> Self {
        Self { entities }
    }
}

#[async_trait]
impl SourceLocator for StoreSourceLocator {
    async fn locate(&self, document: &SourceDocument) -> Result<LocalSource, StoreError> {
        let Some(file_id) = &document.local_file else {
            return Ok(LocalSource::Absent);
        };
        let Some(file) = self.entities.file_by_id(file_id).await? else {
            tracing::debug!(document = %document.id, file = %file_id, "local file reference is dangling");
            return Ok(LocalSource::Absent);
        };
        if !file.absolute_path.is_absolute() {
            tracing::debug!(
                document = %document.id,
                path = %file.absolute_path.display(),
                "local file path is not absolute"
            );
            return Ok(LocalSource::Absent);
        }
        Ok(LocalSource::Present(file.absolute_path))
    }
}
