//! FsMaterializer - PNG をディスクに書き出し、File ノードとして登録
//!
//! # 実装詳細
//! - 保存先: `<root>/<file id>/<name>.png`
//! - ファイル ID は IdGenerator（ULID）で採番
//! - 書き込み成功後に EntityStore::create_file でノードを登録
//! - 空のバッファは生成物として扱わず `Ok(None)`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ArtifactRef, FileNode, FileOrigin, MaterializeError};
use crate::ports::{ArtifactMaterializer, ArtifactRequest, EntityStore, IdGenerator};

const PNG_MEDIA_TYPE: &str = "image/png";

pub struct FsMaterializer {
    root: PathBuf,
    entities: Arc<dyn EntityStore>,
    ids: Arc<dyn IdGenerator>,
}

impl FsMaterializer {
    pub fn new(
        root: impl Into<PathBuf>,
        entities: Arc<dyn EntityStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            root: root.into(),
            entities,
            ids,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactMaterializer for FsMaterializer {
    async fn create_artifact(
        &self,
        request: ArtifactRequest,
    ) -> Result<Option<ArtifactRef>, MaterializeError> {
        if request.bytes.is_empty() {
            tracing::debug!(name = %request.name, "refusing to materialize an empty buffer");
            return Ok(None);
        }

        let id = self.ids.generate_file_id();
        let file_name = format!("{}.png", request.name);
        let dir = self.root.join(id.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| MaterializeError::Io {
                path: dir.clone(),
                source,
            })?;

        let path = std::path::absolute(dir.join(&file_name)).map_err(|source| {
            MaterializeError::Io {
                path: dir.join(&file_name),
                source,
            }
        })?;
        tokio::fs::write(&path, &request.bytes)
            .await
            .map_err(|source| MaterializeError::Io {
                path: path.clone(),
                source,
            })?;

        let node = FileNode {
            id: id.clone(),
            name: file_name,
            absolute_path: path,
            media_type: Some(PNG_MEDIA_TYPE.to_string()),
            size: request.bytes.len() as u64,
            origin: FileOrigin::Generated,
        };
        self.entities.create_file(node).await?;
        tracing::debug!(file = %id, "materialized artifact");

        Ok(Some(ArtifactRef::new(id)))
    }
}
