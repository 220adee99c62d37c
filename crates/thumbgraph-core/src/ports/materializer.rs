//! ArtifactMaterializer port - バッファを File ノードとして永続化
//!
//! 生成物の保存先（ディスク、Blob ストレージ等）は実装ごとに異なります。
//! コアは返ってきた参照（ID）だけを保持し、バイト列は手放します。

use async_trait::async_trait;

use crate::domain::{ArtifactRef, MaterializeError};

/// Bytes to persist plus the display name of the resulting node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRequest {
    pub bytes: Vec<u8>,
    pub name: String,
}

#[async_trait]
pub trait ArtifactMaterializer: Send + Sync {
    /// `Ok(None)` means the materializer declined to create an artifact
    /// (e.g. empty content).
    async fn create_artifact(
        &self,
        request: ArtifactRequest,
    ) -> Result<Option<ArtifactRef>, MaterializeError>;
}
