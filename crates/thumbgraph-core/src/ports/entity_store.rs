//! EntityStore port - グラフ/エンティティストア
//!
//! ノードの保存とインデックスは外部ストアの責務です。
//! コアが必要とするのは以下の操作だけ:
//! - 型名でドキュメントを列挙（getNodesByType）
//! - ID で File ノードを引く（getNodeById）
//! - ドキュメントに派生フィールドを追加（createField）
//! - 生存シグナル（touch）
//! - 生成物ノードの作成（マテリアライザが使う）

use async_trait::async_trait;

use crate::domain::{ArtifactRef, DocumentId, FileId, FileNode, SourceDocument, StoreError};

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn documents_by_type(&self, kind: &str) -> Result<Vec<SourceDocument>, StoreError>;

    /// `Ok(None)` when the id does not resolve (deleted or never existed).
    async fn file_by_id(&self, id: &FileId) -> Result<Option<FileNode>, StoreError>;

    /// Add or overwrite the document's `thumbnailRef` field.
    async fn set_thumbnail_ref(
        &self,
        document: &DocumentId,
        artifact: &ArtifactRef,
    ) -> Result<(), StoreError>;

    /// Keep a file alive for the current pass.
    ///
    /// Returns `false` if the id no longer resolves.
    async fn touch(&self, id: &FileId) -> Result<bool, StoreError>;

    async fn create_file(&self, node: FileNode) -> Result<(), StoreError>;
}
