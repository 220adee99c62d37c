//! InMemoryEntityStore - JSON スナップショットで永続化できるエンティティストア
//!
//! # 学習ポイント
//! - tokio::sync::RwLock による読み多め・書き少なめの排他制御
//! - パス（1 回の generate 実行）単位の keep-alive 追跡
//! - 一時ファイル + rename によるスナップショットのアトミック保存
//!
//! 本番のグラフストアの代わりに CLI とテストで使います。

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::{
    ArtifactRef, DocumentId, FileId, FileNode, FileOrigin, SourceDocument, StoreError,
};
use crate::ports::EntityStore;

/// On-disk layout of a graph snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub documents: Vec<SourceDocument>,

    #[serde(default)]
    pub files: Vec<FileNode>,

    /// Files created or touched during the last pass.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub live: Vec<FileId>,
}

#[derive(Debug, Default)]
struct GraphState {
    documents: BTreeMap<DocumentId, SourceDocument>,
    files: BTreeMap<FileId, FileNode>,
    live: BTreeSet<FileId>,
}

impl From<GraphSnapshot> for GraphState {
    fn from(snapshot: GraphSnapshot) -> Self {
        Self {
            documents: snapshot
                .documents
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
            files: snapshot.files.into_iter().map(|f| (f.id.clone(), f)).collect(),
            live: snapshot.live.into_iter().collect(),
        }
    }
}

impl GraphState {
    fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            documents: self.documents.values().cloned().collect(),
            files: self.files.values().cloned().collect(),
            live: self.live.iter().cloned().collect(),
        }
    }
}

/// InMemoryEntityStore は開発用・テスト用のエンティティストア
///
/// # Garbage collection
/// Generated files must be created or touched in every pass; otherwise
/// [`collect_garbage`](Self::collect_garbage) reclaims them. Downloaded files
/// are never collected.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    state: Arc<RwLock<GraphState>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot.into())),
        }
    }

    /// Load a snapshot from disk. A missing file yields an empty graph.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "graph snapshot not found; starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let snapshot: GraphSnapshot = serde_json::from_slice(&bytes)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Save the current graph, replacing the file atomically.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref().to_path_buf();
        let json = serde_json::to_vec_pretty(&self.snapshot().await)?;

        tokio::task::spawn_blocking(move || write_atomically(&path, &json))
            .await
            .map_err(|e| StoreError::Unavailable(format!("save task failed: {e}")))?
    }

    pub async fn snapshot(&self) -> GraphSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn insert_document(&self, document: SourceDocument) {
        let mut state = self.state.write().await;
        state.documents.insert(document.id.clone(), document);
    }

    pub async fn insert_file(&self, file: FileNode) {
        let mut state = self.state.write().await;
        state.files.insert(file.id.clone(), file);
    }

    pub async fn document(&self, id: &DocumentId) -> Option<SourceDocument> {
        self.state.read().await.documents.get(id).cloned()
    }

    /// Delete a file node (simulates external deletion).
    pub async fn remove_file(&self, id: &FileId) -> Option<FileNode> {
        let mut state = self.state.write().await;
        state.live.remove(id);
        state.files.remove(id)
    }

    /// Whether the file was created or touched during the current pass.
    pub async fn is_live(&self, id: &FileId) -> bool {
        self.state.read().await.live.contains(id)
    }

    /// Start a new pass: forget which files were kept alive.
    pub async fn begin_pass(&self) {
        self.state.write().await.live.clear();
    }

    /// Remove generated files that were neither created nor touched in the
    /// current pass. Returns the removed ids.
    ///
    /// Document references to removed files are left dangling.
    pub async fn collect_garbage(&self) -> Vec<FileId> {
        let mut state = self.state.write().await;
        let GraphState { files, live, .. } = &mut *state;
        let stale: Vec<FileId> = files
            .values()
            .filter(|f| f.origin == FileOrigin::Generated && !live.contains(&f.id))
            .map(|f| f.id.clone())
            .collect();
        for id in &stale {
            files.remove(id);
        }
        if !stale.is_empty() {
            tracing::info!(removed = stale.len(), "collected stale generated files");
        }
        stale
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    use std::io::Write;

    let io_err = |source: std::io::Error, path: &Path| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| io_err(e, &dir))?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| io_err(e, &dir))?;
    tmp.write_all(bytes).map_err(|e| io_err(e, tmp.path()))?;
    tmp.persist(path).map_err(|e| io_err(e.error, path))?;
    Ok(())
}

pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn documents_by_type(&self, kind: &str) -> Result<Vec<SourceDocument>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .documents
            .values()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect())
    }

    async fn file_by_id(&self, id: &FileId) -> Result<Option<FileNode>, StoreError> {
        Ok(self.state.read().await.files.get(id).cloned())
    }

    async fn set_thumbnail_ref(
        &self,
        document: &DocumentId,
        artifact: &ArtifactRef,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let doc = state
            .documents
            .get_mut(document)
            .ok_or_else(|| StoreError::DocumentNotFound(document.to_string()))?;
        doc.thumbnail_ref = Some(artifact.clone());
        Ok(())
    }

    async fn touch(&self, id: &FileId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.files.contains_key(id) {
            return Ok(false);
        }
        state.live.insert(id.clone());
        Ok(true)
    }

    async fn create_file(&self, node: FileNode) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.live.insert(node.id.clone());
        state.files.insert(node.id.clone(), node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{downloaded_file, generated_file, pdf_document};

    #[tokio::test]
    async fn documents_by_type_filters_on_node_type() {
        let store = InMemoryEntityStore::new();
        store.insert_document(pdf_document("A", None)).await;
        let mut other = pdf_document("B", None);
        other.kind = "ContentfulEntry".to_string();
        store.insert_document(other).await;

        let docs = store.documents_by_type("ContentfulAsset").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].external_id, "A");
    }

    #[tokio::test]
    async fn touch_reports_dangling_ids() {
        let store = InMemoryEntityStore::new();
        store.insert_file(generated_file("file-1")).await;

        assert!(store.touch(&FileId::new("file-1")).await.unwrap());
        assert!(!store.touch(&FileId::new("file-missing")).await.unwrap());
        assert!(store.is_live(&FileId::new("file-1")).await);
    }

    #[tokio::test]
    async fn set_thumbnail_ref_on_unknown_document_fails() {
        let store = InMemoryEntityStore::new();
        let err = store
            .set_thumbnail_ref(
                &DocumentId::new("nope"),
                &ArtifactRef::new(FileId::new("file-1")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn garbage_collection_spares_touched_and_downloaded_files() {
        let store = InMemoryEntityStore::new();
        store.insert_file(generated_file("file-kept")).await;
        store.insert_file(generated_file("file-stale")).await;
        store.insert_file(downloaded_file("file-local", "/tmp/a.pdf")).await;

        store.begin_pass().await;
        store.touch(&FileId::new("file-kept")).await.unwrap();
        let removed = store.collect_garbage().await;

        assert_eq!(removed, vec![FileId::new("file-stale")]);
        assert!(store.file_by_id(&FileId::new("file-kept")).await.unwrap().is_some());
        assert!(store.file_by_id(&FileId::new("file-local")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn snapshot_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let store = InMemoryEntityStore::new();
        store
            .insert_document(pdf_document("A", Some("file-local")))
            .await;
        store.create_file(generated_file("file-1")).await.unwrap();
        store.save(&path).await.unwrap();

        let reloaded = InMemoryEntityStore::load(&path).await.unwrap();
        assert_eq!(reloaded.snapshot().await, store.snapshot().await);
        assert!(reloaded.is_live(&FileId::new("file-1")).await);
    }

    #[tokio::test]
    async fn loading_a_missing_snapshot_yields_an_empty_graph() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryEntityStore::load(dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(store.snapshot().await, GraphSnapshot::default());
    }
}
