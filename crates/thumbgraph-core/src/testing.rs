//! Test fixtures and fakes shared by the unit tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::{
    ArtifactRef, CacheError, CacheKey, DocumentId, FileId, FileNode, FileOrigin, MaterializeError,
    RenderError, SourceDocument, StoreError,
};
use crate::impls::InMemoryEntityStore;
use crate::ports::{
    ArtifactMaterializer, ArtifactRequest, CacheEntry, CacheStore, EntityStore, Rasterizer,
    RenderOptions, RenderedPage,
};

pub const PDF: &str = "application/pdf";
pub const ASSET: &str = "ContentfulAsset";

/// A `ContentfulAsset` PDF in locale `en`, node id `asset-<external_id>`.
pub fn pdf_document(external_id: &str, local_file: Option<&str>) -> SourceDocument {
    SourceDocument {
        id: DocumentId::new(format!("asset-{external_id}")),
        kind: ASSET.to_string(),
        external_id: external_id.to_string(),
        locale: "en".to_string(),
        media_type: Some(PDF.to_string()),
        file_name: format!("{external_id}.pdf"),
        local_file: local_file.map(FileId::new),
        thumbnail_ref: None,
    }
}

pub fn generated_file(id: &str) -> FileNode {
    FileNode {
        id: FileId::new(id),
        name: format!("{id}.png"),
        absolute_path: PathBuf::from(format!("/artifacts/{id}.png")),
        media_type: Some("image/png".to_string()),
        size: 4,
        origin: FileOrigin::Generated,
    }
}

pub fn downloaded_file(id: &str, path: &str) -> FileNode {
    FileNode {
        id: FileId::new(id),
        name: Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        absolute_path: PathBuf::from(path),
        media_type: Some(PDF.to_string()),
        size: 1024,
        origin: FileOrigin::Downloaded,
    }
}

#[derive(Debug, Clone)]
pub enum RenderBehavior {
    Png(Vec<u8>),
    NoPages,
    Fail,
}

/// Rasterizer fake that counts calls and records the options it saw.
pub struct FakeRasterizer {
    behavior: RenderBehavior,
    calls: AtomicUsize,
    seen: Mutex<Vec<(PathBuf, RenderOptions)>>,
}

impl FakeRasterizer {
    pub fn new(behavior: RenderBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn png() -> Self {
        Self::new(RenderBehavior::Png(b"\x89PNG".to_vec()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PathBuf, RenderOptions)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn render(
        &self,
        path: &Path,
        options: &RenderOptions,
    ) -> Result<Vec<RenderedPage>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((path.to_path_buf(), options.clone()));
        match &self.behavior {
            RenderBehavior::Png(bytes) => Ok(vec![RenderedPage {
                content: bytes.clone(),
            }]),
            RenderBehavior::NoPages => Ok(Vec::new()),
            RenderBehavior::Fail => Err(RenderError::Failed {
                status: Some(1),
                stderr: "Syntax Error: broken xref".to_string(),
            }),
        }
    }
}

/// Materializer fake that registers `gen-<n>` file nodes in an in-memory store.
pub struct StoreMaterializer {
    entities: InMemoryEntityStore,
    calls: AtomicUsize,
    names: Mutex<Vec<String>>,
}

impl StoreMaterializer {
    pub fn new(entities: InMemoryEntityStore) -> Self {
        Self {
            entities,
            calls: AtomicUsize::new(0),
            names: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactMaterializer for StoreMaterializer {
    async fn create_artifact(
        &self,
        request: ArtifactRequest,
    ) -> Result<Option<ArtifactRef>, MaterializeError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.names.lock().unwrap().push(request.name.clone());
        if request.bytes.is_empty() {
            return Ok(None);
        }
        let node = generated_file(&format!("gen-{n}"));
        let id = node.id.clone();
        self.entities.create_file(node).await?;
        Ok(Some(ArtifactRef::new(id)))
    }
}

/// Cache store whose operations fail on demand.
#[derive(Default)]
pub struct FailingCacheStore {
    pub fail_get: bool,
    pub fail_set: bool,
    sets: AtomicUsize,
}

impl FailingCacheStore {
    pub fn failing_get() -> Self {
        Self {
            fail_get: true,
            ..Self::default()
        }
    }

    pub fn failing_set() -> Self {
        Self {
            fail_set: true,
            ..Self::default()
        }
    }

    pub fn set_calls(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        if self.fail_get {
            return Err(CacheError::Unavailable("cache offline".to_string()));
        }
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _entry: CacheEntry) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_set {
            return Err(CacheError::Unavailable("cache offline".to_string()));
        }
        Ok(())
    }
}

/// Entity store that delegates to an in-memory graph but refuses field writes.
pub struct ReadOnlyFieldStore {
    inner: InMemoryEntityStore,
}

impl ReadOnlyFieldStore {
    pub fn new(inner: InMemoryEntityStore) -> Arc<Self> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl EntityStore for ReadOnlyFieldStore {
    async fn documents_by_type(&self, kind: &str) -> Result<Vec<SourceDocument>, StoreError> {
        self.inner.documents_by_type(kind).await
    }

    async fn file_by_id(&self, id: &FileId) -> Result<Option<FileNode>, StoreError> {
        self.inner.file_by_id(id).await
    }

    async fn set_thumbnail_ref(
        &self,
        _document: &DocumentId,
        _artifact: &ArtifactRef,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("field writes rejected".to_string()))
    }

    async fn touch(&self, id: &FileId) -> Result<bool, StoreError> {
        self.inner.touch(id).await
    }

    async fn create_file(&self, node: FileNode) -> Result<(), StoreError> {
        self.inner.create_file(node).await
    }
}

/// Entity store that reports one document as gone when its field is written.
pub struct RejectingFieldStore {
    inner: InMemoryEntityStore,
    rejected: DocumentId,
}

impl RejectingFieldStore {
    pub fn new(inner: InMemoryEntityStore, rejected: DocumentId) -> Arc<Self> {
        Arc::new(Self { inner, rejected })
    }
}

#[async_trait]
impl EntityStore for RejectingFieldStore {
    async fn documents_by_type(&self, kind: &str) -> Result<Vec<SourceDocument>, StoreError> {
        self.inner.documents_by_type(kind).await
    }

    async fn file_by_id(&self, id: &FileId) -> Result<Option<FileNode>, StoreError> {
        self.inner.file_by_id(id).await
    }

    async fn set_thumbnail_ref(
        &self,
        document: &DocumentId,
        artifact: &ArtifactRef,
    ) -> Result<(), StoreError> {
        if *document == self.rejected {
            return Err(StoreError::DocumentNotFound(document.to_string()));
        }
        self.inner.set_thumbnail_ref(document, artifact).await
    }

    async fn touch(&self, id: &FileId) -> Result<bool, StoreError> {
        self.inner.touch(id).await
    }

    async fn create_file(&self, node: FileNode) -> Result<(), StoreError> {
        self.inner.create_file(node).await
    }
}
