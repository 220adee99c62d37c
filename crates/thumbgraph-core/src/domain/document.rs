//! Graph entities the pipeline reads and annotates.
//!
//! The entity store owns all of these. The core only reads them, adds the
//! derived `thumbnailRef` field to a document, and (through the materializer)
//! creates new `File` nodes for generated thumbnails.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ids::{DocumentId, FileId};

/// Node type name of the file entities (local downloads and thumbnails alike).
pub const FILE_NODE_TYPE: &str = "File";

/// A non-owning reference to a materialized artifact.
///
/// This is what gets stored in the cache and in `SourceDocument::thumbnail_ref`.
/// Dropping either of those never deletes the artifact itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(FileId);

impl ArtifactRef {
    pub fn new(id: FileId) -> Self {
        Self(id)
    }

    pub fn file_id(&self) -> &FileId {
        &self.0
    }
}

impl From<FileId> for ArtifactRef {
    fn from(id: FileId) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A source document (e.g. a CMS asset) that may get a thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub id: DocumentId,

    /// Node type name, e.g. `ContentfulAsset`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Identifier assigned by the upstream content system. Unique per locale.
    pub external_id: String,

    pub locale: String,

    /// Declared media type (`application/pdf`, `image/png`, ...).
    #[serde(default)]
    pub media_type: Option<String>,

    pub file_name: String,

    /// Back-reference to the locally downloaded copy, if one was materialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_file: Option<FileId>,

    /// Derived field written by the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_ref: Option<ArtifactRef>,
}

impl SourceDocument {
    pub fn has_media_type(&self, media_type: &str) -> bool {
        self.media_type.as_deref() == Some(media_type)
    }
}

/// Where a `File` node came from.
///
/// The store's garbage collector only ever reclaims `Generated` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    Downloaded,
    Generated,
}

/// A file entity with bytes on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: FileId,
    pub name: String,
    pub absolute_path: PathBuf,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub size: u64,
    pub origin: FileOrigin,
}

/// Result of resolving a document's local byte source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSource {
    Present(PathBuf),
    Absent,
}
