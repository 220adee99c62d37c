//! Domain model (ids, documents, cache keys, outcomes, reports, errors).
//!
//! I/O を一切含まない層。ports / app / impls はすべてここの型で会話します。

pub mod document;
pub mod errors;
pub mod ids;
pub mod key;
pub mod outcome;
pub mod report;

pub use document::{ArtifactRef, FILE_NODE_TYPE, FileNode, FileOrigin, LocalSource, SourceDocument};
pub use errors::{
    CacheError, ErrorKind, MaterializeError, PipelineError, RenderError, StoreError,
};
pub use ids::{DocumentId, FileId, Id, IdMarker};
pub use key::{CacheKey, DEFAULT_NAMESPACE, KeyDeriver, THUMBNAIL_PURPOSE};
pub use outcome::{ItemDecision, ItemOutcome, OutcomeKind};
pub use report::RunReport;
