//! Outcome model: what happened to one candidate during a run.
//!
//! The pipeline's decision step returns an `ItemOutcome`. It may already have
//! touched a live artifact or materialized a new one, but it never writes the
//! cache entry or the document. The driver looks at the tag and applies the
//! cache write, the field write and the progress tick.

use serde::{Deserialize, Serialize};

use super::document::ArtifactRef;
use super::key::CacheKey;

/// A flat classification of an item outcome (for logs and reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    CacheHit,
    Generated,
    Repaired,
    SourceUnavailable,
    GenerationFailed,
}

/// Result of processing a single candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ItemOutcome {
    /// The cache already knew an artifact for this key.
    Hit(ArtifactRef),

    /// A fresh artifact was rasterized and materialized.
    Generated(ArtifactRef),

    /// The cache had no entry but the document's own `thumbnailRef` still
    /// points at a live artifact; the cache gets rewritten from it.
    Repaired(ArtifactRef),

    /// No local byte source could be resolved. Retried next run.
    SourceUnavailable,

    /// Rasterization or materialization yielded no artifact. Retried next run.
    GenerationFailed(String),
}

impl ItemOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Hit(_) => OutcomeKind::CacheHit,
            Self::Generated(_) => OutcomeKind::Generated,
            Self::Repaired(_) => OutcomeKind::Repaired,
            Self::SourceUnavailable => OutcomeKind::SourceUnavailable,
            Self::GenerationFailed(_) => OutcomeKind::GenerationFailed,
        }
    }

    /// The artifact that should end up in `thumbnailRef`, if any.
    pub fn artifact(&self) -> Option<&ArtifactRef> {
        match self {
            Self::Hit(r) | Self::Generated(r) | Self::Repaired(r) => Some(r),
            Self::SourceUnavailable | Self::GenerationFailed(_) => None,
        }
    }

    /// Whether the driver must write this outcome's artifact to the cache.
    ///
    /// Hits are already cached; failures have nothing to write.
    pub fn needs_cache_write(&self) -> bool {
        matches!(self, Self::Generated(_) | Self::Repaired(_))
    }
}

/// Decision for one candidate, before any effect is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDecision {
    pub key: CacheKey,
    pub outcome: ItemOutcome,

    /// `false` when the cache store failed during lookup. The item is then
    /// still processed, but its result is not persisted to the cache.
    pub cache_writable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::FileId;

    fn artifact() -> ArtifactRef {
        ArtifactRef::new(FileId::new("file-1"))
    }

    #[test]
    fn outcome_kind_serializes_as_screaming_snake_case() {
        let s = serde_json::to_string(&OutcomeKind::SourceUnavailable).unwrap();
        assert_eq!(s, "\"SOURCE_UNAVAILABLE\"");

        let s = serde_json::to_string(&OutcomeKind::CacheHit).unwrap();
        assert_eq!(s, "\"CACHE_HIT\"");
    }

    #[test]
    fn only_fresh_or_repaired_artifacts_need_cache_writes() {
        assert!(!ItemOutcome::Hit(artifact()).needs_cache_write());
        assert!(ItemOutcome::Generated(artifact()).needs_cache_write());
        assert!(ItemOutcome::Repaired(artifact()).needs_cache_write());
        assert!(!ItemOutcome::SourceUnavailable.needs_cache_write());
        assert!(!ItemOutcome::GenerationFailed("x".into()).needs_cache_write());
    }

    #[test]
    fn failures_carry_no_artifact() {
        assert_eq!(ItemOutcome::Hit(artifact()).artifact(), Some(&artifact()));
        assert_eq!(ItemOutcome::SourceUnavailable.artifact(), None);
        assert_eq!(ItemOutcome::GenerationFailed("no pages".into()).artifact(), None);
    }

    #[test]
    fn outcome_is_tagged_enum() {
        let v = serde_json::to_value(ItemOutcome::Generated(artifact())).unwrap();
        assert_eq!(v["kind"], "Generated");
        assert_eq!(v["value"], "file-1");
    }
}
