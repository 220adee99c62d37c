use serde::{Deserialize, Serialize};

use super::outcome::ItemOutcome;

/// Per-run counts, returned by `GeneratePipeline::run`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Documents of the configured type that were considered.
    pub candidates: usize,
    pub skipped_wrong_type: usize,
    pub cache_hits: usize,
    pub generated: usize,
    pub repaired: usize,
    pub source_unavailable: usize,
    pub generation_failed: usize,
    /// Artifacts that were produced but could not be persisted to the cache.
    pub cache_write_failed: usize,
    /// Artifacts whose `thumbnailRef` write was rejected for that document.
    pub field_write_failed: usize,
}

impl RunReport {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Hit(_) => self.cache_hits += 1,
            ItemOutcome::Generated(_) => self.generated += 1,
            ItemOutcome::Repaired(_) => self.repaired += 1,
            ItemOutcome::SourceUnavailable => self.source_unavailable += 1,
            ItemOutcome::GenerationFailed(_) => self.generation_failed += 1,
        }
    }

    /// Number of eligible items processed so far.
    pub fn processed(&self) -> usize {
        self.cache_hits
            + self.generated
            + self.repaired
            + self.source_unavailable
            + self.generation_failed
    }

    pub fn failed(&self) -> usize {
        self.source_unavailable + self.generation_failed
    }
}
