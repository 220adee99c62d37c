//! GeneratePipeline - サムネイルの「生成 or 再利用」パス
//!
//! # 学習ポイント
//! - 判定（decide）と副作用の適用（apply）の分離
//! - アイテム単位の失敗は ItemOutcome に畳み込み、バッチは止めない
//! - ランを止めるのはエンティティストア全体の障害（`ErrorKind::Infrastructure`）だけ
//! - futures の buffer_unordered による並行数の上限
//!
//! # 1 アイテムの流れ
//! ```text
//! key → cache.get ─hit──────────────────────────────┐
//!          │miss                                     │
//!          ├─ thumbnailRef が生きている → Repaired ──┤
//!          ├─ locate → Absent → SourceUnavailable    │
//!          └─ render → materialize → Generated ──────┤
//!                        └─ 失敗 → GenerationFailed   │
//!                                                    ▼
//!                             cache.set（新規のみ）→ thumbnailRef 更新
//! ```

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;

use super::cache::ArtifactCache;
use crate::domain::{
    ArtifactRef, ErrorKind, ItemDecision, ItemOutcome, KeyDeriver, LocalSource, PipelineError,
    RunReport, SourceDocument,
};
use crate::ports::{
    ArtifactMaterializer, ArtifactRequest, EntityStore, ProgressReporter, Rasterizer,
    RenderOptions, SourceLocator,
};

/// What the pipeline considers a candidate, and how it renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Node type to enumerate, e.g. `ContentfulAsset`.
    pub document_type: String,
    /// Only documents declaring exactly this media type are processed.
    pub media_type: String,
    pub render: RenderOptions,
    /// Upper bound on items processed at once. `1` is sequential.
    pub concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            document_type: "ContentfulAsset".to_string(),
            media_type: "application/pdf".to_string(),
            render: RenderOptions::default(),
            concurrency: 1,
        }
    }
}

/// Result of applying one decision.
#[derive(Debug)]
struct Applied {
    outcome: ItemOutcome,
    cache_write_failed: bool,
    field_write_failed: bool,
}

/// Generates (or reuses) a thumbnail for every candidate document.
///
/// Built with [`PipelineBuilder`](super::PipelineBuilder).
pub struct GeneratePipeline {
    pub(super) entities: Arc<dyn EntityStore>,
    pub(super) keys: KeyDeriver,
    pub(super) cache: ArtifactCache,
    pub(super) locator: Arc<dyn SourceLocator>,
    pub(super) rasterizer: Arc<dyn Rasterizer>,
    pub(super) materializer: Arc<dyn ArtifactMaterializer>,
    pub(super) progress: Arc<dyn ProgressReporter>,
    pub(super) settings: PipelineSettings,
}

impl GeneratePipeline {
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn keys(&self) -> &KeyDeriver {
        &self.keys
    }

    /// Process every candidate once.
    ///
    /// Per-item failures are counted in the report, including a field write
    /// rejected for one document. Only an infrastructure failure of the
    /// entity store (listing candidates, or a field write the store could not
    /// serve at all) aborts the run.
    #[tracing::instrument(
        skip(self),
        fields(document_type = %self.settings.document_type, namespace = %self.keys.namespace())
    )]
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let documents = self
            .entities
            .documents_by_type(&self.settings.document_type)
            .await?;
        let (candidates, skipped): (Vec<_>, Vec<_>) = documents
            .into_iter()
            .partition(|d| d.has_media_type(&self.settings.media_type));

        let mut report = RunReport {
            candidates: candidates.len(),
            skipped_wrong_type: skipped.len(),
            ..RunReport::default()
        };

        if candidates.is_empty() {
            tracing::info!(
                skipped = report.skipped_wrong_type,
                media_type = %self.settings.media_type,
                "no eligible documents"
            );
            return Ok(report);
        }

        tracing::info!(
            candidates = report.candidates,
            skipped = report.skipped_wrong_type,
            "thumbnail pass started"
        );
        self.progress.start(candidates.len());

        let mut items = futures::stream::iter(candidates.iter())
            .map(|document| self.process(document))
            .buffer_unordered(self.settings.concurrency.max(1));

        while let Some(applied) = items.next().await {
            let applied = applied?;
            report.record(&applied.outcome);
            if applied.cache_write_failed {
                report.cache_write_failed += 1;
            }
            if applied.field_write_failed {
                report.field_write_failed += 1;
            }
            self.progress.tick(&applied.outcome);
        }

        self.progress.finish(&report);
        tracing::info!(
            cache_hits = report.cache_hits,
            generated = report.generated,
            repaired = report.repaired,
            source_unavailable = report.source_unavailable,
            generation_failed = report.generation_failed,
            cache_write_failed = report.cache_write_failed,
            field_write_failed = report.field_write_failed,
            "thumbnail pass finished"
        );
        Ok(report)
    }

    async fn process(&self, document: &SourceDocument) -> Result<Applied, PipelineError> {
        let decision = self.decide(document).await;
        self.apply(document, decision).await
    }

    /// Decide what happens to one document.
    ///
    /// Not a pure function: a live artifact is touched, and on a miss the
    /// source is rendered and materialized, which writes the PNG and creates
    /// its `File` node. The cache entry and the document's `thumbnailRef` are
    /// left to `apply`.
    pub async fn decide(&self, document: &SourceDocument) -> ItemDecision {
        let key = self.keys.key(document);

        let cache_writable = match self.cache.get(&key).await {
            Ok(Some(artifact)) => {
                return ItemDecision {
                    key,
                    outcome: ItemOutcome::Hit(artifact),
                    cache_writable: true,
                };
            }
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache lookup failed; result will not be cached");
                false
            }
        };

        if let Some(existing) = self.live_thumbnail(document).await {
            return ItemDecision {
                key,
                outcome: ItemOutcome::Repaired(existing),
                cache_writable,
            };
        }

        let outcome = match self.locator.locate(document).await {
            Ok(LocalSource::Present(path)) => match self.generate(document, &path).await {
                Ok(artifact) => ItemOutcome::Generated(artifact),
                Err(reason) => ItemOutcome::GenerationFailed(reason),
            },
            Ok(LocalSource::Absent) => ItemOutcome::SourceUnavailable,
            Err(e) => {
                tracing::warn!(document = %document.id, error = %e, "source lookup failed");
                ItemOutcome::SourceUnavailable
            }
        };

        ItemDecision {
            key,
            outcome,
            cache_writable,
        }
    }

    /// The document's current `thumbnailRef`, if it still resolves.
    ///
    /// A live reference is touched.
    async fn live_thumbnail(&self, document: &SourceDocument) -> Option<ArtifactRef> {
        let existing = document.thumbnail_ref.as_ref()?;
        match self.entities.touch(existing.file_id()).await {
            Ok(true) => Some(existing.clone()),
            Ok(false) => {
                tracing::debug!(document = %document.id, file = %existing, "thumbnailRef is dangling; regenerating");
                None
            }
            Err(e) => {
                tracing::warn!(document = %document.id, error = %e, "keep-alive failed; regenerating");
                None
            }
        }
    }

    async fn generate(&self, document: &SourceDocument, path: &Path) -> Result<ArtifactRef, String> {
        let pages = self
            .rasterizer
            .render(path, &self.settings.render)
            .await
            .map_err(|e| e.to_string())?;
        let Some(first) = pages.into_iter().next() else {
            return Err("rasterizer returned no pages".to_string());
        };

        let request = ArtifactRequest {
            bytes: first.content,
            name: artifact_name(&document.file_name),
        };
        match self.materializer.create_artifact(request).await {
            Ok(Some(artifact)) => Ok(artifact),
            Ok(None) => Err("materializer produced no artifact".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn apply(
        &self,
        document: &SourceDocument,
        decision: ItemDecision,
    ) -> Result<Applied, PipelineError> {
        let ItemDecision {
            key,
            outcome,
            cache_writable,
        } = decision;

        let Some(artifact) = outcome.artifact() else {
            match &outcome {
                ItemOutcome::GenerationFailed(reason) => {
                    tracing::warn!(document = %document.id, key = %key, reason = %reason, "thumbnail generation failed");
                }
                _ => {
                    tracing::warn!(document = %document.id, key = %key, "no local source for document");
                }
            }
            return Ok(Applied {
                outcome,
                cache_write_failed: false,
                field_write_failed: false,
            });
        };

        let mut cache_write_failed = false;
        if outcome.needs_cache_write() {
            if !cache_writable {
                cache_write_failed = true;
            } else if let Err(e) = self.cache.set(&key, artifact).await {
                tracing::warn!(key = %key, error = %e, "cache write failed");
                cache_write_failed = true;
            }
        }

        let mut field_write_failed = false;
        if document.thumbnail_ref.as_ref() != Some(artifact) {
            match self.entities.set_thumbnail_ref(&document.id, artifact).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::Infrastructure => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(document = %document.id, key = %key, error = %e, kind = ?e.kind(), "thumbnailRef write rejected");
                    field_write_failed = true;
                }
            }
        }

        tracing::debug!(document = %document.id, key = %key, outcome = ?outcome.kind(), artifact = %artifact, "item done");
        Ok(Applied {
            outcome,
            cache_write_failed,
            field_write_failed,
        })
    }
}

/// `report.pdf` → `report_pdf-thumbnail`
fn artifact_name(file_name: &str) -> String {
    format!("{}-thumbnail", file_name.replace('.', "_"))
}
