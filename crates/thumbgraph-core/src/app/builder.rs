//! PipelineBuilder - GeneratePipeline の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::sync::Arc;

use super::cache::ArtifactCache;
use super::pipeline::{GeneratePipeline, PipelineSettings};
use crate::config::ThumbnailConfig;
use crate::domain::KeyDeriver;
use crate::impls::{StoreSourceLocator, TracingProgress};
use crate::ports::{
    ArtifactMaterializer, CacheStore, Clock, EntityStore, ProgressReporter, Rasterizer,
    SourceLocator, SystemClock,
};

/// PipelineBuilder は GeneratePipeline を構築
///
/// # 使用例
/// ```ignore
/// let pipeline = PipelineBuilder::from_config(&config)
///     .entities(store)
///     .cache_store(cache)
///     .rasterizer(rasterizer)
///     .materializer(materializer)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - 必須ポート: entities, cache_store, rasterizer, materializer
/// - 任意ポート: locator（StoreSourceLocator）、progress（TracingProgress）、
///   clock（SystemClock）
/// - 必須ポートが欠けていれば build() が BuildError を返す
#[derive(Default)]
pub struct PipelineBuilder {
    entities: Option<Arc<dyn EntityStore>>,
    cache_store: Option<Arc<dyn CacheStore>>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    materializer: Option<Arc<dyn ArtifactMaterializer>>,
    locator: Option<Arc<dyn SourceLocator>>,
    progress: Option<Arc<dyn ProgressReporter>>,
    clock: Option<Arc<dyn Clock>>,
    keys: KeyDeriver,
    settings: PipelineSettings,
}

/// BuildError はパイプライン構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing ports: {0:?}. These collaborators are required but were not provided.")]
    MissingPorts(Vec<&'static str>),
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key namespace and pipeline settings taken from `config`.
    pub fn from_config(config: &ThumbnailConfig) -> Self {
        Self::new()
            .keys(config.key_deriver())
            .settings(config.pipeline_settings())
    }

    pub fn entities(mut self, entities: Arc<dyn EntityStore>) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn materializer(mut self, materializer: Arc<dyn ArtifactMaterializer>) -> Self {
        self.materializer = Some(materializer);
        self
    }

    pub fn locator(mut self, locator: Arc<dyn SourceLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn keys(mut self, keys: KeyDeriver) -> Self {
        self.keys = keys;
        self
    }

    pub fn settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// # 検証
    /// - 必須ポートがすべて設定されているかチェック
    /// - 不足があれば BuildError::MissingPorts（欠けている名前をすべて列挙）
    pub fn build(self) -> Result<GeneratePipeline, BuildError> {
        let mut missing = Vec::new();
        if self.entities.is_none() {
            missing.push("entities");
        }
        if self.cache_store.is_none() {
            missing.push("cache_store");
        }
        if self.rasterizer.is_none() {
            missing.push("rasterizer");
        }
        if self.materializer.is_none() {
            missing.push("materializer");
        }

        let (Some(entities), Some(cache_store), Some(rasterizer), Some(materializer)) = (
            self.entities,
            self.cache_store,
            self.rasterizer,
            self.materializer,
        ) else {
            return Err(BuildError::MissingPorts(missing));
        };

        let locator = self
            .locator
            .unwrap_or_else(|| Arc::new(StoreSourceLocator::new(entities.clone())));
        let progress = self
            .progress
            .unwrap_or_else(|| Arc::new(TracingProgress::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(GeneratePipeline {
            cache: ArtifactCache::new(cache_store, entities.clone(), clock),
            entities,
            keys: self.keys,
            locator,
            rasterizer,
            materializer,
            progress,
            settings: self.settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryCacheStore, InMemoryEntityStore};
    use crate::testing::{FakeRasterizer, StoreMaterializer};

    #[test]
    fn build_success() {
        let store = InMemoryEntityStore::new();
        let pipeline = PipelineBuilder::new()
            .entities(Arc::new(store.clone()))
            .cache_store(Arc::new(InMemoryCacheStore::new()))
            .rasterizer(Arc::new(FakeRasterizer::png()))
            .materializer(Arc::new(StoreMaterializer::new(store)))
            .build();
        assert!(pipeline.is_ok());
    }

    #[test]
    fn build_lists_every_missing_port() {
        let result = PipelineBuilder::new()
            .cache_store(Arc::new(InMemoryCacheStore::new()))
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingPorts(missing))
                if missing == vec!["entities", "rasterizer", "materializer"]
        ));
    }

    #[test]
    fn from_config_applies_namespace_and_settings() {
        let mut config = ThumbnailConfig::default();
        config.cache.namespace = "thumb".to_string();
        config.pipeline.concurrency = 3;
        let store = InMemoryEntityStore::new();

        let pipeline = PipelineBuilder::from_config(&config)
            .entities(Arc::new(store.clone()))
            .cache_store(Arc::new(InMemoryCacheStore::new()))
            .rasterizer(Arc::new(FakeRasterizer::png()))
            .materializer(Arc::new(StoreMaterializer::new(store)))
            .build()
            .unwrap();

        assert_eq!(pipeline.keys().namespace(), "thumb");
        assert_eq!(pipeline.settings().concurrency, 3);
    }
}
