//! thumbgraph-core
//!
//! Build-time thumbnail generation for content graphs: derives a stable cache
//! key per document, reuses cached thumbnails across runs, renders the first
//! page of uncached PDFs, and links the result back onto the document.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, document, key, outcome, report, errors）
//! - **ports**: 抽象化レイヤー（EntityStore, CacheStore, Rasterizer, ArtifactMaterializer, など）
//! - **app**: アプリケーションロジック（ArtifactCache, GeneratePipeline, LinkResolver, builder, schema）
//! - **impls**: 実装（InMemoryEntityStore, JsonFileCacheStore, PdftoppmRasterizer, など）
//! - **config**: figment による設定の読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;
