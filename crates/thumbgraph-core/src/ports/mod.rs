//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部コラボレータ（エンティティストア、ラスタライザ、
//! マテリアライザ、永続キャッシュ）へのインターフェースを提供し、
//! 実装の詳細を隠蔽します。
//!
//! すべて `Arc<dyn Trait>` としてコンストラクタで注入します（グローバル状態なし）。

pub mod cache_store;
pub mod clock;
pub mod entity_store;
pub mod id_generator;
pub mod materializer;
pub mod progress;
pub mod rasterizer;
pub mod source_locator;

// 主要な trait を再エクスポート
pub use self::cache_store::{CacheEntry, CacheStore};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::entity_store::EntityStore;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::materializer::{ArtifactMaterializer, ArtifactRequest};
pub use self::progress::ProgressReporter;
pub use self::rasterizer::{Rasterizer, RenderOptions, RenderedPage};
pub use self::source_locator::SourceLocator;
