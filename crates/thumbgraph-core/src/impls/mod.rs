//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryEntityStore**: JSON スナップショットで永続化できるグラフ（CLI・テスト用）
//! - **JsonFileCacheStore**: 再起動をまたいで残るキャッシュ
//! - **InMemoryCacheStore**: テスト用キャッシュ
//! - **StoreSourceLocator**: `localFile` 参照からローカルパスを解決
//! - **PdftoppmRasterizer**: poppler の pdftoppm を使うラスタライザ
//! - **FsMaterializer**: PNG をディスクに書いて File ノードを登録
//! - **TracingProgress** / **NoopProgress**: 進捗通知
//!
//! 本番のグラフストアやオブジェクトストレージ向けの実装は
//! このクレートの外で ports を実装してください。

pub mod fs_materializer;
pub mod inmem_cache;
pub mod inmem_store;
pub mod json_cache;
pub mod pdftoppm;
pub mod progress;
pub mod store_locator;

// 主要な型を再エクスポート
pub use self::fs_materializer::FsMaterializer;
pub use self::inmem_cache::InMemoryCacheStore;
pub use self::inmem_store::{GraphSnapshot, InMemoryEntityStore};
pub use self::json_cache::JsonFileCacheStore;
pub use self::pdftoppm::PdftoppmRasterizer;
pub use self::progress::{NoopProgress, TracingProgress};
pub use self::store_locator::StoreSourceLocator;
