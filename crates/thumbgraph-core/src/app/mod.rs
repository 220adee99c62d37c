//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **PipelineBuilder**: パイプラインの構築とワイヤリング
//! - **ArtifactCache**: キャッシュキー → 生成物参照（ヒット時に keep-alive）
//! - **GeneratePipeline**: ビルドパスごとの「生成 or 再利用」
//! - **LinkResolver**: クエリ時の参照解決（dangling-safe）
//! - **ResolverRegistry**: 派生フィールドのスキーマ公開

pub mod builder;
pub mod cache;
pub mod pipeline;
pub mod resolver;
pub mod schema;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, PipelineBuilder};
pub use self::cache::ArtifactCache;
pub use self::pipeline::{GeneratePipeline, PipelineSettings};
pub use self::resolver::LinkResolver;
pub use self::schema::{
    FieldResolver, RegistryError, ResolverRegistry, THUMBNAIL_FIELD, ThumbnailField,
};
