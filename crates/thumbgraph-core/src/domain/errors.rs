//! Errors - エラー型と分類
//!
//! ポートごとに thiserror の enum を持ちます。
//! `StoreError::kind()` はパイプラインがフィールド書き込みの失敗を
//! 「アイテム単位で記録して続行」するか「ラン全体を止める」かの判断に使います。
//! キャッシュとラスタライザの失敗は常にアイテム単位です。

use std::path::PathBuf;

use thiserror::Error;

/// ErrorKind はエンティティストアのエラー分類
///
/// - Permanent: 特定のノードに限った失敗（ドキュメントが消えた等）。アイテム単位
/// - Infrastructure: ストア自体の障害。ランを止める
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Permanent,
    Infrastructure,
}

/// Entity store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity store unavailable: {0}")]
    Unavailable(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("graph snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid graph snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) | Self::Io { .. } => ErrorKind::Infrastructure,
            Self::DocumentNotFound(_) | Self::Serialization(_) => ErrorKind::Permanent,
        }
    }
}

/// Durable cache store failures.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt cache file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Rasterizer failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rasterizer executable not found: {0}")]
    ToolNotFound(String),

    #[error("rasterizer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rasterizer exited with {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("invalid render options: {0}")]
    InvalidOptions(String),
}

/// Artifact materializer failures.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("artifact I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures that abort a whole run.
///
/// Everything item-scoped is folded into `ItemOutcome` or a report counter
/// instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("entity store failure: {0}")]
    Store(#[from] StoreError),
}
