//! Graph node identifiers (strongly-typed IDs).
//!
//! ノード ID は外部のエンティティストアが採番する文字列です。
//! Phantom type パターンで `DocumentId` と `FileId` を型レベルで区別し、
//! 取り違え（ドキュメント ID でファイルを引く等）をコンパイル時に防ぎます。
//!
//! 生成物（サムネイル）の ID だけはこのクレート側で採番するため、
//! `from_ulid()` で `file-<ULID>` 形式の ID を作れるようにしています。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {}

/// ジェネリック ID 型
///
/// 中身はストアが付けた任意の文字列。`T` は PhantomData なので
/// 実行時のコストはありません。
///
/// ```ignore
/// let doc: DocumentId = Id::new("asset-1");
/// let file: FileId = Id::new("asset-1");
/// // doc と file は異なる型なので、混同できない
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// SourceDocument のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Document {}

impl IdMarker for Document {}

/// File ノードのマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum File {}

impl IdMarker for File {}

/// Identifier of a source document node.
pub type DocumentId = Id<Document>;

/// Identifier of a `File` node (local download or generated thumbnail).
pub type FileId = Id<File>;

impl FileId {
    /// ULID から `file-<ULID>` 形式の Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self::new(format!("file-{ulid}"))
    }
}
