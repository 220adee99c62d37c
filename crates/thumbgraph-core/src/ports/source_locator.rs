//! SourceLocator port - ローカルのバイト列の解決
//!
//! ドキュメントのダウンロード済みコピーの絶対パスを返します。
//! 「あるかないか」は `LocalSource` の和型で表現し、
//! 呼び出し側でネストした Option を辿らないようにします。

use async_trait::async_trait;

use crate::domain::{LocalSource, SourceDocument, StoreError};

#[async_trait]
pub trait SourceLocator: Send + Sync {
    async fn locate(&self, document: &SourceDocument) -> Result<LocalSource, StoreError>;
}
