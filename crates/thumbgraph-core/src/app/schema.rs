//! Schema exposure - 派生フィールドのリゾルバ登録
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - (型名, フィールド名) をキーにした二重登録の検出
//! - Arc による共有所有権
//!
//! スキーマの検証や GraphQL サーバそのものはこのクレートの外の責務です。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::resolver::LinkResolver;
use crate::domain::{FILE_NODE_TYPE, SourceDocument};

/// Field name under which the thumbnail is exposed.
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// A lazily resolved field on a source entity.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    /// Node type name of the resolved value.
    fn return_type(&self) -> &str;

    async fn resolve(&self, source: &SourceDocument) -> Option<serde_json::Value>;
}

/// `thumbnail: File` backed by [`LinkResolver`].
pub struct ThumbnailField {
    resolver: LinkResolver,
}

impl ThumbnailField {
    pub fn new(resolver: LinkResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl FieldResolver for ThumbnailField {
    fn return_type(&self) -> &str {
        FILE_NODE_TYPE
    }

    async fn resolve(&self, source: &SourceDocument) -> Option<serde_json::Value> {
        let file = self.resolver.resolve(source).await?;
        match serde_json::to_value(&file) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(file = %file.id, error = %e, "failed to serialize thumbnail");
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("field '{field}' on type '{type_name}' is already registered")]
    AlreadyRegistered { type_name: String, field: String },

    #[error("no field '{field}' on type '{type_name}'")]
    NotRegistered { type_name: String, field: String },
}

/// ResolverRegistry は (型名, フィールド名) → FieldResolver の対応を管理
///
/// # 使用例
/// ```ignore
/// let mut registry = ResolverRegistry::new();
/// registry.register_thumbnail_field("ContentfulAsset", LinkResolver::new(store))?;
/// let value = registry.resolve("ContentfulAsset", "thumbnail", &document).await?;
/// ```
#[derive(Default)]
pub struct ResolverRegistry {
    fields: HashMap<(String, String), Arc<dyn FieldResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        type_name: &str,
        field: &str,
        resolver: impl FieldResolver + 'static,
    ) -> Result<(), RegistryError> {
        let key = (type_name.to_string(), field.to_string());
        if self.fields.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered {
                type_name: key.0,
                field: key.1,
            });
        }
        tracing::debug!(type_name, field, return_type = resolver.return_type(), "registered field resolver");
        self.fields.insert(key, Arc::new(resolver));
        Ok(())
    }

    /// Register `thumbnail: File` on `type_name`.
    pub fn register_thumbnail_field(
        &mut self,
        type_name: &str,
        resolver: LinkResolver,
    ) -> Result<(), RegistryError> {
        self.register(type_name, THUMBNAIL_FIELD, ThumbnailField::new(resolver))
    }

    pub fn get(&self, type_name: &str, field: &str) -> Option<Arc<dyn FieldResolver>> {
        self.fields
            .get(&(type_name.to_string(), field.to_string()))
            .cloned()
    }

    /// Registered `(type name, field name, return type)` triples, sorted.
    pub fn fields(&self) -> Vec<(String, String, String)> {
        let mut fields: Vec<_> = self
            .fields
            .iter()
            .map(|((t, f), r)| (t.clone(), f.clone(), r.return_type().to_string()))
            .collect();
        fields.sort();
        fields
    }

    pub async fn resolve(
        &self,
        type_name: &str,
        field: &str,
        source: &SourceDocument,
    ) -> Result<Option<serde_json::Value>, RegistryError> {
        let resolver = self
            .get(type_name, field)
            .ok_or_else(|| RegistryError::NotRegistered {
                type_name: type_name.to_string(),
                field: field.to_string(),
            })?;
        Ok(resolver.resolve(source).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactRef, FileId};
    use crate::impls::InMemoryEntityStore;
    use crate::testing::{generated_file, pdf_document};

    fn registry(store: &InMemoryEntityStore) -> ResolverRegistry {
        let mut registry = ResolverRegistry::new();
        registry
            .register_thumbnail_field("ContentfulAsset", LinkResolver::new(Arc::new(store.clone())))
            .unwrap();
        registry
    }

    #[test]
    fn thumbnail_field_returns_file() {
        let registry = registry(&InMemoryEntityStore::new());
        assert_eq!(
            registry.fields(),
            vec![(
                "ContentfulAsset".to_string(),
                "thumbnail".to_string(),
                "File".to_string()
            )]
        );
    }

    #[test]
    fn double_registration_is_rejected() {
        let store = InMemoryEntityStore::new();
        let mut registry = registry(&store);
        let result = registry
            .register_thumbnail_field("ContentfulAsset", LinkResolver::new(Arc::new(store)));
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered { .. })));
    }

    #[tokio::test]
    async fn resolves_thumbnail_as_json() {
        let store = InMemoryEntityStore::new();
        store.insert_file(generated_file("file-1")).await;
        let mut doc = pdf_document("A", None);
        doc.thumbnail_ref = Some(ArtifactRef::new(FileId::new("file-1")));

        let value = registry(&store)
            .resolve("ContentfulAsset", "thumbnail", &doc)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value["id"], "file-1");
        assert_eq!(value["absolutePath"], "/artifacts/file-1.png");
        assert_eq!(value["origin"], "generated");
    }

    #[tokio::test]
    async fn unknown_field_is_an_error() {
        let registry = registry(&InMemoryEntityStore::new());
        let result = registry
            .resolve("ContentfulAsset", "preview", &pdf_document("A", None))
            .await;
        assert!(matches!(result, Err(RegistryError::NotRegistered { .. })));
    }
}
