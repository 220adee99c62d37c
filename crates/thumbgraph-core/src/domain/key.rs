//! Cache key derivation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::SourceDocument;

pub const DEFAULT_NAMESPACE: &str = "contentful-asset";

/// Purpose tag appended to every key.
pub const THUMBNAIL_PURPOSE: &str = "thumbnail";

/// A cache key: `<namespace>-<external id>-<locale>-<purpose>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives cache keys from immutable document identity.
///
/// Pure function of (namespace, external id, locale, purpose). The key must
/// be identical across runs and processes, otherwise the cache stops being a
/// valid memoization layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDeriver {
    namespace: String,
}

impl KeyDeriver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self, document: &SourceDocument) -> CacheKey {
        CacheKey(format!(
            "{}-{}-{}-{}",
            self.namespace, document.external_id, document.locale, THUMBNAIL_PURPOSE
        ))
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
