//! Configuration.
//!
//! Defaults, then an optional TOML file, then `THUMBGRAPH_*` environment
//! variables (`__` separates sections, e.g. `THUMBGRAPH_RENDER__SCALE=0.5`).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::app::PipelineSettings;
use crate::domain::{DEFAULT_NAMESPACE, KeyDeriver};
use crate::ports::RenderOptions;

pub const ENV_PREFIX: &str = "THUMBGRAPH_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Load(Box::new(e))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Node type whose documents get thumbnails.
    pub document_type: String,
    pub media_type: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            document_type: "ContentfulAsset".to_string(),
            media_type: "application/pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub namespace: String,
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: PathBuf::from(".thumbgraph/cache.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub scale: f32,
    pub page: u32,
    pub embed_fonts_only: bool,
    /// Explicit `pdftoppm` binary. Looked up on `PATH` when unset.
    pub pdftoppm: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 0.33,
            page: 1,
            embed_fonts_only: true,
            pdftoppm: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".thumbgraph/thumbnails"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
}

impl ThumbnailConfig {
    /// Layered sources: defaults, `path` (if any), environment.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::extract(Self::figment(path))
    }

    pub fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.render.scale > 0.0 && self.render.scale <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "render.scale must be in (0, 1], got {}",
                self.render.scale
            )));
        }
        if self.render.page == 0 {
            return Err(ConfigError::Invalid("render.page is 1-based".to_string()));
        }
        if self.pipeline.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.concurrency must be at least 1".to_string(),
            ));
        }
        if self.cache.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "cache.namespace must not be empty".to_string(),
            ));
        }
        if self.source.document_type.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "source.document_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn key_deriver(&self) -> KeyDeriver {
        KeyDeriver::new(self.cache.namespace.clone())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            embed_fonts_only: self.render.embed_fonts_only,
            scale: self.render.scale,
            pages: vec![self.render.page],
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            document_type: self.source.document_type.clone(),
            media_type: self.source.media_type.clone(),
            render: self.render_options(),
            concurrency: self.pipeline.concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn from_toml(toml: &str) -> Result<ThumbnailConfig, ConfigError> {
        ThumbnailConfig::extract(
            Figment::from(Serialized::defaults(ThumbnailConfig::default()))
                .merge(Toml::string(toml)),
        )
    }

    #[test]
    fn defaults_are_valid() {
        let config = ThumbnailConfig::default();
        config.validate().unwrap();
        assert_eq!(config.render_options(), RenderOptions::default());
        assert_eq!(config.pipeline_settings(), PipelineSettings::default());
        assert_eq!(config.key_deriver(), KeyDeriver::default());
    }

    #[test]
    fn toml_overrides_single_fields() {
        let config = from_toml(
            r#"
            [cache]
            namespace = "thumb"

            [render]
            scale = 0.5

            [pipeline]
            concurrency = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.namespace, "thumb");
        assert_eq!(config.cache.path, PathBuf::from(".thumbgraph/cache.json"));
        assert_eq!(config.render.scale, 0.5);
        assert_eq!(config.render.page, 1);
        assert_eq!(config.pipeline_settings().concurrency, 4);
    }

    #[test]
    fn loads_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumbgraph.toml");
        std::fs::write(&path, "[output]\ndir = \"/srv/thumbs\"\n").unwrap();

        let config = ThumbnailConfig::extract(
            Figment::from(Serialized::defaults(ThumbnailConfig::default()))
                .merge(Toml::file(&path)),
        )
        .unwrap();
        assert_eq!(config.output.dir, PathBuf::from("/srv/thumbs"));
    }

    #[rstest]
    #[case("[render]\nscale = 0.0")]
    #[case("[render]\nscale = 1.5")]
    #[case("[render]\npage = 0")]
    #[case("[pipeline]\nconcurrency = 0")]
    #[case("[cache]\nnamespace = \"\"")]
    fn rejects_invalid_values(#[case] toml: &str) {
        assert!(matches!(from_toml(toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn type_mismatch_is_a_load_error() {
        assert!(matches!(
            from_toml("[pipeline]\nconcurrency = \"many\""),
            Err(ConfigError::Load(_))
        ));
    }
}
