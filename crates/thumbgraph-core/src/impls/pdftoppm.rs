//! PdftoppmRasterizer - poppler の `pdftoppm` を呼び出すラスタライザ
//!
//! # 実装詳細
//! - ページごとに `pdftoppm -png -singlefile -f N -l N -r DPI` を実行
//! - 出力先は一時ディレクトリ。PNG を読み込んだらディレクトリごと破棄
//! - 解像度は 72 DPI（PDF のネイティブ解像度）× scale
//!
//! `embed_fonts_only` に対応するオプションは pdftoppm に無いため無視します。

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::RenderError;
use crate::ports::{Rasterizer, RenderOptions, RenderedPage};

const PDFTOPPM: &str = "pdftoppm";
const NATIVE_DPI: f32 = 72.0;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Rasterizer backed by an external `pdftoppm` process.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
    timeout: Duration,
}

impl PdftoppmRasterizer {
    /// Find `pdftoppm` on `PATH`.
    pub fn discover() -> Result<Self, RenderError> {
        match which::which(PDFTOPPM) {
            Ok(binary) => {
                tracing::debug!(binary = %binary.display(), "discovered pdftoppm");
                Ok(Self::with_binary(binary))
            }
            Err(e) => {
                tracing::info!("pdftoppm executable not found in PATH");
                Err(RenderError::ToolNotFound(format!("{PDFTOPPM}: {e}")))
            }
        }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    async fn render_page(
        &self,
        input: &Path,
        page: u32,
        dpi: f32,
        workdir: &Path,
    ) -> Result<RenderedPage, RenderError> {
        let prefix = workdir.join(format!("page-{page}"));

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-png")
            .arg("-singlefile")
            .args(["-f", &page.to_string(), "-l", &page.to_string()])
            .args(["-r", &format!("{dpi:.2}")])
            .arg(input)
            .arg(&prefix)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| RenderError::Failed {
                status: None,
                stderr: format!("timed out after {:?}", self.timeout),
            })??;

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let content = tokio::fs::read(prefix.with_extension("png")).await?;
        Ok(RenderedPage { content })
    }
}

fn validate(options: &RenderOptions) -> Result<f32, RenderError> {
    if !(options.scale > 0.0 && options.scale.is_finite()) {
        return Err(RenderError::InvalidOptions(format!(
            "scale must be positive, got {}",
            options.scale
        )));
    }
    if let Some(page) = options.pages.iter().find(|p| **p == 0) {
        return Err(RenderError::InvalidOptions(format!(
            "page numbers are 1-based, got {page}"
        )));
    }
    Ok(NATIVE_DPI * options.scale)
}

#[async_trait]
impl Rasterizer for PdftoppmRasterizer {
    #[tracing::instrument(skip(self, path, options), fields(path = %path.display()))]
    async fn render(
        &self,
        path: &Path,
        options: &RenderOptions,
    ) -> Result<Vec<RenderedPage>, RenderError> {
        let dpi = validate(options)?;
        if !options.embed_fonts_only {
            tracing::debug!("pdftoppm always falls back to system fonts; embed_fonts_only=false is a no-op");
        }

        let workdir = tempfile::tempdir()?;
        let mut pages = Vec::with_capacity(options.pages.len());
        for page in &options.pages {
            pages.push(self.render_page(path, *page, dpi, workdir.path()).await?);
        }
        tracing::debug!(pages = pages.len(), dpi, "rendered document");
        Ok(pages)
    }
}
