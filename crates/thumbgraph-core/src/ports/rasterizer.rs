//! Rasterizer port - ドキュメントを画像に変換
//!
//! レンダリング自体は外部ツールの責務。コアは「1 ページ目だけ、縮小スケールで」
//! というリクエストを組み立てて渡すだけです。

use std::path::Path;

use async_trait::async_trait;

use crate::domain::RenderError;

/// Options passed to the rasterizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Only use fonts embedded in the document (no system font fallback).
    pub embed_fonts_only: bool,
    /// Viewport scale relative to the document's native size.
    pub scale: f32,
    /// 1-based page numbers to render.
    pub pages: Vec<u32>,
}

impl RenderOptions {
    /// A single reduced-scale page.
    pub fn thumbnail(scale: f32, page: u32) -> Self {
        Self {
            embed_fonts_only: true,
            scale,
            pages: vec![page],
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::thumbnail(0.33, 1)
    }
}

/// Encoded image bytes of one rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub content: Vec<u8>,
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn render(
        &self,
        path: &Path,
        options: &RenderOptions,
    ) -> Result<Vec<RenderedPage>, RenderError>;
}
