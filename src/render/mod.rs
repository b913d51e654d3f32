//! Render service: turn a matched template and caption into an image.
//!
//! # Overview
//!
//! [`RenderService`] is the async seam the session calls after a match.
//! [`MemegenRenderer`] is the production implementation: it fetches the
//! finished meme from a memegen-compatible HTTP API, decodes it and scales
//! it to the viewport with [`fit_to_viewport`].
//!
//! Failures are reported as [`RenderError`]; the session logs them and
//! carries on as if nothing had matched.

pub mod memegen;
pub mod scale;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{Caption, MemeTemplate};

pub use memegen::MemegenRenderer;
pub use scale::{fit_size, fit_to_viewport};

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Size of the area the artifact is displayed in, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `false` until the display has reported a non-empty size.
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

// ---------------------------------------------------------------------------
// RenderError
// ---------------------------------------------------------------------------

/// Why an artifact could not be produced.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The service does not know the template.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Transport failure, timeout or unexpected HTTP status.
    #[error("render I/O failed: {0}")]
    Io(String),

    /// The service answered with bytes that are not a decodable image.
    #[error("failed to decode rendered image: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RenderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RenderError::Io("request timed out".into())
        } else {
            RenderError::Io(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// RenderedArtifact
// ---------------------------------------------------------------------------

/// A finished meme, already scaled for the viewport it was requested for.
#[derive(Clone)]
pub struct RenderedArtifact {
    pub template_key: String,
    pub caption: Caption,
    /// Where the image came from (URL or path), for logs and the UI.
    pub source: String,
    pub image: image::RgbaImage,
}

impl RenderedArtifact {
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl fmt::Debug for RenderedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedArtifact")
            .field("template_key", &self.template_key)
            .field("caption", &self.caption)
            .field("source", &self.source)
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// RenderService trait
// ---------------------------------------------------------------------------

/// Produces a [`RenderedArtifact`] for a template and caption.
///
/// Implementors must be `Send + Sync` so they can be held behind an
/// `Arc<dyn RenderService>` by the session task.
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn render(
        &self,
        template: &dyn MemeTemplate,
        caption: &Caption,
        viewport: Viewport,
    ) -> Result<RenderedArtifact, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_known_only_when_non_empty() {
        assert!(!Viewport::default().is_known());
        assert!(!Viewport::new(500, 0).is_known());
        assert!(Viewport::new(500, 400).is_known());
    }

    #[test]
    fn artifact_debug_omits_pixels() {
        let artifact = RenderedArtifact {
            template_key: "doge".into(),
            caption: Caption::new("such", "wow"),
            source: "memory".into(),
            image: image::RgbaImage::new(3, 2),
        };
        let dbg = format!("{artifact:?}");
        assert!(dbg.contains("doge"));
        assert!(dbg.contains("(3, 2)"));
    }

    #[test]
    fn render_error_display() {
        assert!(RenderError::NotFound("xyz".into()).to_string().contains("xyz"));
        assert!(RenderError::Decode("bad".into()).to_string().contains("decode"));
    }
}
