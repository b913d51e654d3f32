//! [`MemegenRenderer`]: fetch finished memes from a memegen-compatible API.
//!
//! The image URL has the form
//! `{base_url}/images/{template}/{top}/{bottom}.{extension}`, with caption
//! lines escaped by [`Caption::to_path`].  All connection details come from
//! [`RenderConfig`].

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{fit_to_viewport, RenderError, RenderService, RenderedArtifact, Viewport};
use crate::catalog::{Caption, MemeTemplate};
use crate::config::RenderConfig;

pub struct MemegenRenderer {
    client: reqwest::Client,
    config: RenderConfig,
}

impl MemegenRenderer {
    /// Build a renderer from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is used if the builder fails.
    pub fn from_config(config: &RenderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// URL of the rendered image for `key` and `caption`.
    pub fn image_url(&self, key: &str, caption: &Caption) -> String {
        format!(
            "{}/images/{}/{}.{}",
            self.config.base_url.trim_end_matches('/'),
            key,
            caption.to_path(),
            self.config.extension.trim_start_matches('.'),
        )
    }
}

/// Decode encoded image bytes and fit them to `viewport`.
pub(crate) fn decode_and_fit(
    bytes: &[u8],
    viewport: Viewport,
    fit_ratio: f64,
) -> Result<image::RgbaImage, RenderError> {
    let image = image::load_from_memory(bytes).map_err(|e| RenderError::Decode(e.to_string()))?;
    Ok(fit_to_viewport(image, viewport, fit_ratio))
}

#[async_trait]
impl RenderService for MemegenRenderer {
    async fn render(
        &self,
        template: &dyn MemeTemplate,
        caption: &Caption,
        viewport: Viewport,
    ) -> Result<RenderedArtifact, RenderError> {
        let url = self.image_url(template.key(), caption);
        log::debug!("render: GET {url}");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(RenderError::NotFound(template.key().to_string())),
            status if !status.is_success() => {
                return Err(RenderError::Io(format!("HTTP {status} from {url}")))
            }
            _ => {}
        }

        let bytes = response.bytes().await?;
        let fit_ratio = self.config.fit_ratio;

        // Decoding and Lanczos resampling are CPU-bound.
        let image = tokio::task::spawn_blocking(move || decode_and_fit(&bytes, viewport, fit_ratio))
            .await
            .map_err(|e| RenderError::Io(format!("render task failed: {e}")))??;

        log::info!(
            "render: {} rendered at {}x{}",
            template.key(),
            image.width(),
            image.height()
        );

        Ok(RenderedArtifact {
            template_key: template.key().to_string(),
            caption: caption.clone(),
            source: url,
            image,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
