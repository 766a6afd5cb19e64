//! SDLC pipeline diagram rendering adapter.
//!
//! Implements the [`pipeline::DiagramRenderer`] trait against the public
//! mermaid.ink service: the diagram source is base64-encoded into the URL
//! path and a `GET` returns the rendered image.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL encoding and HTTP transport live here. The
//! executor in `stages` sees only [`pipeline::DiagramRenderer`] and decides
//! what a failure means (it never aborts the run).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use pipeline::{error_chain, DiagramRenderer, RenderError};
use tracing::debug;

/// Image endpoint of the public mermaid.ink service.
pub const DEFAULT_BASE_URL: &str = pipeline::DEFAULT_RENDER_BASE_URL;

/// Renders Mermaid source to PNG through mermaid.ink.
#[derive(Debug, Clone)]
pub struct MermaidInkRenderer {
    base_url: String,
    client: reqwest::Client,
}

impl Default for MermaidInkRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl MermaidInkRenderer {
    /// `base_url` is the prefix the encoded source is appended to.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Full image URL for a piece of diagram source.
    pub fn image_url(&self, source: &str) -> String {
        format!("{}{}", self.base_url, encode_source(source))
    }
}

/// Standard, padded base64 of the UTF-8 source.
pub fn encode_source(source: &str) -> String {
    STANDARD.encode(source.as_bytes())
}

#[async_trait]
impl DiagramRenderer for MermaidInkRenderer {
    async fn render(&self, source: &str) -> Result<Vec<u8>, RenderError> {
        let url = self.image_url(source);
        debug!(%url, "Requesting diagram image");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| RenderError::Transport(error_chain(&err)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(RenderError::Http { status });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| RenderError::Transport(error_chain(&err)))?;
        Ok(bytes.to_vec())
    }
}
