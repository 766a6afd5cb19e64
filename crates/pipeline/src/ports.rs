//! Port traits implemented by infrastructure crates.
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`ModelClient`] | `llm::HttpModelClient` |
//! | [`DiagramRenderer`] | `renderer::MermaidInkRenderer` |
//! | [`TemplateSource`] | `stages::FsTemplateSource` |
//! | [`ArtifactStore`] | `stages::FsArtifactStore` |
//!
//! All traits are object-safe so the executor can hold them as `Arc<dyn _>`.

use async_trait::async_trait;

use crate::{ArtifactError, DiagramName, GenerationError, Generation, Payload, RenderError, Stage};

/// Issues one generation request and normalises the answer.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, payload: &Payload) -> Result<Generation, GenerationError>;
}

/// Turns diagram source into image bytes.
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    async fn render(&self, source: &str) -> Result<Vec<u8>, RenderError>;
}

/// Supplies prompt templates by name.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Returns `Ok(None)` when no template with that name exists; callers
    /// decide how to degrade.
    async fn load(&self, name: &str) -> Result<Option<String>, ArtifactError>;
}

/// Persists everything a run produces.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Creates whatever layout the store needs before the first write.
    async fn prepare(&self) -> Result<(), ArtifactError>;

    /// Writes a stage's raw output, replacing any previous content.
    async fn save_stage_output(&self, stage: Stage, text: &str) -> Result<(), ArtifactError>;

    /// Writes diagram source as `<name>.mmd`.
    async fn save_diagram(&self, name: &DiagramName, source: &str) -> Result<(), ArtifactError>;

    /// Every saved diagram, sorted by name.
    async fn list_diagrams(&self) -> Result<Vec<DiagramName>, ArtifactError>;

    async fn load_diagram(&self, name: &DiagramName) -> Result<String, ArtifactError>;

    /// Writes a rendered image as `<name>.png`.
    async fn save_rendered_diagram(&self, name: &DiagramName, image: &[u8]) -> Result<(), ArtifactError>;
}
