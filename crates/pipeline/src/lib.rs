//! Core domain for the SDLC pipeline.
//!
//! This crate contains every domain concept used to turn a user story into
//! requirements, architecture, UML and implementation artifacts: the stages,
//! request payloads, response normalisation, diagram extraction, error types,
//! and the port traits that infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PipelineRunId`, `ModelName`, `DiagramName`) |
//! | [`types`] | Value types (`GenerationOptions`, `Latency`, `Timestamp`) |
//! | [`errors`] | Generation, payload, artifact, stage and render errors |
//! | [`payload`] | Request bodies for the `ollama` and `open-webui` protocols |
//! | [`response`] | Normalisation of response bodies into [`Generation`] |
//! | [`diagrams`] | Mermaid block extraction |
//! | [`template`] | Placeholder interpolation |
//! | [`stage`] | The four stages and [`StageResults`] |
//! | [`settings`] | [`PipelineSettings`] |
//! | [`ports`] | Traits implemented by infrastructure crates |

pub mod diagrams;
pub mod errors;
pub mod identifiers;
pub mod payload;
pub mod ports;
pub mod response;
pub mod settings;
pub mod stage;
pub mod template;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use diagrams::extract_mermaid_diagrams;
pub use errors::{
    error_chain, ArtifactError, GenerationError, PayloadError, RenderError, StageError, ERROR_MARKER,
};
pub use identifiers::{DiagramName, ModelName, PipelineRunId};
pub use payload::{ChatMessage, Payload, TargetProtocol};
pub use ports::{ArtifactStore, DiagramRenderer, ModelClient, TemplateSource};
pub use response::{Generation, ModelResponse, ResponseSchema};
pub use settings::{PipelineSettings, DEFAULT_MODEL, DEFAULT_RENDER_BASE_URL, DEFAULT_TEMPERATURE};
pub use stage::{Stage, StageResults};
pub use template::interpolate;
pub use types::{GenerationOptions, Latency, Timestamp};
