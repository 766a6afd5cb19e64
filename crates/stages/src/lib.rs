//! SDLC pipeline stage executor and filesystem adapters.
//!
//! This crate provides the [`PipelineExecutor`] that drives the four
//! generation stages and the diagram rendering pass, plus the filesystem
//! implementations of the template and artifact ports.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The executor sequences calls between the domain
//! logic in the [`pipeline`] crate and the infrastructure traits (model
//! client, template source, artifact store, diagram renderer). It contains no
//! HTTP code of its own.

pub mod executor;
pub mod store;
pub mod templates;

pub use executor::{DiagramRender, PipelineExecutor, PipelineReport, RenderStatus, RunOutcome};
pub use store::FsArtifactStore;
pub use templates::FsTemplateSource;
