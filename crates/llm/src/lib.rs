//! SDLC pipeline model-server adapter.
//!
//! Implements the [`pipeline::ModelClient`] trait over HTTP for servers that
//! speak either Ollama's `/api/generate` or an OpenAI-style chat endpoint, and
//! resolves the `_config` file that says where that server lives.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request headers, status handling and
//! config-file parsing live here. The [`pipeline`] crate sees only
//! [`pipeline::ModelClient`].

pub mod client;
pub mod config;
pub mod transport;

pub use client::HttpModelClient;
pub use config::{
    write_sample_config, ConfigError, ConfigFile, ConfigResolver, ModelServerConfig, DEFAULT_CANDIDATES,
    SAMPLE_CONFIG,
};
pub use transport::{HttpRequest, ReqwestTransport, Transport, TransportError, TransportResponse};
