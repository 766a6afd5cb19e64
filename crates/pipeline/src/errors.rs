//! Error types for the SDLC pipeline domain.
//!
//! [`GenerationError`] replaces the legacy convention of returning a string
//! prefixed with [`ERROR_MARKER`] alongside a latency of `-1`. Its `Display`
//! output keeps that prefix so log lines stay recognisable to anyone used to
//! the old output.
//!
//! [`StageError`] is what aborts a run; [`RenderError`] is isolated per
//! diagram and never aborts anything.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix carried by every generation error message.
pub const ERROR_MARKER: &str = "!!ERROR!!";

/// Renders `err` followed by every distinct cause in its `source()` chain,
/// joined with `": "`.
///
/// HTTP clients tend to put the useful part ("Connection refused", a DNS
/// failure, a timeout) in a nested source rather than the top-level message.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

// ---------------------------------------------------------------------------
// Payload construction
// ---------------------------------------------------------------------------

/// Failure to build a [`crate::Payload`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The requested target protocol tag is not one of the supported values.
    #[error("!!ERROR!! Unknown target: {0}")]
    UnknownTarget(String),
}

// ---------------------------------------------------------------------------
// Model-server calls
// ---------------------------------------------------------------------------

/// Why a single model-server call produced no usable text.
///
/// A response body in an unrecognised shape is **not** an error; it is
/// surfaced as [`crate::ResponseSchema::Unknown`] and passed through.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GenerationError {
    /// The request never produced an HTTP response (connect, DNS, TLS, timeout).
    #[error("!!ERROR!! Request failed: {message}. You need to adjust _config with URL({endpoint})")]
    Transport {
        /// Endpoint the request was sent to.
        endpoint: String,
        /// Underlying transport error text.
        message: String,
    },

    /// The server answered `401 Unauthorized`.
    #[error("!!ERROR!! Authentication issue. You need to adjust _config with API_KEY ({endpoint})")]
    Authentication {
        /// Endpoint the request was sent to.
        endpoint: String,
    },

    /// The server answered with any other non-200 status.
    #[error("!!ERROR!! HTTP Response={status}, {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

impl GenerationError {
    /// Latency reported alongside a failed call by the legacy tuple convention.
    pub const SENTINEL_LATENCY: f64 = -1.0;

    /// Legacy `(latency, message)` view of this error.
    pub fn as_legacy_outcome(&self) -> (f64, String) {
        (Self::SENTINEL_LATENCY, self.to_string())
    }
}

// ---------------------------------------------------------------------------
// Artifacts and templates
// ---------------------------------------------------------------------------

/// Failure reading or writing a file owned by the pipeline.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Filesystem operation failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        /// Path that was being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    /// Wraps an I/O error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage-level failures
// ---------------------------------------------------------------------------

/// A failure that aborts the remaining stages of a run.
///
/// Results accumulated before the failing stage are kept and returned to the
/// caller; files already written are not rolled back.
#[derive(Debug, Error)]
pub enum StageError {
    /// The model-server call for the stage failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A template existed but could not be read, or an output could not be written.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

// ---------------------------------------------------------------------------
// Diagram rendering
// ---------------------------------------------------------------------------

/// Failure to render one diagram. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The rendering service could not be reached.
    #[error("request to rendering service failed: {0}")]
    Transport(String),

    /// The rendering service answered with a non-200 status.
    #[error("HTTP {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },
}
