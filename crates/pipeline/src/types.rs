//! Shared value types for the SDLC pipeline domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values that participate in domain computations (latency rounding,
//! option pass-through, timestamps on the run report).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Generation options
// ---------------------------------------------------------------------------

/// Open-ended sampling options forwarded to the model server (e.g. `temperature`).
///
/// Values are passed through opaquely; no validation is performed. Insertion
/// order is irrelevant to the server, so a plain JSON object is sufficient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationOptions(Map<String, Value>);

impl GenerationOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an option, returning the updated set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Convenience for the one option the pipeline always sets.
    #[must_use]
    pub fn with_temperature(self, temperature: f64) -> Self {
        self.with("temperature", temperature)
    }

    /// Returns `true` if no option has been supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value of a single option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Consumes the set, returning the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Latency
// ---------------------------------------------------------------------------

/// Wall-clock time spent on one model-server round trip.
///
/// Informational only; the pipeline never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Latency(Duration);

impl Latency {
    /// Wraps a measured [`Duration`].
    pub fn new(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    /// Returns the latency in seconds, rounded to millisecond precision.
    pub fn rounded_secs(self) -> f64 {
        (self.0.as_secs_f64() * 1000.0).round() / 1000.0
    }
}

impl std::fmt::Display for Latency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.rounded_secs())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_rounds_to_three_decimals() {
        let latency = Latency::new(Duration::from_micros(1_234_567));
        assert_eq!(latency.rounded_secs(), 1.235);
        assert_eq!(latency.to_string(), "1.235s");
    }

    #[test]
    fn options_serialize_as_flat_object() {
        let options = GenerationOptions::new().with_temperature(0.7).with("top_k", 40);
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, serde_json::json!({"temperature": 0.7, "top_k": 40}));
    }
}
