//! Normalisation of model-server response bodies.
//!
//! Two shapes are recognised: Ollama's `{"response": "..."}` and the
//! OpenAI-style `{"choices": [{"message": {"content": "..."}}]}`. Anything
//! else is kept as [`ModelResponse::Unknown`] and its raw JSON becomes the
//! result text. That fallback is best-effort, not an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Latency;

/// Which response shape a [`Generation`] was normalised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSchema {
    Generate,
    Chat,
    Unknown,
}

/// A parsed 200 response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// `{"response": text}`
    Generate(String),
    /// `{"choices": [{"message": {"content": text}}]}`
    Chat(String),
    /// Any other body, kept verbatim.
    Unknown(Value),
}

impl ModelResponse {
    /// Classifies an already-decoded JSON body.
    ///
    /// A `response` key wins over `choices` when both are present.
    pub fn from_value(value: Value) -> Self {
        if let Some(text) = value.get("response").and_then(Value::as_str) {
            return Self::Generate(text.to_string());
        }
        let chat = value
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str);
        match chat {
            Some(text) => Self::Chat(text.to_string()),
            None => Self::Unknown(value),
        }
    }

    /// Parses a raw body. A body that is not JSON at all is passed through as
    /// an unknown string value.
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(err) => {
                tracing::warn!(error = %err, "Response body is not JSON; passing it through");
                Self::Unknown(Value::String(body.to_string()))
            }
        }
    }

    pub fn schema(&self) -> ResponseSchema {
        match self {
            Self::Generate(_) => ResponseSchema::Generate,
            Self::Chat(_) => ResponseSchema::Chat,
            Self::Unknown(_) => ResponseSchema::Unknown,
        }
    }

    /// Flattens the response into result text.
    pub fn into_text(self) -> String {
        match self {
            Self::Generate(text) | Self::Chat(text) => text,
            Self::Unknown(Value::String(raw)) => raw,
            Self::Unknown(other) => other.to_string(),
        }
    }
}

/// A successful model-server call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub latency: Latency,
    pub text: String,
    pub schema: ResponseSchema,
}

impl Generation {
    /// Builds a [`Generation`] from a parsed response and its measured latency.
    pub fn from_response(latency: Latency, response: ModelResponse) -> Self {
        let schema = response.schema();
        Self {
            latency,
            text: response.into_text(),
            schema,
        }
    }

    /// Legacy `(latency, text)` view, latency rounded to milliseconds.
    pub fn as_legacy_outcome(&self) -> (f64, &str) {
        (self.latency.rounded_secs(), &self.text)
    }
}
