//! Request bodies for the two supported model-server protocols.
//!
//! | Target | Body |
//! |--------|------|
//! | `ollama` | `{model, prompt, stream: false, options?}` |
//! | `open-webui` | `{model, messages: [{role: "user", content}]}` |
//!
//! `options` is omitted entirely when no generation option was supplied.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{GenerationOptions, ModelName, PayloadError};

/// Backend API shape a [`Payload`] must conform to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetProtocol {
    /// Ollama `/api/generate`.
    Ollama,
    /// Open WebUI's OpenAI-compatible chat completions.
    OpenWebui,
}

impl TargetProtocol {
    /// The tag used in configuration and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenWebui => "open-webui",
        }
    }
}

impl FromStr for TargetProtocol {
    type Err = PayloadError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "ollama" => Ok(Self::Ollama),
            "open-webui" => Ok(Self::OpenWebui),
            other => Err(PayloadError::UnknownTarget(other.to_string())),
        }
    }
}

impl std::fmt::Display for TargetProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat turn in an `open-webui` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A single generation request body. Built fresh for every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Generate {
        model: ModelName,
        prompt: String,
        stream: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<Map<String, Value>>,
    },
    Chat {
        model: ModelName,
        messages: Vec<ChatMessage>,
    },
}

impl Payload {
    /// Builds a payload for an already-parsed target.
    ///
    /// Generation options only apply to the `ollama` shape; the chat shape has
    /// no slot for them and they are dropped.
    pub fn new(
        target: TargetProtocol,
        model: ModelName,
        prompt: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        match target {
            TargetProtocol::Ollama => Self::Generate {
                model,
                prompt: prompt.into(),
                stream: false,
                options: (!options.is_empty()).then(|| options.into_map()),
            },
            TargetProtocol::OpenWebui => Self::Chat {
                model,
                messages: vec![ChatMessage {
                    role: "user".to_string(),
                    content: prompt.into(),
                }],
            },
        }
    }

    /// Builds a payload from a free-form target tag.
    ///
    /// An unknown tag yields no payload and is reported as an error event.
    pub fn build(
        tag: &str,
        model: ModelName,
        prompt: impl Into<String>,
        options: GenerationOptions,
    ) -> Result<Self, PayloadError> {
        let target = tag.parse::<TargetProtocol>().inspect_err(|err| {
            tracing::error!(target_tag = tag, "{err}");
        })?;
        Ok(Self::new(target, model, prompt, options))
    }

    /// Which protocol this payload was shaped for.
    pub fn target(&self) -> TargetProtocol {
        match self {
            Self::Generate { .. } => TargetProtocol::Ollama,
            Self::Chat { .. } => TargetProtocol::OpenWebui,
        }
    }

    /// The model the request addresses.
    pub fn model(&self) -> &ModelName {
        match self {
            Self::Generate { model, .. } | Self::Chat { model, .. } => model,
        }
    }

    /// The prompt text, whichever shape carries it.
    pub fn prompt(&self) -> &str {
        match self {
            Self::Generate { prompt, .. } => prompt,
            Self::Chat { messages, .. } => messages.last().map_or("", |m| m.content.as_str()),
        }
    }

    /// Serialises the payload into the JSON body sent on the wire.
    pub fn to_json(&self) -> Value {
        // Every field is a string, bool, or already-JSON map; this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
