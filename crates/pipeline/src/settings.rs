//! Run-level settings for the stage executor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{GenerationOptions, ModelName, TargetProtocol};

/// Default model requested from the generation server.
pub const DEFAULT_MODEL: &str = "llama3";

/// Sampling temperature applied to every stage.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Image endpoint of the public mermaid.ink service.
pub const DEFAULT_RENDER_BASE_URL: &str = "https://mermaid.ink/img/";

/// Tunables for one pipeline run.
///
/// Everything has a default, so `PipelineSettings::default()` reproduces the
/// stock behaviour: `llama3` over the Ollama protocol at temperature 0.7,
/// templates read from `templates/`, artifacts written under `outputs/`,
/// diagrams rendered through mermaid.ink.
///
/// The executor reads the model, target and temperature. `templates_dir`,
/// `output_dir` and `render_base_url` are read by the composition root when
/// it builds the template source, artifact store and renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_model")]
    pub model: ModelName,
    #[serde(default = "default_target")]
    pub target: TargetProtocol,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_render_base_url")]
    pub render_base_url: String,
}

fn default_model() -> ModelName {
    ModelName::new(DEFAULT_MODEL).unwrap_or_else(|| unreachable!("default model name is non-empty"))
}

fn default_target() -> TargetProtocol {
    TargetProtocol::Ollama
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_render_base_url() -> String {
    DEFAULT_RENDER_BASE_URL.to_string()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            target: default_target(),
            temperature: default_temperature(),
            templates_dir: default_templates_dir(),
            output_dir: default_output_dir(),
            render_base_url: default_render_base_url(),
        }
    }
}

impl PipelineSettings {
    #[must_use]
    pub fn with_model(mut self, model: ModelName) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_render_base_url(mut self, url: impl Into<String>) -> Self {
        self.render_base_url = url.into();
        self
    }

    /// Options sent with every stage request.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions::new().with_temperature(self.temperature)
    }
}
