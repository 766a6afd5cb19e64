//! Config discovery and settings assembly.

use std::path::Path;

use anyhow::{Context, Result};
use llm::{write_sample_config, ConfigFile, ConfigResolver, ModelServerConfig};
use pipeline::{ModelName, PipelineSettings};
use tracing::{info, warn};

const KEY_MODEL: &str = "MODEL";
const KEY_TEMPERATURE: &str = "TEMPERATURE";
const KEY_RENDER_BASE_URL: &str = "RENDER_BASE_URL";

/// Where the sample config is written when none is found.
pub const SAMPLE_CONFIG_PATH: &str = "./_config";

/// Finds the config file, writing a sample one at `sample_path` when no
/// candidate exists, and parses it.
pub fn load_or_create_config(resolver: &ConfigResolver, sample_path: &Path) -> Result<ConfigFile> {
    match resolver.resolve() {
        Some(path) => info!(path = %path.display(), "Found config"),
        None => {
            warn!("No _config file found. Creating a sample configuration...");
            write_sample_config(sample_path)?;
            warn!(
                path = %sample_path.display(),
                "Sample _config created; verify the URL is correct for your Ollama installation before proceeding"
            );
            return ConfigFile::load(sample_path).context("failed to read the sample config");
        }
    }
    resolver.load().context("failed to load _config")
}

pub fn model_server_config(file: &ConfigFile) -> Result<ModelServerConfig> {
    ModelServerConfig::from_file(file).context("invalid model server configuration")
}

/// Stock settings with the optional `MODEL`, `TEMPERATURE` and
/// `RENDER_BASE_URL` overrides applied.
pub fn pipeline_settings(file: &ConfigFile) -> Result<PipelineSettings> {
    let mut settings = PipelineSettings::default();
    if let Some(model) = file.get(KEY_MODEL).and_then(ModelName::new) {
        settings = settings.with_model(model);
    }
    if let Some(temperature) = file.parse_value::<f64>(KEY_TEMPERATURE)? {
        settings = settings.with_temperature(temperature);
    }
    if let Some(url) = file.get(KEY_RENDER_BASE_URL) {
        settings = settings.with_render_base_url(url);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sample_config_is_created_when_nothing_is_found() {
        let dir = TempDir::new().unwrap();
        let sample = dir.path().join("_config");
        let resolver = ConfigResolver::with_candidates([dir.path().join("absent")]);

        let file = load_or_create_config(&resolver, &sample).unwrap();
        assert!(sample.exists());
        assert_eq!(
            model_server_config(&file).unwrap().url_generate,
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn existing_config_is_left_untouched() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("existing");
        std::fs::write(&existing, "URL_GENERATE=http://gpu-box:11434/api/generate\n").unwrap();
        let sample = dir.path().join("_config");
        let resolver = ConfigResolver::with_candidates([&existing]);

        let file = load_or_create_config(&resolver, &sample).unwrap();
        assert!(!sample.exists());
        assert_eq!(file.path(), existing.as_path());
    }

    #[test]
    fn settings_overrides_apply() {
        let file = ConfigFile::parse(
            "_config",
            "URL_GENERATE=u\nMODEL=mistral\nTEMPERATURE=0.2\nRENDER_BASE_URL=http://ink.local/img/\n",
        )
        .unwrap();
        let settings = pipeline_settings(&file).unwrap();
        assert_eq!(settings.model.as_str(), "mistral");
        assert_eq!(settings.temperature, 0.2);
        assert_eq!(settings.render_base_url, "http://ink.local/img/");
    }

    #[test]
    fn settings_default_without_overrides() {
        let file = ConfigFile::parse("_config", "URL_GENERATE=u\n").unwrap();
        assert_eq!(pipeline_settings(&file).unwrap(), PipelineSettings::default());
    }

    #[test]
    fn bad_temperature_is_an_error() {
        let file = ConfigFile::parse("_config", "URL_GENERATE=u\nTEMPERATURE=warm\n").unwrap();
        assert!(pipeline_settings(&file).is_err());
    }
}
