//! Resolution and parsing of the `_config` file.
//!
//! The file is a list of `KEY=VALUE` lines. Blank lines and lines starting
//! with `#` are ignored; the first `=` separates key from value and both are
//! trimmed. The first existing path out of [`DEFAULT_CANDIDATES`] wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Locations searched for the config file, in order.
pub const DEFAULT_CANDIDATES: [&str; 3] = ["./_config", "prompt-eng/_config", "../_config"];

/// Contents written by [`write_sample_config`].
pub const SAMPLE_CONFIG: &str = "URL_GENERATE=http://localhost:11434/api/generate\nAPI_KEY=\n";

pub const KEY_URL_GENERATE: &str = "URL_GENERATE";
pub const KEY_API_KEY: &str = "API_KEY";
pub const KEY_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

/// Why a configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found in any of the expected locations: {}", .searched.join(", "))]
    NotFound { searched: Vec<String> },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: expected KEY=VALUE", .path.display())]
    Malformed { path: PathBuf, line: usize },

    #[error("'{}' does not define {key}", .path.display())]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("'{}': invalid value '{value}' for {key}", .path.display())]
    InvalidValue {
        path: PathBuf,
        key: &'static str,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Raw file
// ---------------------------------------------------------------------------

/// A parsed config file: its location plus every key it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Reads and parses the file at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parses config text; `path` is only used in error messages.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut entries = BTreeMap::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Malformed {
                    path,
                    line: index + 1,
                });
            };
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value for `key`, treating an empty value as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Parses the value for `key`, if present.
    pub fn parse_value<T: std::str::FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                    path: self.path.clone(),
                    key,
                    value: raw.to_string(),
                })
            })
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Finds the config file among an ordered list of candidate paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResolver {
    candidates: Vec<PathBuf>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::with_candidates(DEFAULT_CANDIDATES)
    }
}

impl ConfigResolver {
    pub fn with_candidates<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists on disk.
    pub fn resolve(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|path| path.exists())
    }

    /// Resolves and parses the config file.
    pub fn load(&self) -> Result<ConfigFile, ConfigError> {
        let path = self.resolve().ok_or_else(|| ConfigError::NotFound {
            searched: self
                .candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        })?;
        tracing::debug!(path = %path.display(), "Loading config");
        ConfigFile::load(path)
    }
}

/// Writes [`SAMPLE_CONFIG`] to `path`, pointing at a local Ollama server.
pub fn write_sample_config(path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    std::fs::write(path, SAMPLE_CONFIG).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Typed model-server configuration
// ---------------------------------------------------------------------------

/// Everything the model client needs to reach the generation server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelServerConfig {
    pub url_generate: String,
    /// Bearer token; `None` when unset or empty.
    pub api_key: Option<String>,
    /// No timeout unless configured; a hung request then blocks the run.
    pub request_timeout: Option<Duration>,
}

impl ModelServerConfig {
    pub fn new(url_generate: impl Into<String>) -> Self {
        Self {
            url_generate: url_generate.into(),
            api_key: None,
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn from_file(file: &ConfigFile) -> Result<Self, ConfigError> {
        let url = file.get(KEY_URL_GENERATE).ok_or_else(|| ConfigError::MissingKey {
            path: file.path().to_path_buf(),
            key: KEY_URL_GENERATE,
        })?;
        let mut config = Self::new(url);
        if let Some(key) = file.get(KEY_API_KEY) {
            config = config.with_api_key(key);
        }
        if let Some(secs) = file.parse_value::<u64>(KEY_REQUEST_TIMEOUT_SECS)? {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn parses_keys_and_skips_comments() {
        let text = "\
# model server
URL_GENERATE = http://localhost:11434/api/generate

API_KEY=sk-abc=123
";
        let file = ConfigFile::parse("_config", text).unwrap();
        assert_eq!(file.get("URL_GENERATE"), Some("http://localhost:11434/api/generate"));
        // Only the first '=' splits.
        assert_eq!(file.get("API_KEY"), Some("sk-abc=123"));
    }

    #[test]
    fn line_without_equals_is_malformed() {
        let err = ConfigFile::parse("_config", "URL_GENERATE=x\njunk\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 2, .. }));
    }

    #[test]
    fn empty_api_key_means_no_bearer() {
        let file = ConfigFile::parse("_config", "URL_GENERATE=http://h/api\nAPI_KEY=\n").unwrap();
        let config = ModelServerConfig::from_file(&file).unwrap();
        assert_eq!(config.url_generate, "http://h/api");
        assert_eq!(config.api_key, None);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn missing_url_is_reported() {
        let file = ConfigFile::parse("_config", "API_KEY=k\n").unwrap();
        let err = ModelServerConfig::from_file(&file).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "URL_GENERATE", .. }));
    }

    #[test]
    fn invalid_timeout_is_reported() {
        let file = ConfigFile::parse("_config", "URL_GENERATE=u\nREQUEST_TIMEOUT_SECS=soon\n").unwrap();
        let err = ModelServerConfig::from_file(&file).unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("missing/_config");
        let second = dir.path().join("second_config");
        let third = dir.path().join("third_config");
        std::fs::write(&second, "URL_GENERATE=http://second\n").unwrap();
        std::fs::write(&third, "URL_GENERATE=http://third\n").unwrap();

        let resolver = ConfigResolver::with_candidates([&first, &second, &third]);
        assert_eq!(resolver.resolve(), Some(second.as_path()));

        let file = resolver.load().unwrap();
        assert_eq!(file.get(KEY_URL_GENERATE), Some("http://second"));
    }

    #[test]
    fn no_candidate_is_not_found() {
        let dir = TempDir::new().unwrap();
        let resolver = ConfigResolver::with_candidates([dir.path().join("nope")]);
        let err = resolver.load().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { ref searched } if searched.len() == 1));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn sample_config_round_trips_through_the_parser() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_config");
        write_sample_config(&path).unwrap();
        let config = ModelServerConfig::from_file(&ConfigFile::load(&path).unwrap()).unwrap();
        assert_eq!(config, ModelServerConfig::new("http://localhost:11434/api/generate"));
    }

    #[test]
    fn default_candidates_are_searched_in_order() {
        let resolver = ConfigResolver::default();
        let candidates: Vec<String> = resolver
            .candidates()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(candidates, ["./_config", "prompt-eng/_config", "../_config"]);
    }
}
