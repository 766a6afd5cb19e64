//! Prompt templates read from a directory of `<name>.txt` files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{ArtifactError, TemplateSource};

#[derive(Debug, Clone)]
pub struct FsTemplateSource {
    dir: PathBuf,
}

impl FsTemplateSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.txt"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TemplateSource for FsTemplateSource {
    async fn load(&self, name: &str) -> Result<Option<String>, ArtifactError> {
        let path = self.path_for(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ArtifactError::io(path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_named_template() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("uml.txt"), "Draw {architecture}").unwrap();
        let source = FsTemplateSource::new(dir.path());

        assert_eq!(source.load("uml").await.unwrap().as_deref(), Some("Draw {architecture}"));
    }

    #[tokio::test]
    async fn missing_template_is_none() {
        let dir = TempDir::new().unwrap();
        let source = FsTemplateSource::new(dir.path());
        assert_eq!(source.load("requirements").await.unwrap(), None);
    }
}
