//! Flat-file artifact store rooted at the output directory.
//!
//! Layout:
//!
//! ```text
//! <root>/requirements.txt
//! <root>/architecture.txt
//! <root>/uml_diagrams.txt
//! <root>/code/implementation.py
//! <root>/diagrams/<name>.mmd
//! <root>/diagrams/<name>.png
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{ArtifactError, ArtifactStore, DiagramName, Stage};
use tracing::info;

const DIAGRAMS_DIR: &str = "diagrams";
const CODE_DIR: &str = "code";
const SOURCE_EXT: &str = "mmd";
const IMAGE_EXT: &str = "png";

#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage_path(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.output_path())
    }

    pub fn diagrams_dir(&self) -> PathBuf {
        self.root.join(DIAGRAMS_DIR)
    }

    pub fn diagram_source_path(&self, name: &DiagramName) -> PathBuf {
        self.diagrams_dir().join(format!("{name}.{SOURCE_EXT}"))
    }

    pub fn diagram_image_path(&self, name: &DiagramName) -> PathBuf {
        self.diagrams_dir().join(format!("{name}.{IMAGE_EXT}"))
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<(), ArtifactError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| ArtifactError::io(parent, err))?;
        }
        tokio::fs::write(path, contents)
            .await
            .map_err(|err| ArtifactError::io(path, err))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn prepare(&self) -> Result<(), ArtifactError> {
        for dir in [self.diagrams_dir(), self.root.join(CODE_DIR)] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|err| ArtifactError::io(&dir, err))?;
        }
        Ok(())
    }

    async fn save_stage_output(&self, stage: Stage, text: &str) -> Result<(), ArtifactError> {
        let path = self.stage_path(stage);
        self.write(&path, text.as_bytes()).await?;
        info!(stage = %stage, path = %path.display(), "Saved stage output");
        Ok(())
    }

    async fn save_diagram(&self, name: &DiagramName, source: &str) -> Result<(), ArtifactError> {
        let path = self.diagram_source_path(name);
        self.write(&path, source.as_bytes()).await?;
        info!(path = %path.display(), "Saved diagram");
        Ok(())
    }

    async fn list_diagrams(&self) -> Result<Vec<DiagramName>, ArtifactError> {
        let dir = self.diagrams_dir();
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|err| ArtifactError::io(&dir, err))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| ArtifactError::io(&dir, err))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXT) {
                continue;
            }
            if let Some(name) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(DiagramName::new)
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn load_diagram(&self, name: &DiagramName) -> Result<String, ArtifactError> {
        let path = self.diagram_source_path(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| ArtifactError::io(path, err))
    }

    async fn save_rendered_diagram(&self, name: &DiagramName, image: &[u8]) -> Result<(), ArtifactError> {
        let path = self.diagram_image_path(name);
        self.write(&path, image).await?;
        info!(path = %path.display(), "Rendered diagram");
        Ok(())
    }
}
