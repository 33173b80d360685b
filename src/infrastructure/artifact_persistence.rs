use crate::config::DEFAULT_MODEL_PATH;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ports::ArtifactStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Keeps the current model artifact as a single JSON file.
pub struct JsonFileArtifactStore {
    file_path: PathBuf,
}

impl Default for JsonFileArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

impl JsonFileArtifactStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl ArtifactStore for JsonFileArtifactStore {
    fn load(&self) -> Result<Option<ModelArtifact>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read model artifact {:?}", self.file_path))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&content).context("Failed to parse model artifact JSON")?;

        info!("Loaded model artifact from {:?}", self.file_path);
        Ok(Some(artifact))
    }

    fn save(&self, artifact: &ModelArtifact) -> Result<()> {
        if let Some(dir) = self.file_path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create model directory {:?}", dir))?;
        }

        let content =
            serde_json::to_string_pretty(artifact).context("Failed to serialize model artifact")?;

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write temp model file")?;
        fs::rename(&temp_path, &self.file_path).context("Failed to rename model file")?;

        info!("Saved model artifact to {:?}", self.file_path);
        Ok(())
    }

    fn location(&self) -> String {
        self.file_path.display().to_string()
    }
}
