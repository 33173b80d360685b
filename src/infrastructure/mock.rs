use crate::domain::market::ohlcv::OhlcvRecord;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ports::{ArtifactStore, OhlcvSource};
use anyhow::{Result, anyhow, bail};
use std::sync::Mutex;

/// Serves a fixed price history, or a fixed failure.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOhlcvSource {
    records: Vec<OhlcvRecord>,
    failure: Option<String>,
}

impl InMemoryOhlcvSource {
    pub fn new(records: Vec<OhlcvRecord>) -> Self {
        Self {
            records,
            failure: None,
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(reason.into()),
        }
    }
}

impl OhlcvSource for InMemoryOhlcvSource {
    fn daily_history(&self) -> Result<Vec<OhlcvRecord>> {
        if let Some(reason) = &self.failure {
            bail!("{}", reason);
        }
        Ok(self.records.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    artifact: Mutex<Option<ModelArtifact>>,
}

impl InMemoryArtifactStore {
    pub fn with_artifact(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Mutex::new(Some(artifact)),
        }
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn load(&self) -> Result<Option<ModelArtifact>> {
        let guard = self
            .artifact
            .lock()
            .map_err(|_| anyhow!("artifact store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, artifact: &ModelArtifact) -> Result<()> {
        let mut guard = self
            .artifact
            .lock()
            .map_err(|_| anyhow!("artifact store lock poisoned"))?;
        *guard = Some(artifact.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
