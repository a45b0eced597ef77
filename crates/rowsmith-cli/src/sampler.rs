use std::path::PathBuf;

use async_trait::async_trait;

use rowsmith_generate::{GenerationError, MemorySampleSource, SampleConnection, SampleSource};

/// Sample source reading `{ "schema.table.column": [values...] }` from a
/// JSON file. The file is read on every `connect`, so a missing or broken
/// file surfaces as a connection failure.
#[derive(Debug, Clone)]
pub struct FileSampleSource {
    path: PathBuf,
}

impl FileSampleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SampleSource for FileSampleSource {
    async fn connect(&self) -> Result<Box<dyn SampleConnection>, GenerationError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| GenerationError::Connection {
                message: format!("failed to read samples {}: {err}", self.path.display()),
            })?;
        let document: serde_json::Value =
            serde_json::from_str(&content).map_err(|err| GenerationError::Connection {
                message: format!("failed to parse samples {}: {err}", self.path.display()),
            })?;

        tracing::debug!(path = %self.path.display(), "sample file opened");
        MemorySampleSource::from_json(&document)?.connect().await
    }
}
