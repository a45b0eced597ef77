use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rowsmith_core::DEFAULT_SCHEMA;
use rowsmith_generate::GenerationConfig;

pub const DEFAULT_SETTINGS_FILE: &str = "rowsmith.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Contents of `rowsmith.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub target: TargetSettings,
    #[serde(default)]
    pub generation: GenerationConfig,
    pub sources: SourceSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSettings {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Schema snapshot JSON.
    pub snapshot: PathBuf,
    /// Parent-column samples, `{ "schema.table.column": [...] }`.
    #[serde(default)]
    pub samples: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

/// Command-line values that win over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub schema: Option<String>,
    pub table: Option<String>,
    pub rows: Option<u64>,
    pub seed: Option<u64>,
    pub null_probability: Option<f64>,
    /// `Some(false)` re-enables constraints the file disabled.
    pub disable_constraints: Option<bool>,
    pub out_dir: Option<PathBuf>,
    pub samples: Option<PathBuf>,
}

impl Settings {
    pub fn parse(content: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(schema) = overrides.schema {
            self.target.schema = schema;
        }
        if let Some(table) = overrides.table {
            self.target.table = table;
        }
        if let Some(rows) = overrides.rows {
            self.generation.row_count = rows;
        }
        if let Some(seed) = overrides.seed {
            self.generation.seed = seed;
        }
        if let Some(probability) = overrides.null_probability {
            self.generation.null_probability = probability;
        }
        if let Some(disable) = overrides.disable_constraints {
            self.generation.disable_constraints = disable;
        }
        if let Some(dir) = overrides.out_dir {
            self.output.dir = dir;
        }
        if let Some(samples) = overrides.samples {
            self.sources.samples = Some(samples);
        }
    }

    /// Make file paths relative to the directory holding the settings file.
    fn anchor(&mut self, base: &Path) {
        let resolve = |path: &Path| {
            if path.is_relative() {
                base.join(path)
            } else {
                path.to_path_buf()
            }
        };
        self.sources.snapshot = resolve(&self.sources.snapshot);
        self.sources.samples = self.sources.samples.as_deref().map(resolve);
        self.output.dir = resolve(&self.output.dir);
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.target.table.trim().is_empty() {
            return Err(SettingsError::Invalid("target.table must not be empty".to_string()));
        }
        if self.target.schema.trim().is_empty() {
            return Err(SettingsError::Invalid("target.schema must not be empty".to_string()));
        }
        self.generation
            .validate()
            .map_err(|err| SettingsError::Invalid(err.to_string()))
    }
}

/// Read settings from `path`, anchoring relative paths to its directory.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut settings = Settings::parse(&content, path)?;
    if let Some(base) = path.parent() {
        settings.anchor(base);
    }
    Ok(settings)
}
