use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use rowsmith_core::DEFAULT_SCHEMA;

use crate::errors::GenerationError;

/// Upper bound on parent values loaded per foreign key column.
pub const DEFAULT_FK_SAMPLE_SIZE: u32 = 100;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 12345;

/// Options for one generation run. Immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of `INSERT` statements to emit.
    pub row_count: u64,
    /// Chance that a nullable column receives `NULL`, in `0.0..=1.0`.
    pub null_probability: f64,
    /// Wrap inserts in `NOCHECK CONSTRAINT ALL` / `WITH CHECK CHECK CONSTRAINT ALL`.
    pub disable_constraints: bool,
    /// Column names never generated (case-insensitive).
    pub excluded_columns: Vec<String>,
    pub seed: u64,
    /// Upper end of generated date/time windows; `None` means the current UTC time.
    pub reference_time: Option<NaiveDateTime>,
    pub fk_sample_size: u32,
    /// Schema assumed for foreign keys whose referenced schema is unspecified.
    pub default_fk_schema: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            row_count: 10,
            null_probability: 0.1,
            disable_constraints: false,
            excluded_columns: Vec::new(),
            seed: DEFAULT_SEED,
            reference_time: None,
            fk_sample_size: DEFAULT_FK_SAMPLE_SIZE,
            default_fk_schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(0.0..=1.0).contains(&self.null_probability) {
            return Err(GenerationError::InvalidConfig(format!(
                "null_probability must be within 0.0..=1.0, got {}",
                self.null_probability
            )));
        }
        if self.fk_sample_size == 0 {
            return Err(GenerationError::InvalidConfig(
                "fk_sample_size must be at least 1".to_string(),
            ));
        }
        if self.default_fk_schema.trim().is_empty() {
            return Err(GenerationError::InvalidConfig(
                "default_fk_schema must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded_columns
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(column))
    }

    /// Pin the reference time so every later read of it agrees.
    pub fn resolved(&self) -> Self {
        let mut config = self.clone();
        if config.reference_time.is_none() {
            config.reference_time = Some(Utc::now().naive_utc());
        }
        config
    }

    pub fn reference_time_or_now(&self) -> NaiveDateTime {
        self.reference_time
            .unwrap_or_else(|| Utc::now().naive_utc())
    }
}

/// Statistics for one generated script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub schema: String,
    pub table: String,
    pub seed: u64,
    pub reference_time: Option<NaiveDateTime>,
    pub rows_requested: u64,
    pub rows_generated: u64,
    pub insertable_columns: Vec<String>,
    pub excluded_columns: Vec<String>,
    pub json_columns: Vec<String>,
    pub fk_cached_columns: Vec<String>,
    /// FK columns whose parent sample was empty; always `NULL`.
    pub empty_fk_columns: Vec<String>,
    pub null_values: u64,
    pub cached_values: u64,
    pub synthesized_values: u64,
    pub type_usage: BTreeMap<String, u64>,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(schema: &str, table: &str, config: &GenerationConfig) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            seed: config.seed,
            reference_time: config.reference_time,
            rows_requested: config.row_count,
            ..Self::default()
        }
    }

    pub fn record_null(&mut self) {
        self.null_values += 1;
    }

    pub fn record_cached(&mut self) {
        self.cached_values += 1;
    }

    pub fn record_synthesized(&mut self, sql_type: &str) {
        self.synthesized_values += 1;
        *self.type_usage.entry(sql_type.to_string()).or_insert(0) += 1;
    }

    pub fn total_values(&self) -> u64 {
        self.null_values + self.cached_values + self.synthesized_values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_null_probability() {
        let config = GenerationConfig {
            null_probability: 1.5,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn exclusions_ignore_case() {
        let config = GenerationConfig {
            excluded_columns: vec!["RowVersion".to_string()],
            ..GenerationConfig::default()
        };
        assert!(config.is_excluded("rowversion"));
        assert!(!config.is_excluded("Id"));
    }

    #[test]
    fn resolved_pins_reference_time() {
        let config = GenerationConfig::default().resolved();
        assert!(config.reference_time.is_some());
        assert_eq!(config.reference_time, config.resolved().reference_time);
    }

    #[test]
    fn partial_toml_like_input_uses_defaults() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{ "row_count": 5 }"#).expect("parse config");
        assert_eq!(config.row_count, 5);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.fk_sample_size, DEFAULT_FK_SAMPLE_SIZE);
        assert_eq!(config.default_fk_schema, "dbo");
    }
}
