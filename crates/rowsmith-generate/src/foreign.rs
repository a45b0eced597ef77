use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info, warn};

use rowsmith_core::{TableDescriptor, bracket, qualified_name};

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;
use crate::model::GenerationConfig;

/// Opens short-lived read connections used for foreign key sampling.
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SampleConnection>, GenerationError>;
}

/// A read connection able to answer scalar sampling queries.
#[async_trait]
pub trait SampleConnection: Send {
    /// Return up to `query.limit` non-null values of the referenced column.
    async fn fetch_scalars(
        &mut self,
        query: &SampleQuery,
    ) -> Result<Vec<GeneratedValue>, GenerationError>;

    async fn close(&mut self) -> Result<(), GenerationError>;
}

/// Sampling request for one referenced parent column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleQuery {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub limit: u32,
}

impl SampleQuery {
    /// T-SQL text: a random top-N of non-null parent values.
    pub fn to_sql(&self) -> String {
        let column = bracket(&self.column);
        format!(
            "SELECT TOP ({}) {column} FROM {} WHERE {column} IS NOT NULL ORDER BY NEWID();",
            self.limit,
            qualified_name(&self.schema, &self.table)
        )
    }

    fn key(&self) -> String {
        sample_key(&self.schema, &self.table, &self.column)
    }
}

/// Parent values sampled per child column, built once per run.
///
/// An empty list means the parent had no eligible rows; that column is
/// generated as `NULL`.
#[derive(Debug, Clone, Default)]
pub struct FkValueCache {
    values: BTreeMap<String, Vec<GeneratedValue>>,
}

impl FkValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the candidates for `column`.
    pub fn with_values(mut self, column: &str, values: Vec<GeneratedValue>) -> Self {
        self.values.insert(column.to_lowercase(), values);
        self
    }

    /// Sample parent values for every single-column, enabled foreign key of `table`.
    ///
    /// One connection serves all keys and is closed before returning, whether
    /// sampling succeeded or not.
    pub async fn build(
        table: &TableDescriptor,
        config: &GenerationConfig,
        source: &dyn SampleSource,
    ) -> Result<Self, GenerationError> {
        let targets = sampling_targets(table, config);
        if targets.is_empty() {
            debug!(schema = %table.schema, table = %table.name, "no foreign keys to sample");
            return Ok(Self::default());
        }

        let unavailable = |err: GenerationError| GenerationError::SourceUnavailable {
            schema: table.schema.clone(),
            table: table.name.clone(),
            columns: targets.keys().cloned().collect::<Vec<_>>().join(", "),
            message: err.to_string(),
        };

        let mut connection = source.connect().await.map_err(unavailable)?;
        let sampled = load_samples(connection.as_mut(), table, &targets).await;
        let closed = connection.close().await;

        let cache = sampled?;
        if let Err(err) = closed {
            warn!(error = %err, "failed to close sample connection");
            return Err(unavailable(err));
        }

        info!(
            schema = %table.schema,
            table = %table.name,
            columns = cache.values.len(),
            values = cache.values.values().map(Vec::len).sum::<usize>(),
            "fk cache built"
        );
        Ok(cache)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(&column.to_lowercase())
    }

    pub fn candidates(&self, column: &str) -> Option<&[GeneratedValue]> {
        self.values.get(&column.to_lowercase()).map(Vec::as_slice)
    }

    /// Uniform pick among the cached values; `Null` when the sample is empty.
    /// `None` when the column is not FK-cached at all.
    pub fn pick<R: Rng + ?Sized>(&self, column: &str, rng: &mut R) -> Option<GeneratedValue> {
        let values = self.candidates(column)?;
        if values.is_empty() {
            return Some(GeneratedValue::Null);
        }
        Some(values[rng.random_range(0..values.len())].clone())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Child column → sampling query, for keys that participate in sampling.
pub fn sampling_targets(
    table: &TableDescriptor,
    config: &GenerationConfig,
) -> BTreeMap<String, SampleQuery> {
    let mut targets = BTreeMap::new();

    for fk in &table.foreign_keys {
        let name = fk.name.as_deref().unwrap_or("<unnamed>");
        if !fk.is_enabled {
            warn!(foreign_key = name, "disabled foreign key skipped");
            continue;
        }
        if !fk.is_single_column() {
            warn!(
                foreign_key = name,
                columns = fk.columns.len(),
                "multi-column foreign key skipped"
            );
            continue;
        }

        let (Some(child), Some(parent)) = (fk.columns.first(), fk.referenced_columns.first())
        else {
            continue;
        };
        if child.is_empty() || parent.is_empty() || fk.referenced_table.is_empty() {
            continue;
        }

        targets.insert(
            child.clone(),
            SampleQuery {
                schema: fk.referenced_schema_or(&config.default_fk_schema).to_string(),
                table: fk.referenced_table.clone(),
                column: parent.clone(),
                limit: config.fk_sample_size,
            },
        );
    }

    targets
}

async fn load_samples(
    connection: &mut dyn SampleConnection,
    table: &TableDescriptor,
    targets: &BTreeMap<String, SampleQuery>,
) -> Result<FkValueCache, GenerationError> {
    let mut cache = FkValueCache::new();

    for (child, query) in targets {
        let values = connection
            .fetch_scalars(query)
            .await
            .map_err(|err| GenerationError::Sampling {
                schema: query.schema.clone(),
                table: query.table.clone(),
                column: query.column.clone(),
                message: err.to_string(),
            })?;

        let values: Vec<GeneratedValue> = values
            .into_iter()
            .filter(|value| !value.is_null())
            .take(query.limit as usize)
            .collect();

        if values.is_empty() {
            warn!(
                schema = %table.schema,
                table = %table.name,
                column = %child,
                parent = %query.key(),
                "parent has no rows; column will be NULL"
            );
        }
        cache.values.insert(child.to_lowercase(), values);
    }

    Ok(cache)
}

fn sample_key(schema: &str, table: &str, column: &str) -> String {
    format!("{schema}.{table}.{column}").to_lowercase()
}

/// Sample source backed by values held in memory, keyed by parent column.
#[derive(Debug, Clone, Default)]
pub struct MemorySampleSource {
    columns: Arc<HashMap<String, Vec<GeneratedValue>>>,
}

impl MemorySampleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(
        mut self,
        schema: &str,
        table: &str,
        column: &str,
        values: Vec<GeneratedValue>,
    ) -> Self {
        Arc::make_mut(&mut self.columns).insert(sample_key(schema, table, column), values);
        self
    }

    /// Build from `{ "schema.table.column": [values...] }`.
    pub fn from_json(document: &serde_json::Value) -> Result<Self, GenerationError> {
        let object = document.as_object().ok_or_else(|| GenerationError::Connection {
            message: "sample document must be a JSON object".to_string(),
        })?;

        let mut columns = HashMap::new();
        for (key, values) in object {
            let values = values.as_array().ok_or_else(|| GenerationError::Connection {
                message: format!("samples for '{key}' must be an array"),
            })?;
            columns.insert(
                key.to_lowercase(),
                values.iter().map(GeneratedValue::from_json).collect(),
            );
        }

        Ok(Self {
            columns: Arc::new(columns),
        })
    }
}

#[async_trait]
impl SampleSource for MemorySampleSource {
    async fn connect(&self) -> Result<Box<dyn SampleConnection>, GenerationError> {
        Ok(Box::new(MemoryConnection {
            columns: Arc::clone(&self.columns),
            open: true,
        }))
    }
}

struct MemoryConnection {
    columns: Arc<HashMap<String, Vec<GeneratedValue>>>,
    open: bool,
}

#[async_trait]
impl SampleConnection for MemoryConnection {
    async fn fetch_scalars(
        &mut self,
        query: &SampleQuery,
    ) -> Result<Vec<GeneratedValue>, GenerationError> {
        if !self.open {
            return Err(GenerationError::Connection {
                message: "connection is closed".to_string(),
            });
        }
        Ok(self
            .columns
            .get(&query.key())
            .map(|values| {
                values
                    .iter()
                    .filter(|value| !value.is_null())
                    .take(query.limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), GenerationError> {
        self.open = false;
        Ok(())
    }
}
