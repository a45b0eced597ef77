use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use rowsmith_core::{ColumnDescriptor, SchemaSource, TableDescriptor, bracket, qualified_name};

use crate::checks::json_constrained_columns;
use crate::errors::GenerationError;
use crate::foreign::{FkValueCache, SampleSource};
use crate::generators::{GeneratedValue, ValueSynthesizer};
use crate::literal::render;
use crate::model::{GenerationConfig, GenerationReport};

/// Line emitted instead of a script when a table has nothing to insert.
pub const NO_INSERTABLE_COLUMNS: &str =
    "No insertable columns (all are identity/computed/sparse).";

/// Ordered script lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedScript {
    pub statements: Vec<String>,
}

impl GeneratedScript {
    pub fn render(&self) -> String {
        self.statements.join("\n")
    }

    /// Number of `INSERT` statements in the script.
    pub fn insert_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|line| line.starts_with("INSERT INTO "))
            .count()
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub script: GeneratedScript,
    pub report: GenerationReport,
}

/// Turns a table descriptor plus a warmed FK cache into a transactional
/// insert script.
pub struct BatchComposer;

impl BatchComposer {
    pub fn compose(
        table: &TableDescriptor,
        config: &GenerationConfig,
        cache: &FkValueCache,
    ) -> GenerationOutput {
        let mut report = GenerationReport::new(&table.schema, &table.name, config);
        let (columns, excluded): (Vec<&ColumnDescriptor>, Vec<&ColumnDescriptor>) = table
            .insertable_columns()
            .partition(|column| !config.is_excluded(&column.name));
        report.excluded_columns = excluded.iter().map(|c| c.name.clone()).collect();

        if columns.is_empty() {
            debug!(schema = %table.schema, table = %table.name, "no insertable columns");
            return GenerationOutput {
                script: GeneratedScript {
                    statements: vec![NO_INSERTABLE_COLUMNS.to_string()],
                },
                report,
            };
        }

        let json_columns = json_constrained_columns(table, columns.iter().copied());
        report.insertable_columns = columns.iter().map(|c| c.name.clone()).collect();
        report.json_columns = columns
            .iter()
            .filter(|c| json_columns.contains(&c.name.to_lowercase()))
            .map(|c| c.name.clone())
            .collect();
        report.fk_cached_columns = columns
            .iter()
            .filter(|c| cache.contains(&c.name))
            .map(|c| c.name.clone())
            .collect();
        report.empty_fk_columns = columns
            .iter()
            .filter(|c| cache.candidates(&c.name).is_some_and(<[_]>::is_empty))
            .map(|c| c.name.clone())
            .collect();

        let target = qualified_name(&table.schema, &table.name);
        let column_list = columns
            .iter()
            .map(|c| bracket(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let synthesizer = ValueSynthesizer::new(config.reference_time_or_now());
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut statements = vec![
            "SET NOCOUNT ON;".to_string(),
            "BEGIN TRY".to_string(),
            "BEGIN TRAN;".to_string(),
        ];
        if config.disable_constraints {
            statements.push(format!("ALTER TABLE {target} NOCHECK CONSTRAINT ALL;"));
        }

        for _ in 0..config.row_count {
            let values = columns
                .iter()
                .map(|column| {
                    let json = json_columns.contains(&column.name.to_lowercase());
                    let value = column_value(
                        column,
                        json,
                        config,
                        cache,
                        &synthesizer,
                        &mut rng,
                        &mut report,
                    );
                    render(&value)
                })
                .collect::<Vec<_>>()
                .join(", ");
            statements.push(format!(
                "INSERT INTO {target} ({column_list}) VALUES ({values});"
            ));
            report.rows_generated += 1;
        }

        if config.disable_constraints {
            statements.push(format!(
                "ALTER TABLE {target} WITH CHECK CHECK CONSTRAINT ALL;"
            ));
        }
        statements.extend(
            [
                "COMMIT;",
                "END TRY",
                "BEGIN CATCH",
                "  IF @@TRANCOUNT > 0 ROLLBACK;",
                "  THROW;",
                "END CATCH;",
            ]
            .map(String::from),
        );

        GenerationOutput {
            script: GeneratedScript { statements },
            report,
        }
    }
}

fn column_value(
    column: &ColumnDescriptor,
    json_constrained: bool,
    config: &GenerationConfig,
    cache: &FkValueCache,
    synthesizer: &ValueSynthesizer,
    rng: &mut ChaCha8Rng,
    report: &mut GenerationReport,
) -> GeneratedValue {
    if column.nullable && rng.random::<f64>() < config.null_probability {
        report.record_null();
        return GeneratedValue::Null;
    }

    if let Some(value) = cache.pick(&column.name, rng) {
        if value.is_null() {
            report.record_null();
        } else {
            report.record_cached();
        }
        return value;
    }

    report.record_synthesized(column.sql_type.name());
    synthesizer.synthesize(column, json_constrained, rng)
}

/// Entry point for generating an insert script for one table.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    config: GenerationConfig,
}

impl GenerationEngine {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub async fn run(
        &self,
        snapshot: &dyn SchemaSource,
        schema: &str,
        table: &str,
        source: &dyn SampleSource,
    ) -> Result<GenerationOutput, GenerationError> {
        let start = Instant::now();
        self.config.validate()?;
        let config = self.config.resolved();
        let table = snapshot.table(schema, table)?;

        info!(
            schema = %table.schema,
            table = %table.name,
            rows = config.row_count,
            seed = config.seed,
            disable_constraints = config.disable_constraints,
            "generation started"
        );

        let cache = FkValueCache::build(table, &config, source).await?;
        let mut output = BatchComposer::compose(table, &config, &cache);
        output.report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            schema = %table.schema,
            table = %table.name,
            rows = output.report.rows_generated,
            nulls = output.report.null_values,
            cached = output.report.cached_values,
            synthesized = output.report.synthesized_values,
            duration_ms = output.report.duration_ms,
            "generation completed"
        );

        Ok(output)
    }
}
