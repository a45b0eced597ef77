mod registry;
mod sampler;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use rowsmith_core::{Error as CoreError, SchemaSnapshot, validate_snapshot};
use rowsmith_generate::{GenerationEngine, GenerationError, MemorySampleSource, SampleSource};
use thiserror::Error;
use uuid::Uuid;

use registry::{RegistryError, init_logging, output_paths, write_output};
use sampler::FileSampleSource;
use settings::{DEFAULT_SETTINGS_FILE, Overrides, SettingsError, load_settings};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "rowsmith", version, about = "Synthetic T-SQL insert script generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an insert script for one table.
    Generate(GenerateArgs),
    /// Print the JSON Schema of the snapshot format.
    SnapshotSchema(SnapshotSchemaArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Settings file.
    #[arg(long, short, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    /// Target schema (overrides `target.schema`).
    #[arg(long)]
    schema: Option<String>,
    /// Target table (overrides `target.table`).
    #[arg(long)]
    table: Option<String>,
    /// Number of rows to generate.
    #[arg(long)]
    rows: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Chance of NULL for nullable columns, in 0.0..=1.0.
    #[arg(long, value_name = "P")]
    null_probability: Option<f64>,
    /// Disable table constraints around the inserts.
    #[arg(long, overrides_with = "enable_constraints")]
    disable_constraints: bool,
    /// Keep constraints checked even if the settings file disables them.
    #[arg(long, overrides_with = "disable_constraints")]
    enable_constraints: bool,
    /// Foreign key sample file (overrides `sources.samples`).
    #[arg(long)]
    samples: Option<PathBuf>,
    /// Output directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Append JSON log events to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Print the script to stdout as well.
    #[arg(long, default_value_t = false)]
    print: bool,
}

impl GenerateArgs {
    fn constraints_override(&self) -> Option<bool> {
        match (self.disable_constraints, self.enable_constraints) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Args, Debug)]
struct SnapshotSchemaArgs {
    /// Write to a file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::SnapshotSchema(args) => run_snapshot_schema(args),
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    init_logging(args.log_file.as_deref())?;

    let run_id = Uuid::new_v4().to_string();
    let timer = Instant::now();
    tracing::info!(event = "run_started", run_id = %run_id, config = %args.config.display());

    let mut settings = load_settings(&args.config)?;
    let disable_constraints = args.constraints_override();
    settings.apply(Overrides {
        schema: args.schema,
        table: args.table,
        rows: args.rows,
        seed: args.seed,
        null_probability: args.null_probability,
        disable_constraints,
        out_dir: args.out_dir,
        samples: args.samples,
    });
    settings.validate()?;

    let snapshot = load_snapshot(&settings.sources.snapshot).await?;
    tracing::info!(
        event = "snapshot_loaded",
        path = %settings.sources.snapshot.display(),
        tables = snapshot.tables.len()
    );

    let source: Box<dyn SampleSource> = match &settings.sources.samples {
        Some(path) => Box::new(FileSampleSource::new(path)),
        None => {
            tracing::warn!(
                event = "no_samples",
                "no sample file configured; foreign key columns will be NULL"
            );
            Box::new(MemorySampleSource::new())
        }
    };

    let engine = GenerationEngine::new(settings.generation.clone());
    let output = engine
        .run(
            &snapshot,
            &settings.target.schema,
            &settings.target.table,
            source.as_ref(),
        )
        .await?;

    let paths = output_paths(&settings.output.dir, &settings.target.table);
    let bytes = write_output(&paths, &output)?;
    tracing::info!(
        event = "script_written",
        path = %paths.script.display(),
        report = %paths.report.display(),
        bytes
    );

    if args.print {
        println!("{}", output.script.render());
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}

async fn load_snapshot(path: &Path) -> Result<SchemaSnapshot, CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let snapshot: SchemaSnapshot =
        serde_json::from_str(&content).map_err(|source| CliError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

fn run_snapshot_schema(args: SnapshotSchemaArgs) -> Result<(), CliError> {
    let schema = schemars::schema_for!(SchemaSnapshot);
    let encoded = serde_json::to_string_pretty(&schema)?;
    match args.out {
        Some(path) => std::fs::write(path, encoded)?,
        None => println!("{encoded}"),
    }
    Ok(())
}
