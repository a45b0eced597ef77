use thiserror::Error;

/// Errors emitted by the generation engine.
///
/// Synthesis itself never fails; only schema lookups, configuration and the
/// FK sampling collaborator can abort a run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Schema(#[from] rowsmith_core::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("sample source connection failed: {message}")]
    Connection { message: String },
    #[error("cannot sample foreign keys of [{schema}].[{table}] ({columns}): {message}")]
    SourceUnavailable {
        schema: String,
        table: String,
        columns: String,
        message: String,
    },
    #[error("sampling [{schema}].[{table}].[{column}] failed: {message}")]
    Sampling {
        schema: String,
        table: String,
        column: String,
        message: String,
    },
}
