use thiserror::Error;

/// Core error type shared across rowsmith crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested table is absent from the schema source.
    #[error("table [{schema}].[{table}] not found")]
    NotFound { schema: String, table: String },
    /// The requested column is absent from its table.
    #[error("column [{column}] not found in [{schema}].[{table}]")]
    ColumnNotFound {
        schema: String,
        table: String,
        column: String,
    },
    /// The snapshot violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for results returned by rowsmith crates.
pub type Result<T> = std::result::Result<T, Error>;
