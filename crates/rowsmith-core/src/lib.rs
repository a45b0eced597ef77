//! Core contracts shared by the rowsmith crates.
//!
//! Defines the table metadata model consumed by the generator, the schema
//! source seam, identifier quoting for T-SQL, and snapshot validation.

pub mod constraints;
pub mod error;
pub mod ident;
pub mod schema;
pub mod source;
pub mod types;
pub mod validation;

pub use constraints::{CheckConstraint, ForeignKeyDescriptor};
pub use error::{Error, Result};
pub use ident::{bracket, qualified_name};
pub use schema::{ColumnDescriptor, SchemaSnapshot, TableDescriptor};
pub use source::SchemaSource;
pub use types::SqlType;
pub use validation::validate_snapshot;

/// Current contract version for schema snapshot documents.
pub const SNAPSHOT_VERSION: &str = "0.1";

/// Schema used when a reference does not name one.
pub const DEFAULT_SCHEMA: &str = "dbo";
