use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::{CheckConstraint, ForeignKeyDescriptor};
use crate::error::{Error, Result};
use crate::types::SqlType;

/// Snapshot of the tables a generation run may target.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaSnapshot {
    /// Contract version for this snapshot format.
    pub snapshot_version: String,
    /// Database name when available.
    #[serde(default)]
    pub database: Option<String>,
    pub tables: Vec<TableDescriptor>,
}

impl SchemaSnapshot {
    /// Find a table by schema and name, ignoring case like the server does.
    pub fn find_table(&self, schema: &str, name: &str) -> Result<&TableDescriptor> {
        self.tables
            .iter()
            .find(|table| {
                table.schema.eq_ignore_ascii_case(schema) && table.name.eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| Error::NotFound {
                schema: schema.to_string(),
                table: name.to_string(),
            })
    }
}

/// Table metadata as reported by schema introspection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableDescriptor {
    pub schema: String,
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub checks: Vec<CheckConstraint>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Result<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::ColumnNotFound {
                schema: self.schema.clone(),
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Columns that can receive a value in an `INSERT`.
    pub fn insertable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|column| column.is_insertable())
    }
}

/// Column metadata for a table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDescriptor {
    pub name: String,
    #[schemars(with = "String")]
    pub sql_type: SqlType,
    /// Declared length in characters (or bytes for binary types); -1 is `(max)`.
    #[serde(default = "unbounded_length")]
    pub max_length: i32,
    #[serde(default)]
    pub precision: Option<u8>,
    #[serde(default)]
    pub scale: Option<u8>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub identity: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sparse: bool,
    #[serde(default)]
    pub in_primary_key: bool,
}

fn unbounded_length() -> i32 {
    -1
}

impl ColumnDescriptor {
    /// Plain column of the given type: bounded by nothing, not null, no flags.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            max_length: unbounded_length(),
            precision: None,
            scale: None,
            nullable: false,
            identity: false,
            computed: false,
            sparse: false,
            in_primary_key: false,
        }
    }

    pub fn is_insertable(&self) -> bool {
        !self.identity && !self.computed && !self.sparse && !self.in_primary_key
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_length < 0
    }
}
