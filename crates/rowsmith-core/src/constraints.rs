use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Check constraint attached to a table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckConstraint {
    pub name: Option<String>,
    /// Source text as reported by the server, e.g. `(isjson([Payload])=(1))`.
    pub text: String,
}

/// Foreign key definition preserving column ordering.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKeyDescriptor {
    pub name: Option<String>,
    /// Child columns on the owning table.
    pub columns: Vec<String>,
    /// Referenced schema; empty or absent means the server default.
    #[serde(default)]
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    /// Referenced columns, positionally paired with `columns`.
    pub referenced_columns: Vec<String>,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ForeignKeyDescriptor {
    pub fn is_single_column(&self) -> bool {
        self.columns.len() == 1 && self.referenced_columns.len() == 1
    }

    /// Referenced schema, falling back to `default_schema` when unspecified.
    pub fn referenced_schema_or<'a>(&'a self, default_schema: &'a str) -> &'a str {
        match self.referenced_schema.as_deref() {
            Some(schema) if !schema.trim().is_empty() => schema,
            _ => default_schema,
        }
    }
}
