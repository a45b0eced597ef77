use crate::error::Result;
use crate::schema::{SchemaSnapshot, TableDescriptor};

/// Schema introspection seam.
///
/// Implementations return [`crate::Error::NotFound`] when the table does not exist.
pub trait SchemaSource {
    fn table(&self, schema: &str, name: &str) -> Result<&TableDescriptor>;
}

impl SchemaSource for SchemaSnapshot {
    fn table(&self, schema: &str, name: &str) -> Result<&TableDescriptor> {
        self.find_table(schema, name)
    }
}
