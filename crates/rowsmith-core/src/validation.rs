use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::{SchemaSnapshot, TableDescriptor};

/// Largest precision SQL Server accepts for `decimal`/`numeric`.
const MAX_PRECISION: u8 = 38;

/// Validate internal consistency of a schema snapshot.
///
/// This checks:
/// - duplicate tables and columns (case-insensitive)
/// - foreign key child columns exist and pair up with referenced columns
/// - numeric precision/scale are within server limits
pub fn validate_snapshot(snapshot: &SchemaSnapshot) -> Result<()> {
    let mut tables = BTreeSet::new();

    for table in &snapshot.tables {
        let key = format!("{}.{}", table.schema, table.name).to_lowercase();
        if !tables.insert(key) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}.{}",
                table.schema, table.name
            )));
        }
        validate_table(table)?;
    }

    Ok(())
}

fn validate_table(table: &TableDescriptor) -> Result<()> {
    let mut columns = BTreeSet::new();
    for column in &table.columns {
        if !columns.insert(column.name.to_lowercase()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate column name: {}.{}.{}",
                table.schema, table.name, column.name
            )));
        }

        if let Some(precision) = column.precision
            && (precision == 0 || precision > MAX_PRECISION)
        {
            return Err(Error::InvalidSchema(format!(
                "precision {precision} out of range for {}.{}.{}",
                table.schema, table.name, column.name
            )));
        }

        if let (Some(precision), Some(scale)) = (column.precision, column.scale)
            && scale > precision
        {
            return Err(Error::InvalidSchema(format!(
                "scale {scale} exceeds precision {precision} for {}.{}.{}",
                table.schema, table.name, column.name
            )));
        }
    }

    for fk in &table.foreign_keys {
        if fk.columns.is_empty() || fk.columns.len() != fk.referenced_columns.len() {
            return Err(Error::InvalidSchema(format!(
                "foreign key {} on {}.{} pairs {} columns with {} referenced columns",
                fk.name.as_deref().unwrap_or("<unnamed>"),
                table.schema,
                table.name,
                fk.columns.len(),
                fk.referenced_columns.len()
            )));
        }
        for column in &fk.columns {
            table.column(column)?;
        }
    }

    Ok(())
}
