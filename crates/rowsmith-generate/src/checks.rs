use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use rowsmith_core::{ColumnDescriptor, TableDescriptor, bracket};

/// JSON validation/extraction functions that mark a check as JSON-shaped.
static JSON_FUNCTIONS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)isjson|json_value|json_query|openjson").ok());

/// Whether a check constraint's text implies `column` must hold JSON.
///
/// Plain case-insensitive substring matching: the bracketed column name and
/// any JSON function token must both appear. Over-matching only changes the
/// shape of generated text.
pub fn is_json_check(text: &str, column: &str) -> bool {
    let token = bracket(column).to_lowercase();
    if !text.to_lowercase().contains(&token) {
        return false;
    }
    match JSON_FUNCTIONS.as_ref() {
        Some(pattern) => pattern.is_match(text),
        None => false,
    }
}

/// Lower-cased names of the given columns that sit under a JSON check.
pub fn json_constrained_columns<'a>(
    table: &TableDescriptor,
    columns: impl IntoIterator<Item = &'a ColumnDescriptor>,
) -> BTreeSet<String> {
    columns
        .into_iter()
        .filter(|column| {
            table
                .checks
                .iter()
                .any(|check| is_json_check(&check.text, &column.name))
        })
        .map(|column| column.name.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsmith_core::{CheckConstraint, SqlType};

    fn table(checks: &[&str]) -> TableDescriptor {
        TableDescriptor {
            schema: "dbo".to_string(),
            name: "Events".to_string(),
            columns: vec![
                ColumnDescriptor::new("Payload", SqlType::NVarChar),
                ColumnDescriptor::new("Name", SqlType::NVarChar),
            ],
            checks: checks
                .iter()
                .map(|text| CheckConstraint {
                    name: None,
                    text: text.to_string(),
                })
                .collect(),
            foreign_keys: Vec::new(),
        }
    }

    #[test]
    fn detects_isjson_case_insensitively() {
        assert!(is_json_check("(isjson([Payload])=(1))", "Payload"));
        assert!(is_json_check("(ISJSON([payload])>(0))", "Payload"));
        assert!(is_json_check("(json_value([Payload],'$.id') IS NOT NULL)", "Payload"));
        assert!(is_json_check("(JSON_QUERY([Payload]) IS NOT NULL)", "payload"));
    }

    #[test]
    fn requires_bracketed_column_reference() {
        assert!(!is_json_check("(isjson([Other])=(1))", "Payload"));
        assert!(!is_json_check("(isjson(Payload)=(1))", "Payload"));
    }

    #[test]
    fn ignores_non_json_checks() {
        assert!(!is_json_check("(len([Payload])>(0))", "Payload"));
    }

    #[test]
    fn collects_only_constrained_columns() {
        let table = table(&["(isjson([Payload])=(1))", "(len([Name])>(2))"]);
        let columns = json_constrained_columns(&table, &table.columns);
        assert_eq!(columns.into_iter().collect::<Vec<_>>(), vec!["payload"]);
    }

    #[test]
    fn no_checks_means_no_json_columns() {
        let table = table(&[]);
        assert!(json_constrained_columns(&table, &table.columns).is_empty());
    }
}
