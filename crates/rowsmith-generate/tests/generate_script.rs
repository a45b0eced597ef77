use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use rowsmith_core::{
    CheckConstraint, ColumnDescriptor, ForeignKeyDescriptor, SchemaSnapshot, SqlType,
    TableDescriptor,
};
use rowsmith_generate::{
    BatchComposer, FkValueCache, GeneratedValue, GenerationConfig, GenerationEngine,
    GenerationError, MemorySampleSource, SampleConnection, SampleQuery, SampleSource,
};

fn config(rows: u64) -> GenerationConfig {
    GenerationConfig {
        row_count: rows,
        reference_time: NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0)),
        ..GenerationConfig::default()
    }
}

fn column(name: &str, sql_type: SqlType) -> ColumnDescriptor {
    ColumnDescriptor::new(name, sql_type)
}

fn nullable(mut column: ColumnDescriptor) -> ColumnDescriptor {
    column.nullable = true;
    column
}

fn sized(mut column: ColumnDescriptor, max_length: i32) -> ColumnDescriptor {
    column.max_length = max_length;
    column
}

fn table(name: &str, columns: Vec<ColumnDescriptor>) -> TableDescriptor {
    TableDescriptor {
        schema: "dbo".to_string(),
        name: name.to_string(),
        columns,
        checks: Vec::new(),
        foreign_keys: Vec::new(),
    }
}

fn inserts(script: &str) -> Vec<&str> {
    script
        .lines()
        .filter(|line| line.starts_with("INSERT INTO "))
        .collect()
}

/// Literals of one `INSERT` line. Generated text never contains `", "`.
fn literals(line: &str) -> Vec<&str> {
    let start = line.find("VALUES (").expect("values clause") + "VALUES (".len();
    let end = line.rfind(");").expect("statement terminator");
    line[start..end].split(", ").collect()
}

fn unquote(literal: &str) -> String {
    literal
        .strip_prefix("N'")
        .and_then(|rest| rest.strip_suffix('\''))
        .expect("unicode string literal")
        .replace("''", "'")
}

fn hash(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    hex::encode(hasher.finalize())
}

fn every_type() -> Vec<ColumnDescriptor> {
    let mut decimal = column("Amount", SqlType::Decimal);
    decimal.precision = Some(12);
    decimal.scale = Some(3);
    vec![
        column("Flag", SqlType::Bit),
        column("Tiny", SqlType::TinyInt),
        column("Small", SqlType::SmallInt),
        column("Count", SqlType::Int),
        column("Big", SqlType::BigInt),
        decimal,
        column("Price", SqlType::Money),
        column("Ratio", SqlType::Float),
        column("Born", SqlType::Date),
        column("Seen", SqlType::DateTime2),
        column("Zoned", SqlType::DateTimeOffset),
        column("At", SqlType::Time),
        column("Key", SqlType::UniqueIdentifier),
        sized(column("Code", SqlType::Char), 4),
        sized(column("Title", SqlType::NVarChar), 80),
        column("Body", SqlType::NText),
        sized(column("Blob", SqlType::VarBinary), 8),
        column("Doc", SqlType::Xml),
        column("Shape", SqlType::Other("geography".to_string())),
    ]
}

#[test]
fn identity_table_scenario() {
    let mut id = column("Id", SqlType::Int);
    id.identity = true;
    id.in_primary_key = true;
    let table = table(
        "Orders",
        vec![
            id,
            column("Quantity", SqlType::Int),
            nullable(sized(column("Note", SqlType::VarChar), 50)),
        ],
    );
    let config = GenerationConfig {
        null_probability: 0.0,
        ..config(5)
    };

    let script = BatchComposer::compose(&table, &config, &FkValueCache::new())
        .script
        .render();
    let lines = inserts(&script);

    assert_eq!(lines.len(), 5);
    for line in lines {
        assert!(line.starts_with("INSERT INTO [dbo].[Orders] ([Quantity], [Note]) VALUES ("));
        let values = literals(line);
        assert_eq!(values.len(), 2);
        assert_ne!(values[1], "NULL");
        let note = unquote(values[1]);
        assert!(!note.is_empty() && note.chars().count() <= 50);
    }
}

#[test]
fn zero_insertable_columns_scenario() {
    let mut id = column("Id", SqlType::Int);
    id.identity = true;
    let mut total = column("Total", SqlType::Money);
    total.computed = true;
    let table = table("Ledger", vec![id, total]);

    let script = BatchComposer::compose(&table, &config(10), &FkValueCache::new())
        .script
        .render();

    assert_eq!(
        script,
        "No insertable columns (all are identity/computed/sparse)."
    );
    assert!(!script.contains("BEGIN TRAN"));
}

#[test]
fn isjson_check_scenario() {
    let mut table = table(
        "Events",
        vec![nullable(column("Payload", SqlType::NVarChar))],
    );
    table.checks.push(CheckConstraint {
        name: Some("CK_Events_Payload".to_string()),
        text: "(isjson([Payload])=(1))".to_string(),
    });

    let output = BatchComposer::compose(&table, &config(50), &FkValueCache::new());
    assert_eq!(output.report.json_columns, vec!["Payload"]);

    let script = output.script.render();
    let mut parsed = 0;
    for line in inserts(&script) {
        let literal = literals(line)[0];
        if literal == "NULL" {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(&unquote(literal)).expect("valid json");
        let object = value.as_object().expect("json object");
        assert!((3..=7).contains(&object.len()));
        parsed += 1;
    }
    assert!(parsed > 0);
}

#[test]
fn non_nullable_columns_are_never_null() {
    let table = table("Everything", every_type());
    let config = GenerationConfig {
        null_probability: 1.0,
        ..config(40)
    };

    let script = BatchComposer::compose(&table, &config, &FkValueCache::new())
        .script
        .render();

    for line in inserts(&script) {
        let values = literals(line);
        assert_eq!(values.len(), table.columns.len());
        assert!(values.iter().all(|value| *value != "NULL"), "{line}");
    }
}

#[test]
fn decimal_literals_respect_precision_and_scale() {
    let shapes = [(5_u8, 2_u8), (10, 0), (4, 4), (38, 10), (28, 6)];
    let columns = shapes
        .iter()
        .enumerate()
        .map(|(index, (precision, scale))| {
            let mut column = column(&format!("D{index}"), SqlType::Numeric);
            column.precision = Some(*precision);
            column.scale = Some(*scale);
            column
        })
        .collect();
    let table = table("Amounts", columns);

    let script = BatchComposer::compose(&table, &config(200), &FkValueCache::new())
        .script
        .render();

    for line in inserts(&script) {
        for (literal, (precision, scale)) in literals(line).into_iter().zip(shapes) {
            let unsigned = literal.trim_start_matches('-');
            let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
            let integer_digits = integer.trim_start_matches('0').len();
            assert!(
                integer_digits + fraction.len() <= precision as usize,
                "{literal} exceeds precision {precision}"
            );
            assert!(
                fraction.len() <= scale as usize,
                "{literal} exceeds scale {scale}"
            );
        }
    }
}

#[test]
fn same_seed_produces_identical_scripts() {
    let table = table("Everything", every_type().into_iter().map(nullable).collect());
    let cache = FkValueCache::new();

    let first = BatchComposer::compose(&table, &config(25), &cache).script.render();
    let second = BatchComposer::compose(&table, &config(25), &cache).script.render();
    assert_eq!(hash(&first), hash(&second));

    let reseeded = GenerationConfig {
        seed: 7,
        ..config(25)
    };
    let third = BatchComposer::compose(&table, &reseeded, &cache).script.render();
    assert_ne!(hash(&first), hash(&third));
}

fn orders_snapshot() -> SchemaSnapshot {
    let mut orders = table(
        "Orders",
        vec![
            nullable(column("CustomerId", SqlType::Int)),
            column("RegionId", SqlType::Int),
            column("Quantity", SqlType::SmallInt),
        ],
    );
    orders.foreign_keys = vec![
        ForeignKeyDescriptor {
            name: Some("FK_Orders_Customers".to_string()),
            columns: vec!["CustomerId".to_string()],
            referenced_schema: None,
            referenced_table: "Customers".to_string(),
            referenced_columns: vec!["Id".to_string()],
            is_enabled: true,
        },
        ForeignKeyDescriptor {
            name: Some("FK_Orders_Regions".to_string()),
            columns: vec!["RegionId".to_string()],
            referenced_schema: Some("geo".to_string()),
            referenced_table: "Regions".to_string(),
            referenced_columns: vec!["Id".to_string()],
            is_enabled: true,
        },
    ];

    SchemaSnapshot {
        snapshot_version: rowsmith_core::SNAPSHOT_VERSION.to_string(),
        database: Some("Shop".to_string()),
        tables: vec![orders],
    }
}

#[tokio::test]
async fn fk_columns_draw_from_sampled_parents() {
    let snapshot = orders_snapshot();
    let source = MemorySampleSource::new().with_column(
        "dbo",
        "Customers",
        "Id",
        vec![
            GeneratedValue::Int(10),
            GeneratedValue::Int(20),
            GeneratedValue::Int(30),
        ],
    );
    let engine = GenerationEngine::new(GenerationConfig {
        null_probability: 0.3,
        ..config(60)
    });

    let output = engine
        .run(&snapshot, "dbo", "orders", &source)
        .await
        .expect("generate script");

    let allowed: HashSet<&str> = ["10", "20", "30"].into_iter().collect();
    let script = output.script.render();
    let mut seen_customer = false;
    for line in inserts(&script) {
        let values = literals(line);
        if values[0] != "NULL" {
            assert!(allowed.contains(values[0]), "{line}");
            seen_customer = true;
        }
        // Regions has no parent rows, so the column is NULL even though it is NOT NULL.
        assert_eq!(values[1], "NULL");
        assert_ne!(values[2], "NULL");
    }
    assert!(seen_customer);
    assert_eq!(output.report.fk_cached_columns, vec!["CustomerId", "RegionId"]);
    assert_eq!(output.report.empty_fk_columns, vec!["RegionId"]);
    assert_eq!(output.report.rows_generated, 60);
    assert_eq!(output.report.total_values(), 180);
}

#[tokio::test]
async fn missing_table_is_fatal() {
    let snapshot = orders_snapshot();
    let err = GenerationEngine::new(config(1))
        .run(&snapshot, "dbo", "Invoices", &MemorySampleSource::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Schema(rowsmith_core::Error::NotFound { .. })
    ));
    assert_eq!(err.to_string(), "table [dbo].[Invoices] not found");
}

#[tokio::test]
async fn invalid_null_probability_is_rejected() {
    let snapshot = orders_snapshot();
    let engine = GenerationEngine::new(GenerationConfig {
        null_probability: -0.5,
        ..config(1)
    });
    let err = engine
        .run(&snapshot, "dbo", "Orders", &MemorySampleSource::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::InvalidConfig(_)));
}

struct Unreachable;

struct BrokenConnection;

#[async_trait]
impl SampleSource for Unreachable {
    async fn connect(&self) -> Result<Box<dyn SampleConnection>, GenerationError> {
        Err(GenerationError::Connection {
            message: "login timeout".to_string(),
        })
    }
}

struct FlakySource;

#[async_trait]
impl SampleSource for FlakySource {
    async fn connect(&self) -> Result<Box<dyn SampleConnection>, GenerationError> {
        Ok(Box::new(BrokenConnection))
    }
}

#[async_trait]
impl SampleConnection for BrokenConnection {
    async fn fetch_scalars(
        &mut self,
        _query: &SampleQuery,
    ) -> Result<Vec<GeneratedValue>, GenerationError> {
        Err(GenerationError::Connection {
            message: "transport closed".to_string(),
        })
    }

    async fn close(&mut self) -> Result<(), GenerationError> {
        Ok(())
    }
}

#[tokio::test]
async fn unreachable_source_aborts_the_run() {
    let snapshot = orders_snapshot();
    let err = GenerationEngine::new(config(5))
        .run(&snapshot, "dbo", "Orders", &Unreachable)
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        GenerationError::SourceUnavailable { schema, table, .. }
            if schema == "dbo" && table == "Orders"
    ));
    assert!(err.to_string().contains("login timeout"));
}

#[tokio::test]
async fn sampling_failure_aborts_the_run() {
    let snapshot = orders_snapshot();
    let err = GenerationEngine::new(config(5))
        .run(&snapshot, "dbo", "Orders", &FlakySource)
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        GenerationError::Sampling { table, column, .. }
            if table == "Customers" && column == "Id"
    ));
}
