use rowsmith_core::{
    CheckConstraint, ColumnDescriptor, ForeignKeyDescriptor, SchemaSnapshot, SqlType,
    TableDescriptor,
};
use rowsmith_generate::{GeneratedValue, GenerationConfig, GenerationEngine, MemorySampleSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut id = ColumnDescriptor::new("Id", SqlType::Int);
    id.identity = true;
    id.in_primary_key = true;
    let mut note = ColumnDescriptor::new("Note", SqlType::NVarChar);
    note.max_length = 40;
    note.nullable = true;
    let mut total = ColumnDescriptor::new("Total", SqlType::Decimal);
    total.precision = Some(10);
    total.scale = Some(2);

    let orders = TableDescriptor {
        schema: "dbo".to_string(),
        name: "Orders".to_string(),
        columns: vec![
            id,
            ColumnDescriptor::new("CustomerId", SqlType::Int),
            total,
            note,
            ColumnDescriptor::new("Attributes", SqlType::NVarChar),
            ColumnDescriptor::new("PlacedAt", SqlType::DateTime2),
        ],
        checks: vec![CheckConstraint {
            name: Some("CK_Orders_Attributes".to_string()),
            text: "(isjson([Attributes])=(1))".to_string(),
        }],
        foreign_keys: vec![ForeignKeyDescriptor {
            name: Some("FK_Orders_Customers".to_string()),
            columns: vec!["CustomerId".to_string()],
            referenced_schema: None,
            referenced_table: "Customers".to_string(),
            referenced_columns: vec!["Id".to_string()],
            is_enabled: true,
        }],
    };
    let snapshot = SchemaSnapshot {
        snapshot_version: rowsmith_core::SNAPSHOT_VERSION.to_string(),
        database: None,
        tables: vec![orders],
    };

    let samples = MemorySampleSource::new().with_column(
        "dbo",
        "Customers",
        "Id",
        (1..=5).map(GeneratedValue::Int).collect(),
    );

    let engine = GenerationEngine::new(GenerationConfig {
        row_count: 5,
        ..GenerationConfig::default()
    });
    let output = engine.run(&snapshot, "dbo", "Orders", &samples).await?;

    println!("{}", output.script.render());
    eprintln!("{}", serde_json::to_string_pretty(&output.report)?);
    Ok(())
}
