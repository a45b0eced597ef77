use rowsmith_core::SchemaSnapshot;
use schemars::schema_for;

#[test]
fn json_schema_describes_snapshot_fields() {
    let generated = schema_for!(SchemaSnapshot);
    let json = serde_json::to_value(&generated).expect("serialize generated schema");

    let properties = json
        .get("properties")
        .and_then(|value| value.as_object())
        .expect("top-level properties");
    assert!(properties.contains_key("snapshot_version"));
    assert!(properties.contains_key("tables"));

    let column = json
        .pointer("/definitions/ColumnDescriptor/properties/sql_type/type")
        .and_then(|value| value.as_str())
        .expect("sql_type schema");
    assert_eq!(column, "string");
}
