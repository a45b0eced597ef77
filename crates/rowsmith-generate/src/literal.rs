use crate::generators::GeneratedValue;

/// Render a value as a T-SQL literal.
///
/// Total over every [`GeneratedValue`]; string content is always quoted
/// with embedded `'` doubled.
pub fn render(value: &GeneratedValue) -> String {
    match value {
        GeneratedValue::Null => "NULL".to_string(),
        GeneratedValue::Bool(value) => String::from(if *value { "1" } else { "0" }),
        GeneratedValue::Int(value) => value.to_string(),
        GeneratedValue::Decimal(value) => value.to_string(),
        GeneratedValue::Float(value) => render_float(*value),
        GeneratedValue::Guid(value) => format!("'{}'", value.hyphenated()),
        GeneratedValue::Date(value) => format!("'{}'", value.format("%Y-%m-%d")),
        GeneratedValue::DateTime(value) => {
            format!("'{}'", value.format("%Y-%m-%dT%H:%M:%S%.3f"))
        }
        GeneratedValue::DateTimeOffset(value) => format!(
            "'{}.{}{}'",
            value.format("%Y-%m-%dT%H:%M:%S"),
            seven_digit_fraction(value.timestamp_subsec_nanos()),
            value.format("%:z")
        ),
        GeneratedValue::Time(value) => format!(
            "'{}.{}'",
            value.format("%H:%M:%S"),
            seven_digit_fraction(chrono::Timelike::nanosecond(value))
        ),
        GeneratedValue::Binary(bytes) => format!("0x{}", hex::encode_upper(bytes)),
        GeneratedValue::Text(value) | GeneratedValue::Json(value) => quote_unicode(value),
    }
}

/// `N'...'` literal with embedded quotes doubled.
pub fn quote_unicode(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

fn render_float(value: f64) -> String {
    if value.is_finite() {
        // Display for f64 is the shortest string that parses back to the same value.
        value.to_string()
    } else {
        "NULL".to_string()
    }
}

/// SQL Server's `time`/`datetimeoffset` carry 100ns ticks.
fn seven_digit_fraction(nanos: u32) -> String {
    format!("{:07}", (nanos % 1_000_000_000) / 100)
}
