//! Type-driven value synthesis.
//!
//! One branch per [`SqlType`] tag, each drawing from a domain that fits the
//! column. Every draw comes from the caller's RNG so a fixed seed replays the
//! same values.

pub mod json;
pub mod text;

use std::str::FromStr;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, Utc,
};
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use rowsmith_core::{ColumnDescriptor, SqlType};

use self::json::{synthesize_json, synthesize_json_within};
use self::text::{random_bytes, random_string};

/// Precision assumed for `decimal`/`numeric` columns without one.
pub const DEFAULT_PRECISION: u8 = 18;
/// Scale ceiling used when a decimal column has no declared scale.
pub const DEFAULT_SCALE_CAP: u8 = 4;
/// Largest scale representable by [`Decimal`].
const MAX_DECIMAL_DIGITS: u32 = 28;

/// Length assumed for `(max)` columns.
pub const UNBOUNDED_LENGTH: usize = 256;
const SHORT_TEXT_CAP: usize = 32;
const LARGE_TEXT_MIN: usize = 64;
const LARGE_TEXT_MAX: usize = 256;
const BINARY_CAP: usize = 16;
const XML_BODY_LEN: usize = 24;
const FALLBACK_TEXT_LEN: usize = 12;

const BIGINT_MIN: i64 = -9_000_000_000;
const BIGINT_MAX: i64 = 9_000_000_000;
/// Money draws are whole ten-thousandths in `[-100_000, 100_000)`.
const MONEY_UNITS: i64 = 1_000_000_000;
const FLOAT_MAGNITUDE: f64 = 1_000_000.0;
const MAX_OFFSET_HOURS: i32 = 12;

/// Generated value for a column, prior to rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Time(NaiveTime),
    Guid(Uuid),
    Text(String),
    Binary(Vec<u8>),
    Json(String),
}

impl GeneratedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, GeneratedValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) | GeneratedValue::Json(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Map a JSON scalar (as read from a sample source) onto a value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => GeneratedValue::Null,
            serde_json::Value::Bool(value) => GeneratedValue::Bool(*value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => GeneratedValue::Int(value),
                None => exact_number(number),
            },
            serde_json::Value::String(value) => GeneratedValue::Text(value.clone()),
            other => GeneratedValue::Json(other.to_string()),
        }
    }
}

/// Numbers outside `i64` keep their exact digits as a [`Decimal`]; only
/// values `Decimal` cannot hold fall back to `f64`.
fn exact_number(number: &serde_json::Number) -> GeneratedValue {
    let text = number.to_string();
    match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        Ok(value) => GeneratedValue::Decimal(value),
        Err(_) => GeneratedValue::Float(number.as_f64().unwrap_or_default()),
    }
}

/// Synthesizes one value per column from the column's type tag.
#[derive(Debug, Clone)]
pub struct ValueSynthesizer {
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
}

impl ValueSynthesizer {
    /// Date/time values fall between 2005-01-01 and `window_end`.
    pub fn new(window_end: NaiveDateTime) -> Self {
        let window_start = NaiveDate::from_ymd_opt(2005, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self {
            window_start,
            window_end: window_end.max(window_start),
        }
    }

    /// Produce a value for `column`.
    ///
    /// `json_constrained` replaces the character/text path with a JSON document,
    /// trimmed to the declared length of bounded character columns.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        column: &ColumnDescriptor,
        json_constrained: bool,
        rng: &mut R,
    ) -> GeneratedValue {
        if json_constrained && column.sql_type.is_textual() {
            let document = if column.sql_type.is_large_text() || column.is_unbounded() {
                synthesize_json(rng)
            } else {
                synthesize_json_within(rng, effective_max_length(column))
            };
            return GeneratedValue::Json(document);
        }

        match &column.sql_type {
            SqlType::Bit => GeneratedValue::Bool(rng.random_bool(0.5)),
            SqlType::TinyInt => GeneratedValue::Int(rng.random_range(0..=255)),
            SqlType::SmallInt => {
                GeneratedValue::Int(rng.random_range(i64::from(i16::MIN)..i64::from(i16::MAX)))
            }
            SqlType::Int => GeneratedValue::Int(
                rng.random_range(i64::from(i32::MIN / 2)..i64::from(i32::MAX / 2)),
            ),
            SqlType::BigInt => GeneratedValue::Int(bigint(rng)),
            SqlType::Decimal | SqlType::Numeric => {
                GeneratedValue::Decimal(decimal(column.precision, column.scale, rng))
            }
            SqlType::Money | SqlType::SmallMoney => GeneratedValue::Decimal(Decimal::new(
                rng.random_range(-MONEY_UNITS..MONEY_UNITS),
                4,
            )),
            SqlType::Float | SqlType::Real => {
                let magnitude = rng.random::<f64>() * FLOAT_MAGNITUDE;
                let sign = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
                GeneratedValue::Float(magnitude * sign)
            }
            SqlType::Date => GeneratedValue::Date(self.date(rng)),
            SqlType::DateTime | SqlType::SmallDateTime | SqlType::DateTime2 => {
                GeneratedValue::DateTime(self.datetime(rng))
            }
            SqlType::DateTimeOffset => {
                let local = self.datetime(rng);
                let hours = rng.random_range(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS);
                GeneratedValue::DateTimeOffset(with_offset(local, hours))
            }
            SqlType::Time => {
                let seconds = rng.random_range(0..86_400);
                GeneratedValue::Time(
                    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
                        .unwrap_or(NaiveTime::MIN),
                )
            }
            SqlType::UniqueIdentifier => GeneratedValue::Guid(random_guid(rng)),
            SqlType::Char | SqlType::VarChar | SqlType::NChar | SqlType::NVarChar => {
                let max = effective_max_length(column);
                let len = rng.random_range(1..=max.min(SHORT_TEXT_CAP));
                GeneratedValue::Text(random_string(rng, len))
            }
            SqlType::Text | SqlType::NText => {
                let len = rng.random_range(LARGE_TEXT_MIN..LARGE_TEXT_MAX);
                GeneratedValue::Text(random_string(rng, len))
            }
            SqlType::Binary | SqlType::VarBinary | SqlType::Image => {
                let len = effective_max_length(column).min(BINARY_CAP);
                GeneratedValue::Binary(random_bytes(rng, len))
            }
            SqlType::Xml => {
                let id = random_guid(rng);
                let body = random_string(rng, XML_BODY_LEN);
                GeneratedValue::Text(format!(r#"<note id="{id}"><body>{body}</body></note>"#))
            }
            SqlType::Other(_) => GeneratedValue::Text(random_string(rng, FALLBACK_TEXT_LEN)),
        }
    }

    fn date<R: Rng + ?Sized>(&self, rng: &mut R) -> NaiveDate {
        let start = self.window_start.date();
        let span = (self.window_end.date() - start).num_days().max(0);
        let offset = rng.random_range(0..=span);
        start
            .checked_add_signed(TimeDelta::days(offset))
            .unwrap_or(start)
    }

    fn datetime<R: Rng + ?Sized>(&self, rng: &mut R) -> NaiveDateTime {
        let span = (self.window_end - self.window_start)
            .num_milliseconds()
            .max(0);
        let offset = rng.random_range(0..=span);
        self.window_start
            .checked_add_signed(TimeDelta::milliseconds(offset))
            .unwrap_or(self.window_start)
    }
}

/// Declared length, with `(max)` treated as [`UNBOUNDED_LENGTH`]; never below 1.
pub fn effective_max_length(column: &ColumnDescriptor) -> usize {
    if column.is_unbounded() {
        UNBOUNDED_LENGTH
    } else {
        usize::try_from(column.max_length).unwrap_or(1).max(1)
    }
}

/// Resolved `(precision, scale)` for a decimal column.
pub fn decimal_shape(precision: Option<u8>, scale: Option<u8>) -> (u32, u32) {
    let precision = u32::from(precision.filter(|p| *p > 0).unwrap_or(DEFAULT_PRECISION));
    let scale = scale
        .map(u32::from)
        .unwrap_or_else(|| precision.min(u32::from(DEFAULT_SCALE_CAP)))
        .min(precision);
    (precision, scale)
}

fn decimal<R: Rng + ?Sized>(precision: Option<u8>, scale: Option<u8>, rng: &mut R) -> Decimal {
    let (precision, scale) = decimal_shape(precision, scale);
    let scale = scale.min(MAX_DECIMAL_DIGITS);
    let int_width = (precision - scale.min(precision)).min(MAX_DECIMAL_DIGITS - scale);

    // The whole part stays within i32 even when the width would allow more.
    let whole_max = if int_width == 0 {
        0
    } else {
        (10_i64.pow(int_width.min(10)) - 1).min(i64::from(i32::MAX))
    };
    let whole = rng.random_range(0..=whole_max);

    let frac_bound = 10_i128.pow(scale);
    let frac = if scale == 0 {
        0
    } else {
        rng.random_range(0..frac_bound)
    };

    let mut mantissa = i128::from(whole) * frac_bound + frac;
    if rng.random_bool(0.5) {
        mantissa = -mantissa;
    }
    Decimal::from_i128_with_scale(mantissa, scale)
}

fn bigint<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    let raw = rng.random::<u64>() & (i64::MAX as u64);
    let range = (BIGINT_MAX - BIGINT_MIN) as u64 + 1;
    BIGINT_MIN + (raw % range) as i64
}

fn with_offset(local: NaiveDateTime, hours: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix());
    match local.and_local_timezone(offset).single() {
        Some(value) => value,
        None => DateTime::from_naive_utc_and_offset(local, offset),
    }
}

fn random_guid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let bytes: [u8; 16] = rng.random();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}
