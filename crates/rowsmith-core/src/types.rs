use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// SQL Server data type tag for a column.
///
/// Parsing is total: unrecognized names are kept as [`SqlType::Other`] so
/// that snapshots from newer servers still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal,
    Numeric,
    Money,
    SmallMoney,
    Float,
    Real,
    Date,
    DateTime,
    SmallDateTime,
    DateTime2,
    DateTimeOffset,
    Time,
    UniqueIdentifier,
    Char,
    VarChar,
    NChar,
    NVarChar,
    Text,
    NText,
    Binary,
    VarBinary,
    Image,
    Xml,
    Other(String),
}

impl SqlType {
    /// Canonical lower-case type name.
    pub fn name(&self) -> &str {
        match self {
            SqlType::Bit => "bit",
            SqlType::TinyInt => "tinyint",
            SqlType::SmallInt => "smallint",
            SqlType::Int => "int",
            SqlType::BigInt => "bigint",
            SqlType::Decimal => "decimal",
            SqlType::Numeric => "numeric",
            SqlType::Money => "money",
            SqlType::SmallMoney => "smallmoney",
            SqlType::Float => "float",
            SqlType::Real => "real",
            SqlType::Date => "date",
            SqlType::DateTime => "datetime",
            SqlType::SmallDateTime => "smalldatetime",
            SqlType::DateTime2 => "datetime2",
            SqlType::DateTimeOffset => "datetimeoffset",
            SqlType::Time => "time",
            SqlType::UniqueIdentifier => "uniqueidentifier",
            SqlType::Char => "char",
            SqlType::VarChar => "varchar",
            SqlType::NChar => "nchar",
            SqlType::NVarChar => "nvarchar",
            SqlType::Text => "text",
            SqlType::NText => "ntext",
            SqlType::Binary => "binary",
            SqlType::VarBinary => "varbinary",
            SqlType::Image => "image",
            SqlType::Xml => "xml",
            SqlType::Other(name) => name,
        }
    }

    /// Bounded or `(max)` character types.
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            SqlType::Char | SqlType::VarChar | SqlType::NChar | SqlType::NVarChar
        )
    }

    /// Legacy large-object text types.
    pub fn is_large_text(&self) -> bool {
        matches!(self, SqlType::Text | SqlType::NText)
    }

    pub fn is_textual(&self) -> bool {
        self.is_character() || self.is_large_text()
    }
}

impl FromStr for SqlType {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lowered = raw.trim().to_lowercase();
        // `nvarchar(50)` and `nvarchar(max)` carry their length elsewhere.
        let base = match lowered.split_once('(') {
            Some((head, _)) => head.trim(),
            None => lowered.as_str(),
        };

        let parsed = match base {
            "bit" => SqlType::Bit,
            "tinyint" => SqlType::TinyInt,
            "smallint" => SqlType::SmallInt,
            "int" | "integer" => SqlType::Int,
            "bigint" => SqlType::BigInt,
            "decimal" | "dec" => SqlType::Decimal,
            "numeric" => SqlType::Numeric,
            "money" => SqlType::Money,
            "smallmoney" => SqlType::SmallMoney,
            "float" => SqlType::Float,
            "real" => SqlType::Real,
            "date" => SqlType::Date,
            "datetime" => SqlType::DateTime,
            "smalldatetime" => SqlType::SmallDateTime,
            "datetime2" => SqlType::DateTime2,
            "datetimeoffset" => SqlType::DateTimeOffset,
            "time" => SqlType::Time,
            "uniqueidentifier" => SqlType::UniqueIdentifier,
            "char" | "character" => SqlType::Char,
            "varchar" | "varcharmax" => SqlType::VarChar,
            "nchar" => SqlType::NChar,
            "nvarchar" | "nvarcharmax" | "sysname" => SqlType::NVarChar,
            "text" => SqlType::Text,
            "ntext" => SqlType::NText,
            "binary" => SqlType::Binary,
            "varbinary" | "varbinarymax" => SqlType::VarBinary,
            "image" => SqlType::Image,
            "xml" => SqlType::Xml,
            _ => SqlType::Other(base.to_string()),
        };
        Ok(parsed)
    }
}

impl From<String> for SqlType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(parsed) => parsed,
            Err(never) => match never {},
        }
    }
}

impl From<SqlType> for String {
    fn from(value: SqlType) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
