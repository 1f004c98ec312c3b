use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Host-side type a native column is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    String,
    Text,
    Integer,
    Decimal,
    Float,
    Date,
    DateTime,
    Timestamp,
    Binary,
    Boolean,
}

impl LogicalType {
    /// Name as used in schema definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Binary => "binary",
            Self::Boolean => "boolean",
        }
    }

    /// Text and binary columns are stored as LOBs.
    pub fn is_lob(&self) -> bool {
        matches!(self, Self::Text | Self::Binary)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Timestamp)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "text" => Ok(Self::Text),
            "integer" => Ok(Self::Integer),
            "decimal" => Ok(Self::Decimal),
            "float" => Ok(Self::Float),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::DateTime),
            "timestamp" => Ok(Self::Timestamp),
            "binary" => Ok(Self::Binary),
            "boolean" => Ok(Self::Boolean),
            other => Err(Error::type_conversion(format!(
                "unknown logical type '{other}'"
            ))),
        }
    }
}
