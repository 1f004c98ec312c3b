//! Raw column values as returned by the driver.

use super::LobValue;
use chrono::NaiveDateTime;
use std::fmt;

/// Oracle value enum representing a single column value on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleValue {
    /// NULL value.
    Null,
    /// String value (VARCHAR2, CHAR, etc.).
    String(String),
    /// Number value as string (preserves precision).
    Number(String),
    /// DATE value (second precision).
    Date(NaiveDateTime),
    /// TIMESTAMP value (fractional seconds preserved).
    Timestamp(NaiveDateTime),
    /// CLOB / NCLOB value.
    Clob(LobValue),
    /// BLOB value.
    Blob(LobValue),
    /// Raw binary value (RAW type).
    Raw(Vec<u8>),
}

impl OracleValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, OracleValue::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OracleValue::String(s) | OracleValue::Number(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to i64.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            OracleValue::Number(s) | OracleValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a NaiveDateTime.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            OracleValue::Date(dt) | OracleValue::Timestamp(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Try to get the value as a LOB.
    pub fn as_lob(&self) -> Option<&LobValue> {
        match self {
            OracleValue::Clob(lob) | OracleValue::Blob(lob) => Some(lob),
            _ => None,
        }
    }
}

impl fmt::Display for OracleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleValue::Null => write!(f, "NULL"),
            OracleValue::String(s) => write!(f, "{}", s),
            OracleValue::Number(n) => write!(f, "{}", n),
            OracleValue::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            OracleValue::Timestamp(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.6f")),
            OracleValue::Clob(lob) => write!(f, "<CLOB: {} chars>", lob.size()),
            OracleValue::Blob(lob) => write!(f, "<BLOB: {} bytes>", lob.size()),
            OracleValue::Raw(bytes) => write!(f, "<RAW: {} bytes>", bytes.len()),
        }
    }
}
