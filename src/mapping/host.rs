use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::types::{bytes_to_string, LobValue};

/// A decoded column value, or a value to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    Float(f64),
    String(String),
    Binary(Bytes),
    /// Date without time of day.
    Date(NaiveDate),
    /// Point in time in the configured zone.
    Time(DateTime<FixedOffset>),
    /// Calendar value outside the zoned range (before the Gregorian reform,
    /// or not representable in the configured zone), kept as written.
    Civil(NaiveDateTime),
    /// LOB handle whose content was not materialized.
    Lob(LobValue),
    /// Structured attribute stored as YAML in a text column.
    Serialized(serde_json::Value),
}

impl HostValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Wall-clock value of any date/time variant.
    pub fn as_naive_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(d) => d.and_hms_opt(0, 0, 0),
            Self::Time(t) => Some(t.naive_local()),
            Self::Civil(c) => Some(*c),
            _ => None,
        }
    }

    /// Bytes to stream into a LOB, with serialized values rendered as YAML.
    ///
    /// `None` for NULL, empty content and values that are not LOB-shaped.
    pub fn lob_payload(&self) -> Result<Option<Bytes>> {
        let payload = match self {
            Self::String(s) => Bytes::from(s.clone().into_bytes()),
            Self::Binary(b) => b.clone(),
            Self::Serialized(value) => Bytes::from(serde_yaml::to_string(value)?.into_bytes()),
            _ => return Ok(None),
        };
        Ok(Some(payload).filter(|p| !p.is_empty()))
    }

    /// Text content, decoding LOB data when prefetched.
    pub fn to_text(&self) -> Option<Result<String>> {
        match self {
            Self::String(s) => Some(Ok(s.clone())),
            Self::Binary(b) => Some(bytes_to_string(b)),
            Self::Lob(lob) => lob.as_string(),
            _ => None,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.f %:z")),
            Self::Civil(c) => write!(f, "{}", c.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::Lob(lob) => write!(f, "<{:?} LOB, {} bytes>", lob.kind(), lob.size()),
            Self::Serialized(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Decimal> for HostValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(value))
    }
}

impl From<NaiveDate> for HostValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for HostValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Time(value)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
