//! Conversion between driver values, host values and SQL literals.
//!
//! Date and time literals always go through `TO_DATE` / `TO_TIMESTAMP` with
//! an explicit format, so they never depend on the session's NLS settings.

use std::str::FromStr;

use bytes::Bytes;
use chrono::{
    DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::type_mapper::is_id_column_name;
use super::{HostValue, LogicalType};
use crate::config::{DefaultTimezone, EmulationFlags};
use crate::error::{Error, Result};
use crate::sql::quote_string;
use crate::types::{LobKind, LobValue, OracleValue};

/// Access label marking a query whose LOB locators will be written to.
pub const WRITE_LOB_LABEL: &str = "Writable Large Object";

/// Pattern of the `TO_DATE` literal.
pub const DATE_LITERAL_FORMAT: &str = "YYYY-MM-DD HH24:MI:SS";
/// Pattern of the `TO_TIMESTAMP` literal.
pub const TIMESTAMP_LITERAL_FORMAT: &str = "YYYY-MM-DD HH24:MI:SS:FF6";

const CHRONO_DATE_LITERAL: &str = "%Y-%m-%d %H:%M:%S";
const CHRONO_TIMESTAMP_LITERAL: &str = "%Y-%m-%d %H:%M:%S:%6f";

/// First day of the Gregorian calendar.
const GREGORIAN_REFORM: (i32, u32, u32) = (1582, 10, 15);

/// Decode a driver value into the host representation of `logical`.
///
/// LOB values with prefetched content are materialized; locator-only LOBs
/// come back as [`HostValue::Lob`] for the caller to read.
pub fn decode(
    raw: &OracleValue,
    logical: LogicalType,
    column_name: &str,
    flags: &EmulationFlags,
) -> Result<HostValue> {
    match raw {
        OracleValue::Null => Ok(HostValue::Null),
        OracleValue::Clob(lob) | OracleValue::Blob(lob) => decode_lob(lob, false),
        OracleValue::Raw(bytes) => Ok(HostValue::Binary(Bytes::from(bytes.clone()))),
        OracleValue::Date(dt) | OracleValue::Timestamp(dt) => Ok(decode_datetime(*dt, logical, flags)),
        OracleValue::String(s) | OracleValue::Number(s) => match logical {
            LogicalType::Boolean => decode_boolean(s),
            LogicalType::Integer | LogicalType::Decimal | LogicalType::Float => {
                decode_number(s, logical, column_name, flags)
            }
            LogicalType::Date | LogicalType::DateTime | LogicalType::Timestamp => {
                let dt = parse_datetime_text(s).ok_or_else(|| {
                    Error::type_conversion(format!("'{s}' is not a valid date/time"))
                })?;
                Ok(decode_datetime(dt, logical, flags))
            }
            LogicalType::Binary => Ok(HostValue::Binary(Bytes::from(s.clone().into_bytes()))),
            LogicalType::String | LogicalType::Text => Ok(HostValue::String(s.clone())),
        },
    }
}

/// Decode a LOB column value.
///
/// With `write_intent` the handle is returned as is, even when content was
/// prefetched, so the caller can write through the locator.
pub fn decode_lob(lob: &LobValue, write_intent: bool) -> Result<HostValue> {
    if write_intent {
        return Ok(HostValue::Lob(lob.clone()));
    }
    match &lob.data {
        None => Ok(HostValue::Lob(lob.clone())),
        Some(data) if lob.kind().is_character() => {
            Ok(HostValue::String(crate::types::bytes_to_string(data)?))
        }
        Some(data) => Ok(HostValue::Binary(data.clone())),
    }
}

/// Build the host value for LOB content read through a locator.
pub fn lob_content(kind: LobKind, data: Bytes) -> Result<HostValue> {
    if kind.is_character() {
        Ok(HostValue::String(crate::types::bytes_to_string(&data)?))
    } else {
        Ok(HostValue::Binary(data))
    }
}

fn decode_boolean(text: &str) -> Result<HostValue> {
    match text.trim() {
        "Y" | "y" => Ok(HostValue::Boolean(true)),
        "N" | "n" => Ok(HostValue::Boolean(false)),
        other => {
            let number = parse_decimal(other)?;
            Ok(HostValue::Boolean(!number.is_zero()))
        }
    }
}

fn parse_decimal(text: &str) -> Result<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| Error::type_conversion(format!("'{text}' is not a number: {e}")))
}

fn decode_number(
    text: &str,
    logical: LogicalType,
    column_name: &str,
    flags: &EmulationFlags,
) -> Result<HostValue> {
    let truncate = logical == LogicalType::Integer
        || (flags.emulate_integers_by_column_name && is_id_column_name(column_name));

    if logical == LogicalType::Float {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|e| Error::type_conversion(format!("'{text}' is not a number: {e}")))?;
        if truncate || value.fract() == 0.0 {
            if let Some(i) = value.trunc().to_i64() {
                return Ok(HostValue::Integer(i));
            }
        }
        return Ok(HostValue::Float(value));
    }

    let value = match parse_decimal(text) {
        Ok(value) => value,
        // NUMBER(38) integers past the decimal range are kept as their digits.
        Err(_) if is_integer_literal(text) => {
            return Ok(HostValue::String(text.trim().to_string()));
        }
        Err(e) => return Err(e),
    };
    if truncate || value.fract().is_zero() {
        let whole = value.trunc();
        return Ok(whole
            .to_i64()
            .map_or(HostValue::Decimal(whole), HostValue::Integer));
    }
    Ok(HostValue::Decimal(value))
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.trim().trim_start_matches(['-', '+']);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Decode a DATE / TIMESTAMP value.
///
/// Date columns and, with `emulate_dates`, midnight values become dates;
/// everything else is zoned in the configured time zone.
pub fn decode_datetime(dt: NaiveDateTime, logical: LogicalType, flags: &EmulationFlags) -> HostValue {
    let midnight = dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0;
    if logical == LogicalType::Date
        || (flags.emulate_dates && midnight && logical != LogicalType::Timestamp)
    {
        return HostValue::Date(dt.date());
    }
    zoned(dt, flags.default_timezone)
}

/// Attach the configured zone, falling back to the civil value for dates
/// before the Gregorian reform or wall-clock times the zone skips.
fn zoned(dt: NaiveDateTime, timezone: DefaultTimezone) -> HostValue {
    let date = dt.date();
    if (date.year(), date.month(), date.day()) < GREGORIAN_REFORM {
        return HostValue::Civil(dt);
    }
    let zoned = match timezone {
        DefaultTimezone::Utc => Some(Utc.from_utc_datetime(&dt).fixed_offset()),
        DefaultTimezone::Local => Local
            .from_local_datetime(&dt)
            .earliest()
            .map(|t| t.fixed_offset()),
    };
    zoned.map_or(HostValue::Civil(dt), HostValue::Time)
}

/// Wall-clock value in the configured zone.
fn wall_clock(value: &HostValue, timezone: DefaultTimezone) -> Option<NaiveDateTime> {
    match value {
        HostValue::Time(t) => Some(match timezone {
            DefaultTimezone::Utc => t.naive_utc(),
            DefaultTimezone::Local => t.with_timezone(&Local).naive_local(),
        }),
        other => other.as_naive_datetime(),
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", CHRONO_TIMESTAMP_LITERAL]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|t| t.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `TO_DATE` literal for a date or time value.
pub fn date_literal(dt: NaiveDateTime) -> String {
    format!(
        "TO_DATE('{}','{DATE_LITERAL_FORMAT}')",
        dt.format(CHRONO_DATE_LITERAL)
    )
}

/// `TO_TIMESTAMP` literal with six fractional digits.
pub fn timestamp_literal(dt: NaiveDateTime) -> String {
    format!(
        "TO_TIMESTAMP('{}','{TIMESTAMP_LITERAL_FORMAT}')",
        dt.format(CHRONO_TIMESTAMP_LITERAL)
    )
}

fn hex_literal(bytes: &[u8]) -> String {
    let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
    format!("HEXTORAW('{hex}')")
}

/// Encode a value as an SQL fragment.
///
/// `logical` is the target column's type when known. Non-null values bound
/// for text and binary LOB columns become `EMPTY_CLOB()` / `EMPTY_BLOB()`;
/// their content is written afterwards through the locator.
pub fn encode(value: &HostValue, logical: Option<LogicalType>, flags: &EmulationFlags) -> Result<String> {
    if value.is_null() {
        return Ok("NULL".to_string());
    }
    match logical {
        Some(LogicalType::Text) => return Ok("EMPTY_CLOB()".to_string()),
        Some(LogicalType::Binary) => return Ok("EMPTY_BLOB()".to_string()),
        _ => {}
    }
    let timestamp = logical == Some(LogicalType::Timestamp);

    Ok(match value {
        HostValue::Null => "NULL".to_string(),
        HostValue::Boolean(b) => match (flags.emulate_booleans_from_strings, b) {
            (true, true) => "'Y'".to_string(),
            (true, false) => "'N'".to_string(),
            (false, true) => "1".to_string(),
            (false, false) => "0".to_string(),
        },
        HostValue::Integer(i) => i.to_string(),
        HostValue::Decimal(d) => d.to_string(),
        HostValue::Float(f) if f.is_finite() => f.to_string(),
        HostValue::Float(f) => {
            return Err(Error::type_conversion(format!("{f} has no SQL literal")))
        }
        HostValue::String(s) => quote_string(s),
        HostValue::Binary(b) => hex_literal(b),
        HostValue::Date(_) | HostValue::Time(_) | HostValue::Civil(_) => {
            let dt = wall_clock(value, flags.default_timezone).ok_or_else(|| {
                Error::type_conversion(format!("{value} has no wall-clock time"))
            })?;
            let fractional = dt.nanosecond() != 0 && logical.is_none();
            if timestamp || fractional {
                timestamp_literal(dt)
            } else {
                date_literal(dt)
            }
        }
        HostValue::Lob(lob) if lob.kind().is_character() => "EMPTY_CLOB()".to_string(),
        HostValue::Lob(_) => "EMPTY_BLOB()".to_string(),
        HostValue::Serialized(v) => quote_string(&serde_yaml::to_string(v)?),
    })
}

/// Parse caller-supplied text into the host value for `logical`.
///
/// Dates and times try the configured chrono patterns first, then ISO
/// forms. Blank text is NULL for every type except strings.
pub fn cast_str(text: &str, logical: LogicalType, flags: &EmulationFlags) -> Result<HostValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() && !matches!(logical, LogicalType::String | LogicalType::Text) {
        return Ok(HostValue::Null);
    }
    let invalid = || Error::type_conversion(format!("'{text}' is not a valid {logical}"));

    match logical {
        LogicalType::String | LogicalType::Text => Ok(HostValue::String(text.to_string())),
        LogicalType::Binary => Ok(HostValue::Binary(Bytes::from(text.as_bytes().to_vec()))),
        LogicalType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "1" | "t" | "true" | "y" | "yes" | "on" => Ok(HostValue::Boolean(true)),
            "0" | "f" | "false" | "n" | "no" | "off" => Ok(HostValue::Boolean(false)),
            _ => Err(invalid()),
        },
        LogicalType::Integer => {
            let value = parse_decimal(trimmed)?;
            value.trunc().to_i64().map(HostValue::Integer).ok_or_else(invalid)
        }
        LogicalType::Decimal => parse_decimal(trimmed).map(HostValue::Decimal),
        LogicalType::Float => trimmed.parse().map(HostValue::Float).map_err(|_| invalid()),
        LogicalType::Date => {
            let configured = flags.string_to_date_format.as_deref().and_then(|fmt| {
                NaiveDate::parse_from_str(trimmed, fmt)
                    .ok()
                    .or_else(|| NaiveDateTime::parse_from_str(trimmed, fmt).ok().map(|dt| dt.date()))
            });
            configured
                .or_else(|| parse_datetime_text(trimmed).map(|dt| dt.date()))
                .map(HostValue::Date)
                .ok_or_else(invalid)
        }
        LogicalType::DateTime | LogicalType::Timestamp => {
            if let Ok(t) = DateTime::parse_from_rfc3339(trimmed) {
                return Ok(HostValue::Time(t));
            }
            let configured = flags
                .string_to_time_format
                .as_deref()
                .and_then(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok());
            configured
                .or_else(|| parse_datetime_text(trimmed))
                .map(|dt| zoned(dt, flags.default_timezone))
                .ok_or_else(invalid)
        }
    }
}
