//! Native column type to [`LogicalType`] classification.
//!
//! A fixed rule chain, first match wins:
//! 1. per-column override from the registry
//! 2. boolean emulation (NUMBER(1), and 'Y'/'N' strings when enabled)
//! 3. numbers: scale 0 is integer, id-named columns optionally integer
//! 4. DATE as date or datetime
//! 5. TIMESTAMP
//! 6. LOBs and LONG types
//! 7. everything else by storage class

use crate::config::EmulationFlags;
use crate::schema::TypeOverrideRegistry;
use crate::types::OracleType;

use super::LogicalType;

/// Whether `name` is `id` or ends in `_id`.
pub fn is_id_column_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "id" || lower.ends_with("_id")
}

/// Whether `name` has a `date` segment between underscores or at either end.
pub fn is_date_column_name(name: &str) -> bool {
    name.to_ascii_lowercase().split('_').any(|part| part == "date")
}

fn is_boolean_string_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with("_flag") || lower.ends_with("_yn")
}

/// Classify a column, consulting the registry first.
pub fn classify(
    native_type: &str,
    column_name: &str,
    table_name: &str,
    overrides: &TypeOverrideRegistry,
    flags: &EmulationFlags,
) -> LogicalType {
    overrides
        .type_for(table_name, column_name)
        .unwrap_or_else(|| classify_native(&OracleType::parse(native_type), column_name, flags))
}

/// The rule chain without overrides.
pub fn classify_native(
    native: &OracleType,
    column_name: &str,
    flags: &EmulationFlags,
) -> LogicalType {
    if is_emulated_boolean(native, column_name, flags) {
        return LogicalType::Boolean;
    }

    match native {
        OracleType::Integer => LogicalType::Integer,
        OracleType::Number { precision, scale } => {
            let whole = match scale {
                Some(scale) => *scale == 0,
                None => precision.is_some(),
            };
            if whole || (flags.emulate_integers_by_column_name && is_id_column_name(column_name)) {
                LogicalType::Integer
            } else {
                LogicalType::Decimal
            }
        }
        OracleType::Float { .. } | OracleType::BinaryFloat | OracleType::BinaryDouble => {
            if flags.emulate_integers_by_column_name && is_id_column_name(column_name) {
                LogicalType::Integer
            } else {
                LogicalType::Float
            }
        }
        OracleType::Date => {
            if flags.emulate_dates_by_column_name && is_date_column_name(column_name) {
                LogicalType::Date
            } else {
                LogicalType::DateTime
            }
        }
        OracleType::Timestamp { .. } => LogicalType::Timestamp,
        OracleType::Clob | OracleType::Nclob | OracleType::Long => LogicalType::Text,
        OracleType::Blob | OracleType::LongRaw | OracleType::Raw { .. } => LogicalType::Binary,
        _ => LogicalType::String,
    }
}

fn is_emulated_boolean(native: &OracleType, column_name: &str, flags: &EmulationFlags) -> bool {
    if flags.emulate_booleans {
        if let OracleType::Number {
            precision: Some(1),
            scale: None | Some(0),
        } = native
        {
            return true;
        }
    }
    if flags.emulate_booleans_from_strings {
        return match native {
            OracleType::Char { max_size: Some(1) } | OracleType::Varchar2 { max_size: Some(1) } => {
                true
            }
            OracleType::Varchar2 { .. } => is_boolean_string_name(column_name),
            _ => false,
        };
    }
    false
}
