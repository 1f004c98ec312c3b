//! Oracle native data types as reported by the data dictionary.
//!
//! The dictionary hands back type names such as `NUMBER(10,2)`,
//! `VARCHAR2(255)` or `TIMESTAMP(6) WITH TIME ZONE`. [`OracleType::parse`]
//! turns those strings into a structured value; [`fmt::Display`] renders
//! them back in canonical form.

use std::fmt;

/// Time zone flavour of a TIMESTAMP column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampZone {
    /// Plain TIMESTAMP.
    None,
    /// TIMESTAMP WITH TIME ZONE.
    TimeZone,
    /// TIMESTAMP WITH LOCAL TIME ZONE.
    LocalTimeZone,
}

/// Oracle data type with type-specific attributes.
///
/// Note: nullability is a column property, not a type property.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleType {
    /// VARCHAR2(n).
    Varchar2 { max_size: Option<u32> },
    /// NVARCHAR2(n).
    NVarchar2 { max_size: Option<u32> },
    /// CHAR(n).
    Char { max_size: Option<u32> },
    /// NCHAR(n).
    NChar { max_size: Option<u32> },
    /// NUMBER(p,s); `None` when the dictionary leaves it unconstrained.
    Number {
        precision: Option<u8>,
        scale: Option<i8>,
    },
    /// INTEGER / INT / SMALLINT (NUMBER(38) under the hood).
    Integer,
    /// FLOAT(p).
    Float { precision: Option<u8> },
    /// BINARY_FLOAT.
    BinaryFloat,
    /// BINARY_DOUBLE.
    BinaryDouble,
    /// DATE (second precision, no time zone).
    Date,
    /// TIMESTAMP(fsp) [WITH [LOCAL] TIME ZONE].
    Timestamp {
        fractional_precision: Option<u8>,
        zone: TimestampZone,
    },
    /// LONG - legacy large text type.
    Long,
    /// CLOB.
    Clob,
    /// NCLOB.
    Nclob,
    /// BLOB.
    Blob,
    /// RAW(n).
    Raw { max_size: Option<u32> },
    /// LONG RAW.
    LongRaw,
    /// Anything this adapter does not model (XMLTYPE, ROWID, object types).
    Other(String),
}

impl OracleType {
    /// Parse a native type string such as `NUMBER(10,2)`.
    ///
    /// Unknown names never fail; they end up in [`OracleType::Other`].
    pub fn parse(native: &str) -> Self {
        let upper = native.trim().to_uppercase();
        let (base, args) = split_arguments(&upper);
        let first = args.first().copied().flatten();
        let second = args.get(1).copied().flatten();

        match base.as_str() {
            "VARCHAR2" | "VARCHAR" => OracleType::Varchar2 { max_size: first },
            "NVARCHAR2" => OracleType::NVarchar2 { max_size: first },
            "CHAR" | "CHARACTER" => OracleType::Char { max_size: first },
            "NCHAR" => OracleType::NChar { max_size: first },
            "NUMBER" | "NUMERIC" | "DECIMAL" | "DEC" => OracleType::Number {
                precision: first.and_then(|p| u8::try_from(p).ok()),
                scale: second.and_then(|s| i8::try_from(s).ok()),
            },
            "INTEGER" | "INT" | "SMALLINT" => OracleType::Integer,
            "FLOAT" | "REAL" | "DOUBLE PRECISION" => OracleType::Float {
                precision: first.and_then(|p| u8::try_from(p).ok()),
            },
            "BINARY_FLOAT" => OracleType::BinaryFloat,
            "BINARY_DOUBLE" => OracleType::BinaryDouble,
            "DATE" => OracleType::Date,
            "LONG" => OracleType::Long,
            "CLOB" => OracleType::Clob,
            "NCLOB" => OracleType::Nclob,
            "BLOB" => OracleType::Blob,
            "RAW" => OracleType::Raw { max_size: first },
            "LONG RAW" => OracleType::LongRaw,
            _ if base.starts_with("TIMESTAMP") => {
                let zone = if upper.contains("WITH LOCAL TIME ZONE") {
                    TimestampZone::LocalTimeZone
                } else if upper.contains("WITH TIME ZONE") {
                    TimestampZone::TimeZone
                } else {
                    TimestampZone::None
                };
                OracleType::Timestamp {
                    fractional_precision: first.and_then(|p| u8::try_from(p).ok()),
                    zone,
                }
            }
            _ => OracleType::Other(upper),
        }
    }

    /// Get precision (for numeric types, `None` otherwise).
    pub fn precision(&self) -> Option<u8> {
        match self {
            OracleType::Number { precision, .. } | OracleType::Float { precision } => *precision,
            OracleType::Integer => Some(38),
            _ => None,
        }
    }

    /// Get scale (for NUMBER, `None` otherwise).
    pub fn scale(&self) -> Option<i8> {
        match self {
            OracleType::Number { scale, .. } => *scale,
            OracleType::Integer => Some(0),
            _ => None,
        }
    }

    /// Get the declared length of character and RAW types.
    pub fn max_size(&self) -> Option<u32> {
        match self {
            OracleType::Varchar2 { max_size }
            | OracleType::NVarchar2 { max_size }
            | OracleType::Char { max_size }
            | OracleType::NChar { max_size }
            | OracleType::Raw { max_size } => *max_size,
            _ => None,
        }
    }

    /// CLOB, NCLOB or BLOB.
    pub fn is_lob(&self) -> bool {
        matches!(self, OracleType::Clob | OracleType::Nclob | OracleType::Blob)
    }

    /// Character types stored inline (not LOBs).
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            OracleType::Varchar2 { .. }
                | OracleType::NVarchar2 { .. }
                | OracleType::Char { .. }
                | OracleType::NChar { .. }
        )
    }

    /// NUMBER and its aliases.
    pub fn is_number(&self) -> bool {
        matches!(self, OracleType::Number { .. } | OracleType::Integer)
    }

    /// Binary floating point types and FLOAT.
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            OracleType::Float { .. } | OracleType::BinaryFloat | OracleType::BinaryDouble
        )
    }
}

/// Split `NAME(a,b) SUFFIX` into `NAME SUFFIX` and the parsed arguments.
///
/// `*` (as in `NUMBER(*,0)`) and `CHAR`/`BYTE` qualifiers parse to `None`
/// or are ignored respectively.
fn split_arguments(upper: &str) -> (String, Vec<Option<u32>>) {
    let Some(open) = upper.find('(') else {
        return (upper.to_string(), Vec::new());
    };
    let close = upper[open..].find(')').map(|i| open + i).unwrap_or(upper.len());
    let args = upper[open + 1..close]
        .split(',')
        .map(|arg| {
            arg.split_whitespace()
                .next()
                .and_then(|token| token.parse::<u32>().ok())
        })
        .collect();

    let prefix = upper[..open].trim_end();
    let suffix = upper.get(close + 1..).unwrap_or("").trim();
    let base = if suffix.is_empty() || prefix.starts_with("TIMESTAMP") {
        prefix.to_string()
    } else {
        format!("{} {}", prefix, suffix)
    };
    (base, args)
}

impl fmt::Display for OracleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn sized(f: &mut fmt::Formatter<'_>, name: &str, size: &Option<u32>) -> fmt::Result {
            match size {
                Some(size) => write!(f, "{}({})", name, size),
                None => write!(f, "{}", name),
            }
        }

        match self {
            OracleType::Varchar2 { max_size } => sized(f, "VARCHAR2", max_size),
            OracleType::NVarchar2 { max_size } => sized(f, "NVARCHAR2", max_size),
            OracleType::Char { max_size } => sized(f, "CHAR", max_size),
            OracleType::NChar { max_size } => sized(f, "NCHAR", max_size),
            OracleType::Number { precision, scale } => match (precision, scale) {
                (None, _) => write!(f, "NUMBER"),
                (Some(p), None) => write!(f, "NUMBER({})", p),
                (Some(p), Some(s)) => write!(f, "NUMBER({},{})", p, s),
            },
            OracleType::Integer => write!(f, "INTEGER"),
            OracleType::Float { precision } => match precision {
                Some(p) => write!(f, "FLOAT({})", p),
                None => write!(f, "FLOAT"),
            },
            OracleType::BinaryFloat => write!(f, "BINARY_FLOAT"),
            OracleType::BinaryDouble => write!(f, "BINARY_DOUBLE"),
            OracleType::Date => write!(f, "DATE"),
            OracleType::Timestamp {
                fractional_precision,
                zone,
            } => {
                write!(f, "TIMESTAMP")?;
                if let Some(fsp) = fractional_precision {
                    write!(f, "({})", fsp)?;
                }
                match zone {
                    TimestampZone::None => Ok(()),
                    TimestampZone::TimeZone => write!(f, " WITH TIME ZONE"),
                    TimestampZone::LocalTimeZone => write!(f, " WITH LOCAL TIME ZONE"),
                }
            }
            OracleType::Long => write!(f, "LONG"),
            OracleType::Clob => write!(f, "CLOB"),
            OracleType::Nclob => write!(f, "NCLOB"),
            OracleType::Blob => write!(f, "BLOB"),
            OracleType::Raw { max_size } => sized(f, "RAW", max_size),
            OracleType::LongRaw => write!(f, "LONG RAW"),
            OracleType::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_varchar2() {
        assert_eq!(
            OracleType::parse("VARCHAR2(100)"),
            OracleType::Varchar2 {
                max_size: Some(100)
            }
        );
        assert_eq!(
            OracleType::parse("varchar2(20 CHAR)"),
            OracleType::Varchar2 { max_size: Some(20) }
        );
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(
            OracleType::parse("NUMBER(10,2)"),
            OracleType::Number {
                precision: Some(10),
                scale: Some(2)
            }
        );
        assert_eq!(
            OracleType::parse("NUMBER"),
            OracleType::Number {
                precision: None,
                scale: None
            }
        );
        assert_eq!(
            OracleType::parse("NUMBER(*,0)"),
            OracleType::Number {
                precision: None,
                scale: Some(0)
            }
        );
        assert_eq!(OracleType::parse("INTEGER").scale(), Some(0));
    }

    #[test]
    fn test_parse_timestamps() {
        assert_eq!(
            OracleType::parse("TIMESTAMP(6)"),
            OracleType::Timestamp {
                fractional_precision: Some(6),
                zone: TimestampZone::None
            }
        );
        assert_eq!(
            OracleType::parse("TIMESTAMP(6) WITH TIME ZONE"),
            OracleType::Timestamp {
                fractional_precision: Some(6),
                zone: TimestampZone::TimeZone
            }
        );
        assert_eq!(
            OracleType::parse("TIMESTAMP WITH LOCAL TIME ZONE"),
            OracleType::Timestamp {
                fractional_precision: None,
                zone: TimestampZone::LocalTimeZone
            }
        );
    }

    #[test]
    fn test_parse_lobs_and_other() {
        assert!(OracleType::parse("CLOB").is_lob());
        assert!(OracleType::parse("blob").is_lob());
        assert!(!OracleType::parse("LONG RAW").is_lob());
        assert_eq!(OracleType::parse("LONG RAW"), OracleType::LongRaw);
        assert_eq!(
            OracleType::parse("XMLTYPE"),
            OracleType::Other("XMLTYPE".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!(
                "{}",
                OracleType::Varchar2 {
                    max_size: Some(50)
                }
            ),
            "VARCHAR2(50)"
        );
        assert_eq!(
            OracleType::parse("number(10, 2)").to_string(),
            "NUMBER(10,2)"
        );
        assert_eq!(OracleType::parse("NUMBER").to_string(), "NUMBER");
        assert_eq!(
            OracleType::parse("timestamp(6) with time zone").to_string(),
            "TIMESTAMP(6) WITH TIME ZONE"
        );
    }
}
