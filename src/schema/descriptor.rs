use crate::config::EmulationFlags;
use crate::mapping::{classify_native, LogicalType};
use crate::types::OracleType;

/// A table column as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Host-form name: all-uppercase dictionary names are lowercased.
    pub name: String,
    pub logical_type: LogicalType,
    /// Native type as declared, e.g. `NUMBER(10,2)`.
    pub native_type: String,
    pub nullable: bool,
    /// Cleaned default value text.
    pub default_value: Option<String>,
    pub table_name: String,
    /// Type forced through the override registry.
    pub forced_type: Option<LogicalType>,
    parsed: OracleType,
}

impl ColumnDescriptor {
    pub fn new(
        name: impl Into<String>,
        native_type: impl Into<String>,
        table_name: impl Into<String>,
        nullable: bool,
        default_value: Option<String>,
        forced_type: Option<LogicalType>,
        flags: &EmulationFlags,
    ) -> Self {
        let name = name.into();
        let native_type = native_type.into();
        let parsed = OracleType::parse(&native_type);
        let logical_type =
            forced_type.unwrap_or_else(|| classify_native(&parsed, &name, flags));
        Self {
            name,
            logical_type,
            native_type,
            nullable,
            default_value,
            table_name: table_name.into(),
            forced_type,
            parsed,
        }
    }

    /// Character length or numeric precision.
    pub fn limit(&self) -> Option<u32> {
        self.parsed
            .max_size()
            .or_else(|| self.parsed.precision().map(u32::from))
    }

    pub fn precision(&self) -> Option<u8> {
        self.parsed.precision()
    }

    pub fn scale(&self) -> Option<i8> {
        self.parsed.scale()
    }

    /// Stored as CLOB / NCLOB / BLOB.
    pub fn is_lob(&self) -> bool {
        self.parsed.is_lob()
    }

    pub fn oracle_type(&self) -> &OracleType {
        &self.parsed
    }
}

/// Clean a dictionary `DATA_DEFAULT`: trailing whitespace trimmed,
/// surrounding quotes removed, NULL and empty LOB constructors dropped.
pub fn clean_default(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim_end();
    if value.is_empty()
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("empty_clob()")
        || value.eq_ignore_ascii_case("empty_blob()")
    {
        return None;
    }
    let unquoted = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .map(|v| v.replace("''", "'"))
        .unwrap_or_else(|| value.to_string());
    Some(unquoted)
}

/// A non-primary-key index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub table_name: String,
    pub index_name: String,
    pub unique: bool,
    /// Indexed columns in key order.
    pub columns: Vec<String>,
}
