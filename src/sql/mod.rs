//! Oracle SQL generation.
//!
//! Everything in here is pure string building: no I/O, no connection.
//! - [`catalog`]: data dictionary queries used for introspection
//! - [`pagination`]: ROWNUM-based offset/limit wrapping
//! - [`order_by`]: LOB-aware ORDER BY rewriting
//! - [`ddl`]: tables, columns, sequences, indexes and comments
//! - [`structure`]: schema dump / drop scripts

pub mod catalog;
pub mod ddl;
pub mod order_by;
pub mod pagination;
pub mod structure;

use crate::error::{Error, Result};

/// Longest identifier accepted by Oracle releases before 12.2.
pub const IDENTIFIER_MAX_LENGTH: usize = 30;

/// Words that must be quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "ACCESS", "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUDIT", "BETWEEN", "BY", "CHAR",
    "CHECK", "CLUSTER", "COLUMN", "COMMENT", "COMPRESS", "CONNECT", "CREATE", "CURRENT", "DATE",
    "DECIMAL", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "EXCLUSIVE", "EXISTS",
    "FILE", "FLOAT", "FOR", "FROM", "GRANT", "GROUP", "HAVING", "IDENTIFIED", "IMMEDIATE", "IN",
    "INCREMENT", "INDEX", "INITIAL", "INSERT", "INTEGER", "INTERSECT", "INTO", "IS", "LEVEL",
    "LIKE", "LOCK", "LONG", "MAXEXTENTS", "MINUS", "MLSLABEL", "MODE", "MODIFY", "NOAUDIT",
    "NOCOMPRESS", "NOT", "NOWAIT", "NULL", "NUMBER", "OF", "OFFLINE", "ON", "ONLINE", "OPTION",
    "OR", "ORDER", "PCTFREE", "PRIOR", "PRIVILEGES", "PUBLIC", "RAW", "RENAME", "RESOURCE",
    "REVOKE", "ROW", "ROWID", "ROWNUM", "ROWS", "SELECT", "SESSION", "SET", "SHARE", "SIZE",
    "SMALLINT", "START", "SUCCESSFUL", "SYNONYM", "SYSDATE", "TABLE", "THEN", "TO", "TRIGGER",
    "UID", "UNION", "UNIQUE", "UPDATE", "USER", "VALIDATE", "VALUES", "VARCHAR", "VARCHAR2",
    "VIEW", "WHENEVER", "WHERE", "WITH",
];

/// Whether `name` is an Oracle reserved word.
pub fn is_reserved_word(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    RESERVED_WORDS.contains(&upper.as_str())
}

/// A plain (unquoted) Oracle name: letter first, then letters, digits, `_`, `$`, `#`.
fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#'))
}

/// Whether `name` can be used as a table name without quoting, optionally
/// with a `@dblink` suffix.
pub fn valid_table_name(name: &str) -> bool {
    let mut parts = name.splitn(2, '@');
    let table = parts.next().unwrap_or("");
    is_plain_name(table) && parts.next().map_or(true, is_plain_name)
}

/// Reject identifiers that would need quoting in contexts that cannot quote
/// (session settings, sequence names in options).
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.len() <= 128 && is_plain_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// Quote a column (or single name part) for Oracle.
///
/// Mixed-case and unusual names are double-quoted verbatim; reserved words
/// are double-quoted uppercase; everything else passes through.
pub fn quote_column_name(name: &str) -> String {
    let mixed_case = name.chars().any(|c| c.is_ascii_uppercase())
        && name.chars().any(|c| c.is_ascii_lowercase());
    if mixed_case || !is_plain_name(name) {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else if is_reserved_word(name) {
        format!("\"{}\"", name.to_ascii_uppercase())
    } else {
        name.to_string()
    }
}

/// Quote a possibly schema-qualified table name, part by part.
pub fn quote_table_name(name: &str) -> String {
    name.split('.')
        .map(|part| {
            part.split('@')
                .map(quote_column_name)
                .collect::<Vec<_>>()
                .join("@")
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Dictionary form of a name: plain names are stored uppercase, quoted
/// names as written.
pub fn catalog_name(name: &str) -> String {
    if valid_table_name(name) {
        name.to_ascii_uppercase()
    } else {
        name.to_string()
    }
}

/// Host form of a dictionary name: all-uppercase names are lowercased,
/// mixed-case names are kept.
pub fn oracle_downcase(name: &str) -> String {
    if name.chars().any(|c| c.is_ascii_lowercase()) {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}
