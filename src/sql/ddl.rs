//! Schema-changing statements.
//!
//! Builders return SQL text; the adapter decides which statements are
//! best-effort (sequence drop / rename) and which must succeed.

use sha1::{Digest, Sha1};

use super::{quote_column_name, quote_string, quote_table_name, IDENTIFIER_MAX_LENGTH};
use crate::config::EmulationFlags;
use crate::error::{Error, Result};
use crate::mapping::LogicalType;

/// Column type of a primary key created with the table.
pub const PRIMARY_KEY_TYPE: &str = "NUMBER(38) NOT NULL PRIMARY KEY";

/// Sequence start when neither the table nor the configuration sets one.
pub const FALLBACK_SEQUENCE_START_VALUE: u64 = 1;

/// A column in CREATE TABLE / ALTER TABLE statements.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub logical_type: LogicalType,
    /// Character length, or precision when `precision` is unset.
    pub limit: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<i8>,
    /// Default as a ready SQL fragment (literal or expression).
    pub default: Option<String>,
    pub nullable: bool,
    pub comment: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            limit: None,
            precision: None,
            scale: None,
            default: None,
            nullable: true,
            comment: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn precision(mut self, precision: u8, scale: i8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn default_sql(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    fn sql_type(&self, flags: &EmulationFlags) -> String {
        type_to_sql(self.logical_type, self.limit, self.precision, self.scale, flags)
    }

    fn to_sql(&self, flags: &EmulationFlags) -> String {
        let mut sql = format!("{} {}", quote_column_name(&self.name), self.sql_type(flags));
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// Options for [`create_table_statements`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Add a sequence-backed primary key column.
    pub id: bool,
    /// Name of that column.
    pub primary_key: String,
    /// Sequence name; defaults to `<table>_seq`.
    pub sequence_name: Option<String>,
    /// Per-table sequence start value.
    pub sequence_start_value: Option<u64>,
    /// Raw clauses appended to CREATE SEQUENCE, e.g. `NOCACHE INCREMENT BY 10`.
    pub sequence_options: Option<String>,
    /// `CREATE GLOBAL TEMPORARY TABLE`.
    pub temporary: bool,
    /// Raw clauses appended to CREATE TABLE.
    pub options: Option<String>,
    pub comment: Option<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            id: true,
            primary_key: "id".to_string(),
            sequence_name: None,
            sequence_start_value: None,
            sequence_options: None,
            temporary: false,
            options: None,
            comment: None,
        }
    }
}

/// Native column type for a logical type.
pub fn type_to_sql(
    logical_type: LogicalType,
    limit: Option<u32>,
    precision: Option<u8>,
    scale: Option<i8>,
    flags: &EmulationFlags,
) -> String {
    match logical_type {
        LogicalType::String => format!("VARCHAR2({})", limit.unwrap_or(255)),
        LogicalType::Text => "CLOB".to_string(),
        LogicalType::Binary => "BLOB".to_string(),
        LogicalType::Integer => match precision.or(limit.map(|l| l.min(38) as u8)) {
            Some(p) => format!("NUMBER({p})"),
            None => "NUMBER(38)".to_string(),
        },
        LogicalType::Decimal | LogicalType::Float => match (precision, scale) {
            (Some(p), Some(s)) => format!("NUMBER({p},{s})"),
            (Some(p), None) => format!("NUMBER({p})"),
            _ => "NUMBER".to_string(),
        },
        LogicalType::Date | LogicalType::DateTime => "DATE".to_string(),
        LogicalType::Timestamp => match precision {
            Some(p) => format!("TIMESTAMP({p})"),
            None => "TIMESTAMP".to_string(),
        },
        LogicalType::Boolean if flags.emulate_booleans_from_strings => "VARCHAR2(1)".to_string(),
        LogicalType::Boolean => "NUMBER(1)".to_string(),
    }
}

/// `<table>_seq`, with the table part cut so the name fits an identifier.
pub fn default_sequence_name(table: &str) -> String {
    let base: String = table.chars().take(IDENTIFIER_MAX_LENGTH - 4).collect();
    format!("{base}_seq")
}

/// Per-table value, else configured default, else 1.
pub fn resolve_sequence_start(per_table: Option<u64>, configured: Option<u64>) -> u64 {
    per_table
        .or(configured)
        .unwrap_or(FALLBACK_SEQUENCE_START_VALUE)
}

pub fn create_sequence_sql(sequence: &str, start_value: u64, options: Option<&str>) -> String {
    let mut sql = format!(
        "CREATE SEQUENCE {} START WITH {start_value}",
        quote_table_name(sequence)
    );
    if let Some(options) = options.map(str::trim).filter(|o| !o.is_empty()) {
        sql.push(' ');
        sql.push_str(options);
    }
    sql
}

pub fn drop_sequence_sql(sequence: &str) -> String {
    format!("DROP SEQUENCE {}", quote_table_name(sequence))
}

pub fn next_sequence_value_sql(sequence: &str) -> String {
    format!("SELECT {}.NEXTVAL id FROM dual", quote_table_name(sequence))
}

/// Statements creating a table, its sequence and its comments, in order.
pub fn create_table_statements(
    table: &str,
    columns: &[ColumnDefinition],
    options: &TableOptions,
    flags: &EmulationFlags,
) -> Vec<String> {
    let mut definitions = Vec::with_capacity(columns.len() + 1);
    if options.id {
        definitions.push(format!(
            "{} {PRIMARY_KEY_TYPE}",
            quote_column_name(&options.primary_key)
        ));
    }
    definitions.extend(columns.iter().map(|c| c.to_sql(flags)));

    let mut create = format!(
        "CREATE{} TABLE {} ({})",
        if options.temporary { " GLOBAL TEMPORARY" } else { "" },
        quote_table_name(table),
        definitions.join(", ")
    );
    if let Some(extra) = options.options.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
        create.push(' ');
        create.push_str(extra);
    }

    let mut statements = vec![create];
    if options.id {
        let sequence = options
            .sequence_name
            .clone()
            .unwrap_or_else(|| default_sequence_name(table));
        let start = resolve_sequence_start(
            options.sequence_start_value,
            Some(flags.default_sequence_start_value),
        );
        statements.push(create_sequence_sql(
            &sequence,
            start,
            options.sequence_options.as_deref(),
        ));
    }
    statements.extend(
        options
            .comment
            .as_deref()
            .and_then(|c| table_comment_sql(table, c)),
    );
    statements.extend(
        columns
            .iter()
            .filter_map(|c| column_comment_sql(table, &c.name, c.comment.as_deref()?)),
    );
    statements
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE {}", quote_table_name(table))
}

pub fn rename_table_sql(table: &str, new_name: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME TO {}",
        quote_table_name(table),
        quote_table_name(new_name)
    )
}

pub fn rename_sequence_sql(sequence: &str, new_name: &str) -> String {
    format!(
        "RENAME {} TO {}",
        quote_table_name(sequence),
        quote_table_name(new_name)
    )
}

pub fn add_column_sql(table: &str, column: &ColumnDefinition, flags: &EmulationFlags) -> String {
    format!(
        "ALTER TABLE {} ADD {}",
        quote_table_name(table),
        column.to_sql(flags)
    )
}

pub fn remove_column_sql(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} DROP COLUMN {}",
        quote_table_name(table),
        quote_column_name(column)
    )
}

pub fn rename_column_sql(table: &str, column: &str, new_name: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME COLUMN {} TO {}",
        quote_table_name(table),
        quote_column_name(column),
        quote_column_name(new_name)
    )
}

/// `MODIFY` with the new type, default and nullability.
///
/// `current_nullable` is the column's nullability before the change; Oracle
/// rejects a `NULL` / `NOT NULL` clause that does not change anything.
pub fn change_column_sql(
    table: &str,
    column: &ColumnDefinition,
    current_nullable: bool,
    flags: &EmulationFlags,
) -> String {
    let mut sql = format!(
        "ALTER TABLE {} MODIFY {} {}",
        quote_table_name(table),
        quote_column_name(&column.name),
        column.sql_type(flags)
    );
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(default);
    }
    if column.nullable != current_nullable {
        sql.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
    }
    sql
}

/// `None` resets the default to NULL.
pub fn change_column_default_sql(table: &str, column: &str, default: Option<&str>) -> String {
    format!(
        "ALTER TABLE {} MODIFY {} DEFAULT {}",
        quote_table_name(table),
        quote_column_name(column),
        default.unwrap_or("NULL")
    )
}

/// `COMMENT ON TABLE`, or `None` for a blank comment.
pub fn table_comment_sql(table: &str, comment: &str) -> Option<String> {
    if comment.trim().is_empty() {
        return None;
    }
    Some(format!(
        "COMMENT ON TABLE {} IS {}",
        quote_table_name(table),
        quote_string(comment)
    ))
}

/// `COMMENT ON COLUMN`, or `None` for a blank comment.
pub fn column_comment_sql(table: &str, column: &str, comment: &str) -> Option<String> {
    if comment.trim().is_empty() {
        return None;
    }
    Some(format!(
        "COMMENT ON COLUMN {}.{} IS {}",
        quote_table_name(table),
        quote_column_name(column),
        quote_string(comment)
    ))
}

/// Index name for `columns` of `table` that fits in an identifier.
///
/// `index_<table>_on_<a>_and_<b>` when short enough, then a compacted
/// `i_<table>_<a>_<b>`, and finally `i` followed by a SHA-1 prefix of the
/// long name.
pub fn index_name<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    let columns: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
    let default_name = format!("index_{}_on_{}", table, columns.join("_and_"));
    if default_name.len() <= IDENTIFIER_MAX_LENGTH {
        return default_name;
    }

    let shortened = format!("i_{}_{}", table, columns.join("_"));
    if shortened.len() <= IDENTIFIER_MAX_LENGTH {
        return shortened;
    }

    let digest = Sha1::digest(default_name.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("i{}", &hex[..IDENTIFIER_MAX_LENGTH - 1])
}

pub fn add_index_sql<S: AsRef<str>>(
    table: &str,
    columns: &[S],
    name: Option<&str>,
    unique: bool,
) -> Result<String> {
    let name = match name {
        Some(name) if name.len() > IDENTIFIER_MAX_LENGTH => {
            return Err(Error::InvalidIdentifier {
                name: name.to_string(),
            })
        }
        Some(name) => name.to_string(),
        None => index_name(table, columns),
    };
    let column_list = columns
        .iter()
        .map(|c| quote_column_name(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "CREATE {}INDEX {} ON {} ({column_list})",
        if unique { "UNIQUE " } else { "" },
        quote_column_name(&name),
        quote_table_name(table)
    ))
}

pub fn remove_index_sql(name: &str) -> String {
    format!("DROP INDEX {}", quote_column_name(name))
}
