//! Schema dump and drop scripts.
//!
//! Statements are built from catalog rows (see [`super::catalog`]) and
//! joined with [`STATEMENT_TOKEN`], which [`split_statements`] undoes.
//! Dictionary names are emitted double-quoted so that a restore recreates
//! them with the same case.

use crate::types::Row;

/// Separator between statements of a dump.
pub const STATEMENT_TOKEN: &str = "\n\n/\n\n";

fn dictionary_name(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE SEQUENCE` from a [`super::catalog::structure_sequences_sql`] row.
pub fn dump_sequence(row: &Row) -> Option<String> {
    let name = row.get_str("SEQUENCE_NAME")?;
    let min_value = row.get_str("MIN_VALUE").unwrap_or("1");
    let increment_by = row.get_str("INCREMENT_BY").unwrap_or("1");
    let last_number = row.get_str("LAST_NUMBER").unwrap_or(min_value);
    Some(format!(
        "CREATE SEQUENCE {} MINVALUE {min_value} START WITH {last_number} INCREMENT BY {increment_by}",
        dictionary_name(name)
    ))
}

/// Column clause from a [`super::catalog::structure_columns_sql`] row.
///
/// Numbers with a declared precision render `(p[,s])`, character and RAW
/// types their length; defaults and NOT NULL are inline.
pub fn dump_column(row: &Row) -> Option<String> {
    let name = row.get_str("COLUMN_NAME")?;
    let data_type = row.get_str("DATA_TYPE")?;
    let mut sql = format!("{} {}", dictionary_name(name), data_type);

    if data_type.contains("CHAR") {
        let length = if row.get_str("CHAR_USED") == Some("C") {
            row.get_str("CHAR_LENGTH")
        } else {
            row.get_str("DATA_LENGTH")
        };
        if let Some(length) = length {
            sql.push_str(&format!("({length})"));
        }
    } else if data_type == "RAW" {
        if let Some(length) = row.get_str("DATA_LENGTH") {
            sql.push_str(&format!("({length})"));
        }
    } else if data_type == "NUMBER" {
        if let Some(precision) = row.get_str("DATA_PRECISION") {
            match row.get_str("DATA_SCALE").filter(|s| *s != "0") {
                Some(scale) => sql.push_str(&format!("({precision},{scale})")),
                None => sql.push_str(&format!("({precision})")),
            }
        }
    }

    if let Some(default) = row
        .get_str("DATA_DEFAULT")
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        sql.push_str(" DEFAULT ");
        sql.push_str(default);
    }
    if row.get_str("NULLABLE") == Some("N") {
        sql.push_str(" NOT NULL");
    }
    Some(sql)
}

/// `CREATE TABLE` with an inline primary key constraint.
pub fn dump_table<S: AsRef<str>>(
    table: &str,
    columns: &[String],
    primary_key: Option<(&str, &[S])>,
) -> String {
    let mut definitions: Vec<String> = columns.iter().map(|c| format!(" {c}")).collect();
    if let Some((constraint, key_columns)) = primary_key {
        let key_columns = key_columns
            .iter()
            .map(|c| dictionary_name(c.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        definitions.push(format!(
            " CONSTRAINT {} PRIMARY KEY ({key_columns})",
            dictionary_name(constraint)
        ));
    }
    format!(
        "CREATE TABLE {} (\n{}\n)",
        dictionary_name(table),
        definitions.join(",\n")
    )
}

/// `CREATE [UNIQUE] INDEX` for an index of `table`, all names in dictionary form.
pub fn dump_index<S: AsRef<str>>(table: &str, name: &str, unique: bool, columns: &[S]) -> String {
    let columns = columns
        .iter()
        .map(|c| dictionary_name(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE {}INDEX {} ON {} ({columns})",
        if unique { "UNIQUE " } else { "" },
        dictionary_name(name),
        dictionary_name(table)
    )
}

pub fn drop_sequence(name: &str) -> String {
    format!("DROP SEQUENCE {}", dictionary_name(name))
}

pub fn drop_table(name: &str) -> String {
    format!("DROP TABLE {} CASCADE CONSTRAINTS", dictionary_name(name))
}

pub fn join_statements(statements: &[String]) -> String {
    statements.join(STATEMENT_TOKEN)
}

/// Non-empty statements of a dump, trimmed.
pub fn split_statements(script: &str) -> impl Iterator<Item = &str> {
    script
        .split(STATEMENT_TOKEN)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
