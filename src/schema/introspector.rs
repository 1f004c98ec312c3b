//! Reads table, column, index and key metadata from the data dictionary.
//!
//! Names are resolved first (following synonyms) so that every catalog
//! query runs against the owning schema of the real table or view.

use tracing::debug;

use super::descriptor::{clean_default, ColumnDescriptor, IndexDescriptor};
use super::TypeOverrideRegistry;
use crate::connection::ResilientConnection;
use crate::driver::ObjectKind;
use crate::error::{Error, Result};
use crate::sql::{catalog, ddl, oracle_downcase};
use crate::types::{QueryResult, Row};

/// Longest synonym chain followed before giving up.
pub const MAX_SYNONYM_DEPTH: usize = 8;

const LABEL: &str = "SCHEMA";

/// Owner and name of a table or view, in dictionary form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub owner: String,
    pub name: String,
}

/// Schema queries over a borrowed connection.
pub struct SchemaIntrospector<'a> {
    conn: &'a mut ResilientConnection,
    registry: &'a TypeOverrideRegistry,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(conn: &'a mut ResilientConnection, registry: &'a TypeOverrideRegistry) -> Self {
        Self { conn, registry }
    }

    /// Follow synonyms until a table or view is reached.
    pub async fn resolve(&mut self, name: &str) -> Result<ResolvedName> {
        let mut current = name.to_string();
        for _ in 0..=MAX_SYNONYM_DEPTH {
            let Some(object) = self.conn.describe(&current).await? else {
                return Err(Error::object_not_found(name));
            };
            match object.kind {
                ObjectKind::Table | ObjectKind::View => {
                    return Ok(ResolvedName {
                        owner: object.owner,
                        name: object.name,
                    })
                }
                ObjectKind::Synonym => {
                    let next = format!("{}.{}", object.owner, object.name);
                    debug!(synonym = %current, resolves_to = %next, "Following synonym");
                    current = next;
                }
                ObjectKind::Other => return Err(Error::object_not_found(name)),
            }
        }
        Err(Error::object_not_found(name))
    }

    /// Tables of the current schema, in host form.
    pub async fn tables(&mut self) -> Result<Vec<String>> {
        let result = self.conn.execute(&catalog::tables_sql(), LABEL).await?;
        Ok(result
            .iter()
            .filter_map(|row| row.get_str("TABLE_NAME").map(str::to_string))
            .collect())
    }

    /// Columns of `table` in declaration order, ignored columns left out.
    pub async fn columns(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let resolved = self.resolve(table).await?;
        let result = self
            .conn
            .execute(&catalog::columns_sql(&resolved.owner, &resolved.name), LABEL)
            .await?;
        let flags = &self.conn.config().flags;

        let columns = result
            .iter()
            .filter_map(|row| {
                let name = oracle_downcase(row.get_str("NAME")?);
                if self.registry.is_ignored(table, &name) {
                    return None;
                }
                Some((name, row))
            })
            .map(|(name, row)| {
                let native = native_type(row);
                let forced = self.registry.type_for(table, &name);
                ColumnDescriptor::new(
                    name,
                    native,
                    table,
                    row.get_str("NULLABLE") != Some("N"),
                    clean_default(row.get_str("DATA_DEFAULT")),
                    forced,
                    flags,
                )
            })
            .collect();
        Ok(columns)
    }

    /// Non-primary-key indexes of `table`.
    pub async fn indexes(&mut self, table: &str) -> Result<Vec<IndexDescriptor>> {
        let resolved = self.resolve(table).await?;
        let result = self
            .conn
            .execute(&catalog::indexes_sql(&resolved.owner, &resolved.name), LABEL)
            .await?;
        Ok(group_indexes(table, &result))
    }

    /// The primary key column, when the key has exactly one column.
    pub async fn primary_key(&mut self, table: &str) -> Result<Option<String>> {
        let resolved = self.resolve(table).await?;
        let result = self
            .conn
            .execute(&catalog::primary_key_sql(&resolved.owner, &resolved.name), LABEL)
            .await?;
        if result.len() != 1 {
            return Ok(None);
        }
        Ok(result
            .first()
            .and_then(|row| row.get_str("COLUMN_NAME"))
            .map(oracle_downcase))
    }

    /// Primary key and its conventional sequence name.
    pub async fn pk_and_sequence_for(&mut self, table: &str) -> Result<Option<(String, String)>> {
        Ok(self
            .primary_key(table)
            .await?
            .map(|pk| (pk, ddl::default_sequence_name(table))))
    }

    pub async fn table_comment(&mut self, table: &str) -> Result<Option<String>> {
        let resolved = self.resolve(table).await?;
        let sql = catalog::table_comment_sql(&format!("{}.{}", resolved.owner, resolved.name));
        self.single_comment(&sql).await
    }

    pub async fn column_comment(&mut self, table: &str, column: &str) -> Result<Option<String>> {
        let resolved = self.resolve(table).await?;
        let sql = catalog::column_comment_sql(
            &format!("{}.{}", resolved.owner, resolved.name),
            column,
        );
        self.single_comment(&sql).await
    }

    async fn single_comment(&mut self, sql: &str) -> Result<Option<String>> {
        let result = self.conn.execute(sql, LABEL).await?;
        Ok(result
            .first()
            .and_then(|row| row.get_str("COMMENTS"))
            .filter(|c| !c.is_empty())
            .map(str::to_string))
    }
}

/// Fold one-row-per-column index rows into descriptors, keeping row order.
pub(crate) fn group_indexes(table: &str, result: &QueryResult) -> Vec<IndexDescriptor> {
    let mut indexes: Vec<IndexDescriptor> = Vec::new();
    for row in result.iter() {
        let (Some(index_name), Some(column)) =
            (row.get_str("INDEX_NAME"), row.get_str("COLUMN_NAME"))
        else {
            continue;
        };
        match indexes.last_mut() {
            Some(last) if last.index_name == index_name => last.columns.push(column.to_string()),
            _ => indexes.push(IndexDescriptor {
                table_name: table.to_string(),
                index_name: index_name.to_string(),
                unique: row.get_str("UNIQUENESS") == Some("UNIQUE"),
                columns: vec![column.to_string()],
            }),
        }
    }
    indexes
}

/// Native type text from a [`catalog::columns_sql`] row.
fn native_type(row: &Row) -> String {
    let sql_type = row.get_str("SQL_TYPE").unwrap_or("VARCHAR2");
    let limit = row.get_str("LIMIT");
    let scale = row.get_str("SCALE");
    match (sql_type, limit, scale) {
        ("NUMBER", Some(p), Some(s)) if s != "0" => format!("NUMBER({p},{s})"),
        ("NUMBER", Some(p), _) => format!("NUMBER({p})"),
        ("NUMBER", None, Some("0")) => "NUMBER(*,0)".to_string(),
        (ty, Some(l), _) if !ty.contains('(') => format!("{ty}({l})"),
        (ty, _, _) => ty.to_string(),
    }
}
