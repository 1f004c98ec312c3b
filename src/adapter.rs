//! The adapter: one Oracle session plus schema and type handling.
//!
//! [`OracleAdapter`] owns a [`ResilientConnection`] and the column override
//! registry. Like the connection it is single-user: every operation takes
//! `&mut self`, so share it between tasks only behind a lock, or better,
//! give each worker its own adapter.

use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use tracing::{debug, info};

use crate::config::{AdapterConfig, EmulationFlags};
use crate::connection::ResilientConnection;
use crate::driver::Connector;
use crate::error::{Error, Result};
use crate::mapping::{self, codec, HostValue, LogicalType, WRITE_LOB_LABEL};
use crate::schema::{
    group_indexes, ColumnDescriptor, IndexDescriptor, SchemaIntrospector, TypeOverrideRegistry,
};
use crate::sql::{
    self, catalog, ddl, order_by, pagination, quote_column_name, quote_table_name, structure,
};
use crate::types::{LobLocator, OracleValue, QueryResult};

/// A decoded row: host-form column names with their values, in select order.
pub type HostRow = Vec<(String, HostValue)>;

/// Oracle adapter over a single session.
pub struct OracleAdapter {
    conn: ResilientConnection,
    registry: TypeOverrideRegistry,
}

impl OracleAdapter {
    /// Validate `config`, connect and set up the session.
    pub async fn establish_connection(
        connector: Arc<dyn Connector>,
        config: AdapterConfig,
    ) -> Result<Self> {
        let conn = ResilientConnection::open(connector, config).await?;
        Ok(Self {
            conn,
            registry: TypeOverrideRegistry::new(),
        })
    }

    /// The configuration the session was opened with.
    pub fn config(&self) -> &AdapterConfig {
        self.conn.config()
    }

    /// Type emulation flags in effect.
    pub fn flags(&self) -> &EmulationFlags {
        &self.conn.config().flags
    }

    /// The underlying connection.
    pub fn connection(&mut self) -> &mut ResilientConnection {
        &mut self.conn
    }

    /// Column type overrides and ignored columns.
    pub fn registry(&self) -> &TypeOverrideRegistry {
        &self.registry
    }

    // Session

    /// Last known state of the session.
    pub fn is_active(&self) -> bool {
        self.conn.is_active()
    }

    /// Round-trip a trivial query.
    pub async fn ping(&mut self) -> Result<bool> {
        self.conn.ping().await
    }

    /// Reconnect and run session setup again.
    pub async fn reset(&mut self) -> Result<()> {
        self.conn.reset().await
    }

    /// Log off the session.
    pub async fn disconnect(&mut self) {
        self.conn.disconnect().await
    }

    /// Turn autocommit off until the next commit or rollback.
    pub fn begin_transaction(&mut self) {
        self.conn.begin_transaction()
    }

    /// Commit and return to autocommit.
    pub async fn commit(&mut self) -> Result<()> {
        self.conn.commit().await
    }

    /// Roll back and return to autocommit.
    pub async fn rollback(&mut self) -> Result<()> {
        self.conn.rollback().await
    }

    // Statements

    /// Execute SQL as is, returning the driver's rows.
    pub async fn execute(&mut self, sql: &str, label: &str) -> Result<QueryResult> {
        self.conn.execute(sql, label).await
    }

    /// Run a query and decode every row.
    ///
    /// LOBs returned as bare locators are read in full, unless `label` is
    /// [`WRITE_LOB_LABEL`], in which case every LOB comes back as a handle.
    pub async fn select(&mut self, sql: &str, label: &str) -> Result<Vec<HostRow>> {
        let result = self.conn.execute(sql, label).await?;
        let write_intent = label == WRITE_LOB_LABEL;
        let flags = self.conn.config().flags.clone();

        let columns: Vec<(String, LogicalType)> = result
            .columns
            .iter()
            .map(|c| {
                (
                    sql::oracle_downcase(&c.name),
                    mapping::classify_native(&c.data_type, &c.name, &flags),
                )
            })
            .collect();

        let mut rows = Vec::with_capacity(result.len());
        for row in result.iter() {
            let mut decoded = Vec::with_capacity(columns.len());
            for ((name, logical), raw) in columns.iter().zip(row.values()) {
                let value = match raw {
                    OracleValue::Clob(lob) | OracleValue::Blob(lob) => {
                        match codec::decode_lob(lob, write_intent)? {
                            HostValue::Lob(lob) if !write_intent => {
                                let data = self.conn.read_lob(&lob.locator).await?;
                                codec::lob_content(lob.kind(), data)?
                            }
                            value => value,
                        }
                    }
                    _ => mapping::decode(raw, *logical, name, &flags)?,
                };
                decoded.push((name.clone(), value));
            }
            rows.push(decoded);
        }
        Ok(rows)
    }

    /// [`select`](Self::select) over one page of `sql`.
    ///
    /// Rows carry only the columns of `sql`; the wrapper's row number is dropped.
    pub async fn select_page(
        &mut self,
        sql: &str,
        limit: Option<u64>,
        offset: u64,
        label: &str,
    ) -> Result<Vec<HostRow>> {
        let mut rows = self
            .select(&pagination::add_limit_offset(sql, limit, offset), label)
            .await?;
        for row in &mut rows {
            row.retain(|(name, _)| !name.eq_ignore_ascii_case(pagination::ROW_NUMBER_COLUMN));
        }
        Ok(rows)
    }

    /// Encode a value for `column` as an SQL fragment.
    pub fn quote(&self, value: &HostValue, column: Option<&ColumnDescriptor>) -> Result<String> {
        let logical = column.map(|c| {
            if c.logical_type.is_lob() && !c.is_lob() {
                // RAW and LONG columns take inline literals.
                LogicalType::String
            } else {
                c.logical_type
            }
        });
        codec::encode(value, logical, self.flags())
    }

    /// Parse caller text for `logical`.
    pub fn cast(&self, text: &str, logical: LogicalType) -> Result<HostValue> {
        mapping::cast_str(text, logical, self.flags())
    }

    /// Next value of `sequence`.
    pub async fn next_sequence_value(&mut self, sequence: &str) -> Result<i64> {
        let result = self
            .conn
            .execute(&ddl::next_sequence_value_sql(sequence), "SEQUENCE")
            .await?;
        result
            .first()
            .and_then(|row| row.get(0))
            .and_then(OracleValue::to_i64)
            .ok_or_else(|| Error::type_conversion(format!("{sequence}.NEXTVAL returned no number")))
    }

    // Introspection

    fn introspector(&mut self) -> SchemaIntrospector<'_> {
        SchemaIntrospector::new(&mut self.conn, &self.registry)
    }

    /// Tables of the current schema, in host form.
    pub async fn tables(&mut self) -> Result<Vec<String>> {
        self.introspector().tables().await
    }

    /// Columns of `table`, after synonyms, overrides and ignores.
    pub async fn columns(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.introspector().columns(table).await
    }

    /// Non-primary-key indexes of `table`.
    pub async fn indexes(&mut self, table: &str) -> Result<Vec<IndexDescriptor>> {
        self.introspector().indexes(table).await
    }

    /// The primary key column, when the key has exactly one column.
    pub async fn primary_key(&mut self, table: &str) -> Result<Option<String>> {
        self.introspector().primary_key(table).await
    }

    /// Primary key column and default sequence name of `table`.
    pub async fn pk_and_sequence_for(&mut self, table: &str) -> Result<Option<(String, String)>> {
        self.introspector().pk_and_sequence_for(table).await
    }

    /// Comment on `table`, if any.
    pub async fn table_comment(&mut self, table: &str) -> Result<Option<String>> {
        self.introspector().table_comment(table).await
    }

    /// Comment on `table.column`, if any.
    pub async fn column_comment(&mut self, table: &str, column: &str) -> Result<Option<String>> {
        self.introspector().column_comment(table, column).await
    }

    /// Rewrite `order` so LOB columns of `table` sort on their first 100 characters.
    pub async fn lob_order_by_expression(&mut self, table: &str, order: &str) -> Result<String> {
        let lob_columns: Vec<String> = self
            .columns(table)
            .await?
            .into_iter()
            .filter(|c| c.is_lob())
            .map(|c| c.name)
            .collect();
        Ok(order_by::lob_order_by_expression(order, &lob_columns))
    }

    // Overrides

    /// Hide `columns` of `table` from introspection.
    pub fn ignore_table_columns<S: AsRef<str>>(&mut self, table: &str, columns: &[S]) {
        self.registry.ignore_table_columns(table, columns)
    }

    /// Forget every ignored column.
    pub fn clear_ignored_table_columns(&mut self) {
        self.registry.clear_ignored_table_columns()
    }

    /// Force `logical_type` for `columns` of `table`.
    pub fn set_type_for_columns<S: AsRef<str>>(
        &mut self,
        table: &str,
        logical_type: LogicalType,
        columns: &[S],
    ) {
        self.registry.set_type_for_columns(table, logical_type, columns)
    }

    /// Forget every type override.
    pub fn clear_types_for_columns(&mut self) {
        self.registry.clear_types_for_columns()
    }

    // Schema changes

    /// Create a table, its primary key sequence and comments.
    pub async fn create_table(
        &mut self,
        table: &str,
        columns: &[ddl::ColumnDefinition],
        options: &ddl::TableOptions,
    ) -> Result<()> {
        let statements = ddl::create_table_statements(table, columns, options, self.flags());
        for statement in statements {
            self.conn.execute(&statement, "CREATE TABLE").await?;
        }
        info!(table, "table created");
        Ok(())
    }

    /// Drop a table and, best effort, its sequence.
    pub async fn drop_table(&mut self, table: &str, sequence: Option<&str>) -> Result<()> {
        self.conn
            .execute(&ddl::drop_table_sql(table), "DROP TABLE")
            .await?;
        let sequence = sequence
            .map(str::to_string)
            .unwrap_or_else(|| ddl::default_sequence_name(table));
        if let Err(e) = self
            .conn
            .execute(&ddl::drop_sequence_sql(&sequence), "DROP SEQUENCE")
            .await
        {
            debug!(sequence = %sequence, error = %e, "sequence not dropped");
        }
        Ok(())
    }

    /// Rename a table and, best effort, its default sequence.
    pub async fn rename_table(&mut self, table: &str, new_name: &str) -> Result<()> {
        self.conn
            .execute(&ddl::rename_table_sql(table, new_name), "RENAME TABLE")
            .await?;
        let sql = ddl::rename_sequence_sql(
            &ddl::default_sequence_name(table),
            &ddl::default_sequence_name(new_name),
        );
        if let Err(e) = self.conn.execute(&sql, "RENAME SEQUENCE").await {
            debug!(table, error = %e, "sequence not renamed");
        }
        Ok(())
    }

    /// Add a column and its comment.
    pub async fn add_column(&mut self, table: &str, column: &ddl::ColumnDefinition) -> Result<()> {
        let sql = ddl::add_column_sql(table, column, self.flags());
        self.conn.execute(&sql, "ADD COLUMN").await?;
        if let Some(comment) = &column.comment {
            self.add_comment(table, &column.name, comment).await?;
        }
        Ok(())
    }

    pub async fn remove_column(&mut self, table: &str, column: &str) -> Result<()> {
        self.conn
            .execute(&ddl::remove_column_sql(table, column), "REMOVE COLUMN")
            .await?;
        Ok(())
    }

    pub async fn rename_column(&mut self, table: &str, column: &str, new_name: &str) -> Result<()> {
        self.conn
            .execute(&ddl::rename_column_sql(table, column, new_name), "RENAME COLUMN")
            .await?;
        Ok(())
    }

    /// Change type, default and nullability of an existing column.
    pub async fn change_column(&mut self, table: &str, column: &ddl::ColumnDefinition) -> Result<()> {
        let current = self.find_column(table, &column.name).await?;
        let sql = ddl::change_column_sql(table, column, current.nullable, self.flags());
        self.conn.execute(&sql, "CHANGE COLUMN").await?;
        if let Some(comment) = &column.comment {
            self.add_comment(table, &column.name, comment).await?;
        }
        Ok(())
    }

    /// Set a column default; NULL removes it.
    ///
    /// The literal is encoded for the column's type, so LOB columns get an
    /// `EMPTY_CLOB()` / `EMPTY_BLOB()` default.
    pub async fn change_column_default(
        &mut self,
        table: &str,
        column: &str,
        default: &HostValue,
    ) -> Result<()> {
        let current = self.find_column(table, column).await?;
        let literal = self.quote(default, Some(&current))?;
        let sql = ddl::change_column_default_sql(table, column, Some(&literal));
        self.conn.execute(&sql, "CHANGE COLUMN DEFAULT").await?;
        Ok(())
    }

    async fn find_column(&mut self, table: &str, column: &str) -> Result<ColumnDescriptor> {
        self.columns(table)
            .await?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(column))
            .ok_or_else(|| Error::ColumnNotFound {
                name: format!("{table}.{column}"),
            })
    }

    /// Comment on a column; blank comments are skipped.
    pub async fn add_comment(&mut self, table: &str, column: &str, comment: &str) -> Result<()> {
        if let Some(sql) = ddl::column_comment_sql(table, column, comment) {
            self.conn.execute(&sql, "COMMENT").await?;
        }
        Ok(())
    }

    /// Comment on a table; blank comments are skipped.
    pub async fn add_table_comment(&mut self, table: &str, comment: &str) -> Result<()> {
        if let Some(sql) = ddl::table_comment_sql(table, comment) {
            self.conn.execute(&sql, "COMMENT").await?;
        }
        Ok(())
    }

    /// Create an index, named after the table and columns unless `name` is given.
    pub async fn add_index<S: AsRef<str>>(
        &mut self,
        table: &str,
        columns: &[S],
        name: Option<&str>,
        unique: bool,
    ) -> Result<()> {
        let sql = ddl::add_index_sql(table, columns, name, unique)?;
        self.conn.execute(&sql, "ADD INDEX").await?;
        Ok(())
    }

    pub async fn remove_index(&mut self, name: &str) -> Result<()> {
        self.conn
            .execute(&ddl::remove_index_sql(name), "REMOVE INDEX")
            .await?;
        Ok(())
    }

    // Structure

    /// CREATE statements for all sequences, then all tables of the current
    /// schema with their indexes.
    pub async fn structure_dump(&mut self) -> Result<String> {
        let mut statements = Vec::new();

        let sequences = self
            .conn
            .execute(&catalog::structure_sequences_sql(), "STRUCTURE")
            .await?;
        statements.extend(sequences.iter().filter_map(structure::dump_sequence));

        let tables = self
            .conn
            .execute(&catalog::structure_tables_sql(), "STRUCTURE")
            .await?;
        for table in tables.iter().filter_map(|row| row.get_str("TABLE_NAME")) {
            let columns: Vec<String> = self
                .conn
                .execute(&catalog::structure_columns_sql(table), "STRUCTURE")
                .await?
                .iter()
                .filter_map(structure::dump_column)
                .collect();

            let key_rows = self
                .conn
                .execute(&catalog::structure_primary_key_sql(table), "STRUCTURE")
                .await?;
            let constraint = key_rows
                .first()
                .and_then(|row| row.get_str("CONSTRAINT_NAME"));
            let key_columns: Vec<&str> = key_rows
                .iter()
                .filter_map(|row| row.get_str("COLUMN_NAME"))
                .collect();
            let primary_key = constraint.map(|name| (name, key_columns.as_slice()));
            statements.push(structure::dump_table(table, &columns, primary_key));

            let index_rows = self
                .conn
                .execute(&catalog::structure_indexes_sql(table), "STRUCTURE")
                .await?;
            statements.extend(group_indexes(table, &index_rows).iter().map(|index| {
                structure::dump_index(table, &index.index_name, index.unique, index.columns.as_slice())
            }));
        }
        Ok(structure::join_statements(&statements))
    }

    /// DROP statements for all sequences and tables of the current schema.
    pub async fn structure_drop(&mut self) -> Result<String> {
        let sequences = self
            .conn
            .execute(&catalog::structure_sequences_sql(), "STRUCTURE")
            .await?;
        let tables = self
            .conn
            .execute(&catalog::structure_tables_sql(), "STRUCTURE")
            .await?;

        let statements: Vec<String> = sequences
            .iter()
            .filter_map(|row| row.get_str("SEQUENCE_NAME"))
            .map(structure::drop_sequence)
            .chain(
                tables
                    .iter()
                    .filter_map(|row| row.get_str("TABLE_NAME"))
                    .map(structure::drop_table),
            )
            .collect();
        Ok(structure::join_statements(&statements))
    }

    /// Execute each statement of a dump or drop script in order.
    pub async fn execute_structure(&mut self, script: &str) -> Result<()> {
        for statement in structure::split_statements(script) {
            self.conn.execute(statement, "STRUCTURE").await?;
        }
        Ok(())
    }

    // LOBs

    /// Stream the content behind a locator.
    pub fn lob_stream<'a>(
        &'a mut self,
        lob: &'a LobLocator,
    ) -> impl Stream<Item = Result<Bytes>> + 'a {
        self.conn.lob_stream(lob)
    }

    /// Write staged LOB values of a freshly inserted or updated row.
    ///
    /// The row was written with `EMPTY_CLOB()` / `EMPTY_BLOB()` placeholders.
    /// For each LOB column of `table` with a non-null, non-empty staged
    /// value, the locator is selected `FOR UPDATE` and the content written
    /// through it; serialized values are stored as YAML. Run inside the
    /// same transaction as the insert; errors propagate so the caller can
    /// roll back.
    pub async fn write_lobs(
        &mut self,
        table: &str,
        primary_key: &str,
        id: &HostValue,
        values: &[(String, HostValue)],
    ) -> Result<()> {
        let lob_columns: Vec<ColumnDescriptor> = self
            .columns(table)
            .await?
            .into_iter()
            .filter(|c| c.is_lob())
            .collect();
        let id_literal = codec::encode(id, None, self.flags())?;

        for column in &lob_columns {
            let Some((_, value)) = values
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&column.name))
            else {
                continue;
            };
            let Some(payload) = value.lob_payload()? else {
                continue;
            };

            let sql = format!(
                "SELECT {} FROM {} WHERE {} = {} FOR UPDATE",
                quote_column_name(&column.name),
                quote_table_name(table),
                quote_column_name(primary_key),
                id_literal
            );
            let result = self.conn.execute(&sql, WRITE_LOB_LABEL).await?;
            let locator = result
                .first()
                .and_then(|row| row.get(0))
                .and_then(OracleValue::as_lob)
                .map(|lob| lob.locator.clone())
                .ok_or_else(|| {
                    Error::type_conversion(format!(
                        "no LOB locator for {table}.{} where {primary_key} = {id_literal}",
                        column.name
                    ))
                })?;
            self.conn.write_lob(&locator, &payload).await?;
            debug!(table, column = %column.name, bytes = payload.len(), "LOB written");
        }
        Ok(())
    }
}
