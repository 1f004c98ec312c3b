//! Data dictionary queries.
//!
//! Every function here returns SQL text. Owner and object names are passed
//! in dictionary form (see [`super::catalog_name`]) and always embedded as
//! quoted literals.

use super::{catalog_name, quote_string};

/// Expression for the session's current schema.
pub const CURRENT_SCHEMA: &str = "SYS_CONTEXT('userenv', 'current_schema')";

/// Split `OWNER.NAME` into dictionary-form literals, defaulting the owner to
/// the current schema.
fn owner_and_name(name: &str) -> (String, String) {
    match name.split_once('.') {
        Some((owner, table)) => (
            quote_string(&catalog_name(owner)),
            quote_string(&catalog_name(table)),
        ),
        None => (CURRENT_SCHEMA.to_string(), quote_string(&catalog_name(name))),
    }
}

/// Resolve one level of `name`: a table, a view, a private synonym of the
/// owner or a public synonym. Columns: OWNER, TABLE_NAME, NAME_TYPE.
pub fn describe_sql(name: &str) -> String {
    let (owner, table) = owner_and_name(name);
    format!(
        "SELECT owner, table_name, 'TABLE' name_type FROM all_tables \
         WHERE owner = {owner} AND table_name = {table} \
         UNION ALL \
         SELECT owner, view_name table_name, 'VIEW' name_type FROM all_views \
         WHERE owner = {owner} AND view_name = {table} \
         UNION ALL \
         SELECT table_owner owner, table_name, 'SYNONYM' name_type FROM all_synonyms \
         WHERE owner = {owner} AND synonym_name = {table} \
         UNION ALL \
         SELECT table_owner owner, table_name, 'SYNONYM' name_type FROM all_synonyms \
         WHERE owner = 'PUBLIC' AND synonym_name = {table}"
    )
}

/// Tables of the current schema, names in host form. Column: TABLE_NAME.
pub fn tables_sql() -> String {
    format!(
        "SELECT DECODE(table_name, UPPER(table_name), LOWER(table_name), table_name) table_name \
         FROM all_tables \
         WHERE owner = {CURRENT_SCHEMA} AND secondary = 'N' \
         ORDER BY table_name"
    )
}

/// Column metadata of `owner.table` in declaration order.
///
/// Columns: NAME, SQL_TYPE, DATA_DEFAULT, NULLABLE, LIMIT, SCALE. LIMIT is the
/// character length for character columns and the precision otherwise.
pub fn columns_sql(owner: &str, table: &str) -> String {
    format!(
        "SELECT column_name name, data_type sql_type, data_default, nullable, \
         DECODE(data_type, 'NUMBER', data_precision, 'FLOAT', data_precision, \
         'VARCHAR2', DECODE(char_used, 'C', char_length, data_length), \
         'NVARCHAR2', char_length, \
         'CHAR', DECODE(char_used, 'C', char_length, data_length), \
         'NCHAR', char_length, \
         'RAW', data_length, NULL) limit, \
         DECODE(data_type, 'NUMBER', data_scale, NULL) scale \
         FROM all_tab_columns \
         WHERE owner = {} AND table_name = {} \
         ORDER BY column_id",
        quote_string(owner),
        quote_string(table)
    )
}

/// Non-primary-key indexes of `owner.table` with their columns.
///
/// Columns: INDEX_NAME, UNIQUENESS, COLUMN_NAME. Rows are ordered by index
/// and column position, one row per indexed column.
pub fn indexes_sql(owner: &str, table: &str) -> String {
    format!(
        "SELECT LOWER(i.index_name) index_name, i.uniqueness, \
         LOWER(c.column_name) column_name \
         FROM all_indexes i, all_ind_columns c \
         WHERE i.table_name = {table} AND i.owner = {owner} \
         AND i.table_owner = {owner} \
         AND c.index_name = i.index_name AND c.index_owner = i.owner \
         AND NOT EXISTS (SELECT uc.index_name FROM all_constraints uc \
         WHERE uc.index_name = i.index_name AND uc.owner = i.owner \
         AND uc.constraint_type = 'P') \
         ORDER BY i.index_name, c.column_position",
        owner = quote_string(owner),
        table = quote_string(table)
    )
}

/// Primary key columns of `owner.table`. Column: COLUMN_NAME.
pub fn primary_key_sql(owner: &str, table: &str) -> String {
    format!(
        "SELECT cc.column_name \
         FROM all_constraints c, all_cons_columns cc \
         WHERE c.owner = {owner} AND c.table_name = {table} \
         AND c.constraint_type = 'P' \
         AND cc.owner = c.owner AND cc.constraint_name = c.constraint_name \
         ORDER BY cc.position",
        owner = quote_string(owner),
        table = quote_string(table)
    )
}

/// Comment on `table` (optionally `OWNER.TABLE`). Column: COMMENTS.
pub fn table_comment_sql(table: &str) -> String {
    let (owner, table) = owner_and_name(table);
    format!(
        "SELECT comments FROM all_tab_comments \
         WHERE owner = {owner} AND table_name = {table}"
    )
}

/// Comment on one column of `table`. Column: COMMENTS.
pub fn column_comment_sql(table: &str, column: &str) -> String {
    let (owner, table) = owner_and_name(table);
    format!(
        "SELECT comments FROM all_col_comments \
         WHERE owner = {owner} AND table_name = {table} AND column_name = {}",
        quote_string(&catalog_name(column))
    )
}

/// Sequences of the current schema. Column: SEQUENCE_NAME.
pub fn sequences_sql() -> String {
    format!(
        "SELECT LOWER(sequence_name) sequence_name FROM all_sequences \
         WHERE sequence_owner = {CURRENT_SCHEMA} ORDER BY sequence_name"
    )
}

/// Sequences of the current schema with their next value, names in
/// dictionary form. Columns: SEQUENCE_NAME, MIN_VALUE, INCREMENT_BY, LAST_NUMBER.
pub fn structure_sequences_sql() -> String {
    format!(
        "SELECT sequence_name, min_value, increment_by, last_number \
         FROM all_sequences \
         WHERE sequence_owner = {CURRENT_SCHEMA} ORDER BY sequence_name"
    )
}

/// Tables for a structure dump, excluding secondary and recycle-bin objects.
/// Column: TABLE_NAME (dictionary form).
pub fn structure_tables_sql() -> String {
    format!(
        "SELECT table_name FROM all_tables t \
         WHERE owner = {CURRENT_SCHEMA} AND secondary = 'N' \
         AND NOT EXISTS (SELECT mv.mview_name FROM all_mviews mv \
         WHERE mv.owner = t.owner AND mv.mview_name = t.table_name) \
         AND NOT EXISTS (SELECT mvl.log_table FROM all_mview_logs mvl \
         WHERE mvl.log_owner = t.owner AND mvl.log_table = t.table_name) \
         AND table_name NOT LIKE 'BIN$%' \
         ORDER BY table_name"
    )
}

/// Column definitions for a structure dump of `table` in the current schema.
/// Columns: COLUMN_NAME, DATA_TYPE, DATA_LENGTH, CHAR_USED, CHAR_LENGTH,
/// DATA_PRECISION, DATA_SCALE, DATA_DEFAULT, NULLABLE.
pub fn structure_columns_sql(table: &str) -> String {
    format!(
        "SELECT column_name, data_type, data_length, char_used, char_length, \
         data_precision, data_scale, data_default, nullable \
         FROM all_tab_columns \
         WHERE owner = {CURRENT_SCHEMA} AND table_name = {} \
         ORDER BY column_id",
        quote_string(table)
    )
}

/// Primary key constraints for a structure dump of `table`.
/// Columns: CONSTRAINT_NAME, COLUMN_NAME.
pub fn structure_primary_key_sql(table: &str) -> String {
    format!(
        "SELECT a.constraint_name, c.column_name \
         FROM all_constraints a, all_cons_columns c \
         WHERE a.owner = {CURRENT_SCHEMA} AND a.table_name = {} \
         AND a.constraint_type = 'P' \
         AND c.owner = a.owner AND c.constraint_name = a.constraint_name \
         ORDER BY c.position",
        quote_string(table)
    )
}

/// Non-primary-key indexes for a structure dump of `table` in the current
/// schema, names in dictionary form. Columns: INDEX_NAME, UNIQUENESS, COLUMN_NAME.
pub fn structure_indexes_sql(table: &str) -> String {
    format!(
        "SELECT i.index_name, i.uniqueness, c.column_name \
         FROM all_indexes i, all_ind_columns c \
         WHERE i.table_name = {} AND i.owner = {CURRENT_SCHEMA} \
         AND i.table_owner = i.owner \
         AND c.index_name = i.index_name AND c.index_owner = i.owner \
         AND NOT EXISTS (SELECT uc.index_name FROM all_constraints uc \
         WHERE uc.index_name = i.index_name AND uc.owner = i.owner \
         AND uc.constraint_type = 'P') \
         ORDER BY i.index_name, c.column_position",
        quote_string(table)
    )
}
