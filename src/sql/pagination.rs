//! Offset/limit emulation with ROWNUM.

/// Row number column added by the wrapper.
pub const ROW_NUMBER_COLUMN: &str = "raw_rnum_";

/// Wrap `sql` so that only rows `offset + 1 ..= offset + limit` are returned.
///
/// With no offset and no limit the statement is returned unchanged. The
/// wrapper adds a [`ROW_NUMBER_COLUMN`] to the result.
pub fn add_limit_offset(sql: &str, limit: Option<u64>, offset: u64) -> String {
    if offset == 0 && limit.is_none() {
        return sql.to_string();
    }
    match limit {
        Some(limit) => format!(
            "SELECT * FROM (SELECT raw_sql_.*, ROWNUM raw_rnum_ FROM ({sql}) raw_sql_ \
             WHERE ROWNUM <= {}) WHERE raw_rnum_ > {offset}",
            offset.saturating_add(limit)
        ),
        None => format!(
            "SELECT * FROM (SELECT raw_sql_.*, ROWNUM raw_rnum_ FROM ({sql}) raw_sql_) \
             WHERE raw_rnum_ > {offset}"
        ),
    }
}
