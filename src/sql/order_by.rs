//! ORDER BY rewriting for LOB columns.
//!
//! Oracle cannot sort on CLOB/BLOB values, so LOB columns in an ORDER BY
//! list are replaced with the first 100 characters of their content.

/// Rewrite `order` so that every column named in `lob_columns` sorts on
/// `DBMS_LOB.SUBSTR(column, 100, 1)`.
///
/// Terms are split on commas. A term whose first word (case-insensitive)
/// names a LOB column keeps its direction suffix; all other terms pass
/// through untouched.
pub fn lob_order_by_expression<S: AsRef<str>>(order: &str, lob_columns: &[S]) -> String {
    order
        .split(',')
        .map(|term| {
            let trimmed = term.trim();
            let (column, rest) = match trimmed.split_once(char::is_whitespace) {
                Some((column, rest)) => (column, Some(rest.trim())),
                None => (trimmed, None),
            };
            let is_lob = lob_columns
                .iter()
                .any(|lob| lob.as_ref().eq_ignore_ascii_case(column));
            if !is_lob {
                return term.to_string();
            }
            match rest {
                Some(direction) if !direction.is_empty() => {
                    format!("DBMS_LOB.SUBSTR({column},100,1) {direction}")
                }
                _ => format!("DBMS_LOB.SUBSTR({column},100,1)"),
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lob_column_rewritten() {
        assert_eq!(
            lob_order_by_expression("body DESC, id", &["body"]),
            "DBMS_LOB.SUBSTR(body,100,1) DESC, id"
        );
    }

    #[test]
    fn test_case_insensitive_match() {
        assert_eq!(
            lob_order_by_expression("BODY", &["body"]),
            "DBMS_LOB.SUBSTR(BODY,100,1)"
        );
    }

    #[test]
    fn test_no_lob_columns_is_unchanged() {
        let order = "name ASC, id DESC";
        assert_eq!(lob_order_by_expression::<&str>(order, &[]), order);
        assert_eq!(lob_order_by_expression(order, &["body"]), order);
    }
}
