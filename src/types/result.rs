//! Result sets returned by the driver.

use std::sync::Arc;

use super::{OracleType, OracleValue};

/// A column in a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name as reported by the driver (usually uppercase).
    pub name: String,
    /// Column data type.
    pub data_type: OracleType,
    /// Whether NULL values are allowed.
    pub nullable: bool,
}

impl Column {
    /// Create a nullable column.
    pub fn new(name: impl Into<String>, data_type: OracleType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }
}

/// One row of a result set; values are addressed by position or name.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<OracleValue>,
    columns: Arc<[Column]>,
}

impl Row {
    /// Create a new row sharing its column list with the rest of the result.
    pub fn new(values: Vec<OracleValue>, columns: Arc<[Column]>) -> Self {
        Self { values, columns }
    }

    /// Get value by column index (0-based).
    pub fn get(&self, index: usize) -> Option<&OracleValue> {
        self.values.get(index)
    }

    /// Get value by column name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&OracleValue> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a column value as a string, `None` for NULL or missing columns.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get_by_name(name).and_then(OracleValue::as_str)
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all values.
    pub fn values(&self) -> &[OracleValue] {
        &self.values
    }

    /// Get column information.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consume the row, pairing each value with its column.
    pub fn into_pairs(self) -> impl Iterator<Item = (Column, OracleValue)> {
        let columns = self.columns;
        self.values
            .into_iter()
            .enumerate()
            .map(move |(i, v)| (columns[i].clone(), v))
    }
}

/// Result of a statement execution.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column metadata (empty for DML / DDL).
    pub columns: Vec<Column>,
    /// Rows returned.
    pub rows: Vec<Row>,
    /// Rows affected by DML.
    pub rows_affected: u64,
}

impl QueryResult {
    /// Build a result from columns and raw value lists.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<OracleValue>>) -> Self {
        let shared: Arc<[Column]> = columns.clone().into();
        let rows = rows
            .into_iter()
            .map(|values| Row::new(values, Arc::clone(&shared)))
            .collect();
        Self {
            columns,
            rows,
            rows_affected: 0,
        }
    }

    /// Result of a statement that returned no rows.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Default::default()
        }
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// First row, if any.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result() -> QueryResult {
        QueryResult::new(
            vec![
                Column::new(
                    "NAME",
                    OracleType::Varchar2 {
                        max_size: Some(100),
                    },
                ),
                Column::new(
                    "VALUE",
                    OracleType::Number {
                        precision: Some(10),
                        scale: Some(0),
                    },
                ),
            ],
            vec![vec![
                OracleValue::String("test".to_string()),
                OracleValue::Number("42".to_string()),
            ]],
        )
    }

    #[test]
    fn test_row_access() {
        let result = make_result();
        let row = result.first().unwrap();

        assert_eq!(row.len(), 2);
        assert_eq!(row.get(0), Some(&OracleValue::String("test".to_string())));
        assert_eq!(
            row.get_by_name("value"),
            Some(&OracleValue::Number("42".to_string()))
        );
        assert_eq!(row.get_str("Name"), Some("test"));
        assert_eq!(row.get_by_name("missing"), None);
    }

    #[test]
    fn test_into_pairs() {
        let row = make_result().rows.remove(0);
        let names: Vec<String> = row.into_pairs().map(|(c, _)| c.name).collect();
        assert_eq!(names, vec!["NAME", "VALUE"]);
    }

    #[test]
    fn test_affected() {
        let result = QueryResult::affected(3);
        assert!(result.is_empty());
        assert_eq!(result.rows_affected, 3);
        assert!(result.column_names().is_empty());
    }
}
