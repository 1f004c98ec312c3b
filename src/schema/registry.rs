use std::collections::{BTreeSet, HashMap};

use crate::mapping::LogicalType;

/// Per-adapter column overrides: forced logical types and ignored columns.
///
/// Table and column names are compared lowercase.
#[derive(Debug, Clone, Default)]
pub struct TypeOverrideRegistry {
    types: HashMap<(String, String), LogicalType>,
    ignored: HashMap<String, BTreeSet<String>>,
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl TypeOverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide `columns` of `table` from introspection. Repeated calls accumulate.
    pub fn ignore_table_columns<S: AsRef<str>>(&mut self, table: &str, columns: &[S]) {
        self.ignored
            .entry(key(table))
            .or_default()
            .extend(columns.iter().map(|c| key(c.as_ref())));
    }

    pub fn clear_ignored_table_columns(&mut self) {
        self.ignored.clear();
    }

    /// Ignored columns of `table`, lowercase.
    pub fn ignored_columns(&self, table: &str) -> Option<&BTreeSet<String>> {
        self.ignored.get(&key(table))
    }

    pub fn is_ignored(&self, table: &str, column: &str) -> bool {
        self.ignored_columns(table)
            .is_some_and(|set| set.contains(&key(column)))
    }

    /// Force `logical_type` for `columns` of `table`.
    pub fn set_type_for_columns<S: AsRef<str>>(
        &mut self,
        table: &str,
        logical_type: LogicalType,
        columns: &[S],
    ) {
        for column in columns {
            self.types
                .insert((key(table), key(column.as_ref())), logical_type);
        }
    }

    pub fn clear_types_for_columns(&mut self) {
        self.types.clear();
    }

    /// Forced type for `table.column`, if any.
    pub fn type_for(&self, table: &str, column: &str) -> Option<LogicalType> {
        self.types.get(&(key(table), key(column))).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_is_idempotent_over_union() {
        let mut twice = TypeOverrideRegistry::new();
        twice.ignore_table_columns("posts", &["a", "b"]);
        twice.ignore_table_columns("POSTS", &["B", "c"]);

        let mut once = TypeOverrideRegistry::new();
        once.ignore_table_columns("posts", &["a", "b", "c"]);

        assert_eq!(twice.ignored_columns("posts"), once.ignored_columns("posts"));
        assert!(twice.is_ignored("Posts", "C"));
    }

    #[test]
    fn test_type_overrides() {
        let mut registry = TypeOverrideRegistry::new();
        registry.set_type_for_columns("posts", LogicalType::Boolean, &["is_public"]);
        assert_eq!(
            registry.type_for("POSTS", "IS_PUBLIC"),
            Some(LogicalType::Boolean)
        );
        assert_eq!(registry.type_for("posts", "title"), None);

        registry.clear_types_for_columns();
        assert_eq!(registry.type_for("posts", "is_public"), None);
    }

    #[test]
    fn test_clear_ignored() {
        let mut registry = TypeOverrideRegistry::new();
        registry.ignore_table_columns("posts", &["legacy"]);
        registry.clear_ignored_table_columns();
        assert!(!registry.is_ignored("posts", "legacy"));
    }
}
