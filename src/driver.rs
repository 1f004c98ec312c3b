//! Outbound interface to the network driver.
//!
//! The adapter never speaks the wire protocol itself. It drives an
//! [`OracleDriver`] handle, which executes SQL and manages the session, and
//! asks a [`Connector`] for a fresh handle whenever the session has to be
//! (re)established. Only the operations the adapter actually uses are part
//! of the trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::AdapterConfig;
use crate::error::Result;
use crate::sql::catalog;
use crate::types::{LobLocator, QueryResult, Row};

/// Kind of catalog object a name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A table.
    Table,
    /// A view.
    View,
    /// A private or public synonym; `owner.name` is its target.
    Synonym,
    /// Anything else (packages, sequences, ...).
    Other,
}

impl ObjectKind {
    fn from_catalog(name_type: &str) -> Self {
        match name_type {
            "TABLE" => Self::Table,
            "VIEW" => Self::View,
            "SYNONYM" => Self::Synonym,
            _ => Self::Other,
        }
    }
}

/// One step of name resolution: what `name` refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct DescribedObject {
    /// Owning schema (target schema for synonyms).
    pub owner: String,
    /// Object name (target name for synonyms).
    pub name: String,
    /// What the name refers to.
    pub kind: ObjectKind,
}

impl DescribedObject {
    /// Build from a row of [`catalog::describe_sql`].
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            owner: row.get_str("OWNER")?.to_string(),
            name: row.get_str("TABLE_NAME")?.to_string(),
            kind: ObjectKind::from_catalog(row.get_str("NAME_TYPE").unwrap_or("")),
        })
    }
}

/// A single physical session with the database.
///
/// Errors must carry the ORA- code in [`crate::Error::Oracle`] so the
/// connection layer can tell a lost session from a failed statement.
#[async_trait]
pub trait OracleDriver: Send {
    /// Execute one SQL statement and return its rows (empty for DML / DDL).
    async fn exec(&mut self, sql: &str) -> Result<QueryResult>;

    /// Resolve `name` (optionally `OWNER.NAME`) one level.
    ///
    /// Returns `Ok(None)` when nothing by that name is visible. The default
    /// implementation queries the data dictionary; drivers with a native
    /// describe call may override it.
    async fn describe(&mut self, name: &str) -> Result<Option<DescribedObject>> {
        let result = self.exec(&catalog::describe_sql(name)).await?;
        Ok(result.first().and_then(DescribedObject::from_row))
    }

    /// Switch autocommit mode.
    fn set_autocommit(&mut self, autocommit: bool);

    /// Current autocommit mode.
    fn autocommit(&self) -> bool;

    /// Commit the current transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the current transaction.
    async fn rollback(&mut self) -> Result<()>;

    /// Close the session.
    async fn logoff(&mut self) -> Result<()>;

    /// Read up to `amount` bytes of LOB content starting at byte `offset`.
    ///
    /// An empty chunk means the end of the LOB was reached.
    async fn read_lob(&mut self, lob: &LobLocator, offset: u64, amount: u32) -> Result<Bytes>;

    /// Replace the LOB content behind a writable locator.
    async fn write_lob(&mut self, lob: &LobLocator, data: &[u8]) -> Result<()>;
}

/// Opens driver sessions.
///
/// Implementations honour `prefetch_rows`, `privilege` and
/// `allow_concurrency` from the configuration; session-level SQL settings
/// are applied by the connection layer afterwards.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a new session. A missing or unusable driver should surface as
    /// [`crate::Error::DriverUnavailable`].
    async fn connect(&self, config: &AdapterConfig) -> Result<Box<dyn OracleDriver>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, OracleType, OracleValue};

    /// Answers every statement with the same rows.
    struct CatalogDriver {
        rows: Vec<Vec<&'static str>>,
        last_sql: String,
    }

    #[async_trait]
    impl OracleDriver for CatalogDriver {
        async fn exec(&mut self, sql: &str) -> Result<QueryResult> {
            self.last_sql = sql.to_string();
            let columns = ["OWNER", "TABLE_NAME", "NAME_TYPE"]
                .iter()
                .map(|n| Column::new(*n, OracleType::Varchar2 { max_size: Some(128) }))
                .collect();
            let rows = self
                .rows
                .iter()
                .map(|r| r.iter().map(|v| OracleValue::String(v.to_string())).collect())
                .collect();
            Ok(QueryResult::new(columns, rows))
        }
        fn set_autocommit(&mut self, _: bool) {}
        fn autocommit(&self) -> bool {
            true
        }
        async fn commit(&mut self) -> Result<()> {
            Ok(())
        }
        async fn rollback(&mut self) -> Result<()> {
            Ok(())
        }
        async fn logoff(&mut self) -> Result<()> {
            Ok(())
        }
        async fn read_lob(&mut self, _: &LobLocator, _: u64, _: u32) -> Result<Bytes> {
            Ok(Bytes::new())
        }
        async fn write_lob(&mut self, _: &LobLocator, _: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_describe_reads_catalog() {
        let mut driver = CatalogDriver {
            rows: vec![vec!["HR", "EMPLOYEES", "SYNONYM"]],
            last_sql: String::new(),
        };

        let described = tokio_test::block_on(driver.describe("emp")).unwrap();

        assert_eq!(
            described,
            Some(DescribedObject {
                owner: "HR".into(),
                name: "EMPLOYEES".into(),
                kind: ObjectKind::Synonym,
            })
        );
        assert_eq!(driver.last_sql, catalog::describe_sql("emp"));
    }

    #[test]
    fn test_default_describe_nothing_visible() {
        let mut driver = CatalogDriver {
            rows: vec![],
            last_sql: String::new(),
        };

        assert_eq!(tokio_test::block_on(driver.describe("nope")).unwrap(), None);
    }

    #[test]
    fn test_object_kind_from_catalog() {
        assert_eq!(ObjectKind::from_catalog("TABLE"), ObjectKind::Table);
        assert_eq!(ObjectKind::from_catalog("VIEW"), ObjectKind::View);
        assert_eq!(ObjectKind::from_catalog("PACKAGE"), ObjectKind::Other);
    }
}
