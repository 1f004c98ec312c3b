//! Oracle dialect adapter
//!
//! Adapts a general-purpose persistence layer to Oracle: a session that
//! reconnects and retries once after connection loss, classification of
//! native column types into host types, value conversion, and the Oracle
//! SQL needed for introspection, pagination, sequences and LOBs.
//!
//! The wire protocol is not part of this crate. Plug a driver in by
//! implementing [`OracleDriver`] and [`Connector`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use oracle_enhanced_rs::{AdapterConfig, Connector, OracleAdapter, Result};
//!
//! async fn run(connector: Arc<dyn Connector>) -> Result<()> {
//!     let config = AdapterConfig::new("localhost:1521/FREEPDB1", "scott", "tiger")
//!         .with_auto_retry(true);
//!     let mut adapter = OracleAdapter::establish_connection(connector, config).await?;
//!
//!     for column in adapter.columns("employees").await? {
//!         println!("{} {} -> {}", column.name, column.native_type, column.logical_type);
//!     }
//!
//!     let page = adapter
//!         .select_page("SELECT * FROM employees ORDER BY id", Some(10), 20, "Employee Load")
//!         .await?;
//!     println!("{} rows", page.len());
//!
//!     adapter.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod mapping;
pub mod schema;
pub mod sql;
pub mod types;

// Re-export main types
pub use adapter::{HostRow, OracleAdapter};
pub use config::{AdapterConfig, DefaultTimezone, EmulationFlags, Privilege};
pub use connection::ResilientConnection;
pub use driver::{Connector, DescribedObject, ObjectKind, OracleDriver};
pub use error::{Error, Result};
pub use mapping::{HostValue, LogicalType, WRITE_LOB_LABEL};
pub use schema::{ColumnDescriptor, IndexDescriptor, TypeOverrideRegistry};
pub use sql::ddl::{ColumnDefinition, TableOptions};
pub use types::{Column, LobKind, LobLocator, LobValue, OracleType, OracleValue, QueryResult, Row};
