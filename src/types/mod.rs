//! Oracle wire-level data types exchanged with the driver.

mod lob;
mod oracle_type;
mod result;
mod value;

pub(crate) use lob::bytes_to_string;
pub use lob::{LobKind, LobLocator, LobValue, DEFAULT_LOB_CHUNK_SIZE};
pub use oracle_type::{OracleType, TimestampZone};
pub use result::{Column, QueryResult, Row};
pub use value::OracleValue;
