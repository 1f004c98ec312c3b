//! Type classification and value conversion.

pub mod codec;
mod host;
mod logical;
pub mod type_mapper;

pub use codec::{cast_str, decode, encode, WRITE_LOB_LABEL};
pub use host::HostValue;
pub use logical::LogicalType;
pub use type_mapper::{classify, classify_native};
