//! Schema introspection and per-adapter column overrides.

mod descriptor;
mod introspector;
mod registry;

pub use descriptor::{clean_default, ColumnDescriptor, IndexDescriptor};
pub(crate) use introspector::group_indexes;
pub use introspector::{ResolvedName, SchemaIntrospector, MAX_SYNONYM_DEPTH};
pub use registry::TypeOverrideRegistry;
