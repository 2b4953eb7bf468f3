//! Searchable field schema.
//!
//! - [`FieldDefinition`] / [`FieldType`] - what a field is and how it is stored
//! - [`FieldRegistry`] - the frozen name to definition mapping
//! - [`TemporalParser`] - date phrases resolved against a reference instant

mod field;
mod registry;
mod temporal;

pub use field::{EnumeratedValue, FieldDefinition, FieldType, StoredValue};
pub use registry::{FieldRegistry, FieldRegistryBuilder, SchemaConfig};
pub use temporal::TemporalParser;
