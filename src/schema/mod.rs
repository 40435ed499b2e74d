//! Schema model, validation and resolution.
//!
//! - [`Schema`] / [`Field`] / [`FieldType`]: plain serde data describing a type
//! - [`SchemaBuilder`]: builds and validates one schema
//! - [`SchemaRegistry`]: validates a whole set and resolves inheritance

mod builder;
mod registry;
mod types;

pub use builder::SchemaBuilder;
pub use registry::{ResolvedSchema, SchemaRegistry, Step};
pub use types::{CountSource, EnumDef, EnumVariant, Field, FieldType, ScalarKind, Schema};
