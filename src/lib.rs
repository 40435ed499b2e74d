//! # fieldwire
//!
//! Schema-driven binary codec with a byte-exact, little-endian wire format.
//!
//! A type is described by an ordered list of fields, each with a semantic
//! type and optional layout modifiers (fixed length, fixed count,
//! conditional presence). From that description the codec produces
//! deterministic encode/decode logic, including nested objects, base-type
//! chaining, fixed-width padding and pooled collections.
//!
//! ## Architecture
//!
//! - **Primitive codec** ([`wire`]): scalars, spans and identifiers over a bounds-checked cursor
//! - **Field layout** ([`layout`]): presence, slots and count policy per field
//! - **Codecs** ([`codec`]): typed contract, collections, objects, dynamic tail
//! - **Schemas** ([`schema`]): data model, validation and inheritance resolution
//! - **Pooling** ([`pool`]): per-type free-lists for reusable containers
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use fieldwire::schema::{Field, FieldType, ScalarKind, Schema, SchemaRegistry};
//! use fieldwire::{ObjectCodec, ObjectValue};
//!
//! let header = Schema::builder("Header")
//!     .field(Field::new("has_name", FieldType::Scalar(ScalarKind::Bool)))
//!     .field(Field::new("name", FieldType::String).fixed_length(8).when("has_name"))
//!     .build()
//!     .unwrap();
//!
//! let codec = ObjectCodec::new(Arc::new(SchemaRegistry::new([header]).unwrap()));
//!
//! let value = ObjectValue::new("Header").with("has_name", true).with("name", "probe");
//! let bytes = codec.encode(&value).unwrap();
//! assert_eq!(&bytes[..], b"\x01probe\0\0\0");
//!
//! let decoded = codec.decode("Header", bytes).unwrap();
//! assert_eq!(decoded, value);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod layout;
pub mod pool;
pub mod schema;
pub mod value;
pub mod wire;

pub use codec::{Decode, Encode, ObjectCodec, WireEnum};
pub use config::CodecConfig;
pub use error::{CodecError, Result};
pub use pool::{Pool, PoolSet, Poolable};
pub use schema::{Schema, SchemaRegistry};
pub use value::{ObjectValue, WireValue};
pub use wire::{Id128, WireReader, WireWriter};
