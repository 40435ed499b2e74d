//! Primitive codec - fixed-width scalars, raw spans and identifiers.
//!
//! This module implements the lowest layer of the wire format:
//! - [`WireReader`]: bounds-checked read cursor over one record
//! - [`WireWriter`]: append-only write buffer
//! - [`WireScalar`]: little-endian fixed-width scalars
//! - [`Id128`]: 16-byte identifiers

mod id;
mod reader;
mod scalar;
mod writer;

pub use id::{Id128, ID128_SIZE};
pub use reader::WireReader;
pub use scalar::{WireInteger, WireScalar};
pub use writer::WireWriter;

/// Size of a length or element-count prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;
