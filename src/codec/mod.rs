//! Codec module - encoding and decoding of typed values and schema objects.
//!
//! Two paths share the same layout rules:
//!
//! - Typed: [`Encode`] / [`Decode`] implementations plus layout helpers,
//!   the shape of code emitted per type by a generator
//! - Schema-driven: [`ObjectCodec`] interprets a resolved schema over
//!   [`ObjectValue`](crate::ObjectValue)s, with [`CollectionCodec`] for
//!   sequences
//!
//! [`TailCodec`] handles the trailing raw region of dynamic types on both.
//!
//! # Design
//!
//! Codecs are marker structs or thin context structs with plain methods
//! rather than trait objects; recursion into nested types is static on the
//! typed path and table-driven on the schema path.

mod collection;
mod object;
mod tail;
mod typed;

pub use collection::CollectionCodec;
pub use object::ObjectCodec;
pub use tail::TailCodec;
pub use typed::{
    decode_enum, decode_fixed_count, decode_fixed_length, decode_fixed_str, decode_pooled_list,
    decode_tail, decode_when, encode_enum, encode_fixed_count, encode_fixed_length,
    encode_fixed_str, encode_tail, encode_when, Decode, Encode, WireEnum,
};
