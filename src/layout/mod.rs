//! Field layout policy.
//!
//! [`plan`] decides whether a field is present and how its length is
//! carried; the slot helpers emit and consume the bytes that decision
//! implies. The schema interpreter and typed code share both.

mod plan;
mod slot;

pub use plan::{plan, CountPolicy, FieldPlan};
pub use slot::{
    read_bytes, read_fixed_str, read_length, read_slot, read_str, read_utf8, write_bytes,
    write_length, write_padded, write_slot, write_str,
};
