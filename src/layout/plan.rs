//! Per-field layout decisions.
//!
//! Before a field is coded, its modifiers are resolved against the values of
//! the fields already coded in the same object:
//!
//! - `ConditionalOn(b)` with `b` false or missing: the field is [`FieldPlan::Absent`]
//! - `FixedLength(n)`: the field's natural encoding sits in an `n`-byte slot
//! - `FixedCount(n | ref)`: no prefix, exactly `n` elements ([`CountPolicy::Exact`])
//! - otherwise sequences carry a 4-byte prefix ([`CountPolicy::Prefixed`])

use crate::error::{CodecError, Result};
use crate::schema::{CountSource, Field};
use crate::value::ObjectValue;

/// How a sequence's length is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountPolicy {
    /// 4-byte LE signed count precedes the elements.
    Prefixed,
    /// Exactly this many elements (bytes for strings), no prefix.
    Exact(usize),
}

/// Resolved layout of one field for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPlan {
    /// Contributes zero bytes.
    Absent,
    /// Coded, optionally inside a fixed slot.
    Present {
        /// Fixed slot size in bytes.
        slot: Option<usize>,
        /// Count policy (meaningful for sequences only).
        count: CountPolicy,
    },
}

impl FieldPlan {
    /// The field contributes no bytes.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldPlan::Absent)
    }
}

/// Resolve a field's layout against the sibling values coded so far.
///
/// Count references resolve to 0 when the referenced field is missing
/// (for example, itself behind a false guard).
pub fn plan(field: &Field, scope: &ObjectValue) -> Result<FieldPlan> {
    if let Some(guard) = &field.condition {
        let present = scope.get(guard).and_then(|v| v.as_bool()).unwrap_or(false);
        if !present {
            return Ok(FieldPlan::Absent);
        }
    }

    let count = match &field.fixed_count {
        None => CountPolicy::Prefixed,
        Some(CountSource::Const(n)) => CountPolicy::Exact(*n),
        Some(CountSource::Field { field: name, max }) => {
            CountPolicy::Exact(resolve_count(scope, name, *max)?)
        }
    };

    Ok(FieldPlan::Present {
        slot: field.fixed_length,
        count,
    })
}

fn resolve_count(scope: &ObjectValue, name: &str, max: Option<usize>) -> Result<usize> {
    let Some(value) = scope.get(name) else {
        return Ok(0);
    };
    let raw = value.as_i64().ok_or_else(|| CodecError::TypeMismatch {
        expected: format!("integer count '{}'", name),
        found: value.kind_name().to_string(),
    })?;
    if raw < 0 {
        return Err(CodecError::InvalidLength(
            i32::try_from(raw).unwrap_or(i32::MIN),
        ));
    }
    let count = usize::try_from(raw).unwrap_or(usize::MAX);
    match max {
        Some(limit) if count > limit => Err(CodecError::CountExceeded { count, limit }),
        _ => Ok(count),
    }
}
