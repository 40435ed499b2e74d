//! Collection codec for the schema-driven path.
//!
//! Elements are coded one after another in index order, each with its
//! element type's natural encoding (strings keep their own prefix). The
//! count is either a 4-byte prefix or fixed by the field's layout.

use super::object::ObjectCodec;
use crate::error::{CodecError, Result};
use crate::layout::{read_length, write_length, CountPolicy};
use crate::schema::FieldType;
use crate::value::WireValue;
use crate::wire::{WireReader, WireWriter};

/// Codes sequences of [`WireValue`]s, delegating elements to an [`ObjectCodec`].
pub struct CollectionCodec<'a> {
    objects: &'a ObjectCodec,
}

impl<'a> CollectionCodec<'a> {
    /// Borrow `objects` for element coding.
    #[inline]
    pub fn new(objects: &'a ObjectCodec) -> Self {
        Self { objects }
    }

    /// Write `items` under the given count policy.
    ///
    /// With [`CountPolicy::Exact`], missing elements are written as the
    /// element type's neutral value and surplus elements fail with
    /// [`CodecError::CountExceeded`].
    pub fn write(
        &self,
        element: &FieldType,
        items: &[WireValue],
        count: CountPolicy,
        w: &mut WireWriter,
    ) -> Result<()> {
        let fill = match count {
            CountPolicy::Prefixed => {
                write_length(w, items.len())?;
                0
            }
            CountPolicy::Exact(n) if items.len() > n => {
                return Err(CodecError::CountExceeded {
                    count: items.len(),
                    limit: n,
                })
            }
            CountPolicy::Exact(n) => n - items.len(),
        };

        for item in items {
            self.objects.write_value(element, item, w)?;
        }

        if fill > 0 {
            let filler = WireValue::neutral(element);
            for _ in 0..fill {
                self.objects.write_value(element, &filler, w)?;
            }
            self.objects.recycle_value(element, filler);
        }
        Ok(())
    }

    /// Read a sequence under the given count policy.
    ///
    /// With `pooled`, the storage is checked out from the codec's pools and
    /// handed back to them if an element fails to decode.
    pub fn read(
        &self,
        element: &FieldType,
        pooled: bool,
        count: CountPolicy,
        r: &mut WireReader,
    ) -> Result<Vec<WireValue>> {
        let count = match count {
            CountPolicy::Prefixed => read_length(r)?,
            CountPolicy::Exact(n) => n,
        };

        let mut items: Vec<WireValue> = if pooled {
            self.objects.pools().checkout()
        } else {
            Vec::new()
        };
        // Never trust the count for allocation beyond what the record holds
        items.reserve(count.min(r.remaining()));

        for _ in 0..count {
            match self.objects.read_value(element, r) {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.objects.recycle_items(element, pooled, items);
                    return Err(e);
                }
            }
        }
        Ok(items)
    }
}
