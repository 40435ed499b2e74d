//! Object codec - schema-driven encode/decode of whole objects.
//!
//! For a type with resolved steps `ancestor₀ … T`, an object is coded as
//! every step in order (base fields first, then each type's own fields in
//! declaration order), followed by the raw tail if the type is dynamic.
//! Nested objects are inlined with no boundary marker.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fieldwire::schema::{EnumDef, Field, FieldType, ScalarKind, Schema, SchemaRegistry};
//! use fieldwire::{ObjectCodec, ObjectValue, WireValue};
//!
//! let schema = Schema::builder("ProtoTest")
//!     .field(Field::new("U0", FieldType::Scalar(ScalarKind::U32)))
//!     .field(Field::new("U1", FieldType::list(FieldType::Scalar(ScalarKind::U32))))
//!     .field(Field::new(
//!         "U2",
//!         FieldType::Enum(
//!             EnumDef::new("EnumTest", ScalarKind::I32).variant("A", 0).variant("B", 1),
//!         ),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let codec = ObjectCodec::new(Arc::new(SchemaRegistry::new([schema]).unwrap()));
//! let value = ObjectValue::new("ProtoTest")
//!     .with("U0", 7u32)
//!     .with("U1", vec![WireValue::U32(1), WireValue::U32(2), WireValue::U32(3)])
//!     .with("U2", WireValue::Enum(1));
//!
//! let bytes = codec.encode(&value).unwrap();
//! assert_eq!(bytes.len(), 24);
//! assert_eq!(codec.decode("ProtoTest", bytes).unwrap(), value);
//! ```

use std::sync::Arc;

use bytes::Bytes;

use super::collection::CollectionCodec;
use super::tail::TailCodec;
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::layout::{
    plan, read_bytes, read_fixed_str, read_slot, read_str, write_bytes, write_padded, write_slot,
    write_str, CountPolicy, FieldPlan,
};
use crate::pool::PoolSet;
use crate::schema::{EnumDef, FieldType, ResolvedSchema, ScalarKind, SchemaRegistry, Step};
use crate::value::{ObjectValue, WireValue};
use crate::wire::{Id128, WireInteger, WireReader, WireWriter};

/// Encodes and decodes [`ObjectValue`]s against a [`SchemaRegistry`].
///
/// Cheap to clone; clones share the registry and the pools.
#[derive(Debug, Clone)]
pub struct ObjectCodec {
    registry: Arc<SchemaRegistry>,
    pools: Arc<PoolSet>,
    config: CodecConfig,
}

impl ObjectCodec {
    /// Create a codec with default limits and its own pools.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        let config = CodecConfig::default();
        Self {
            registry,
            pools: Arc::new(PoolSet::from_config(&config)),
            config,
        }
    }

    /// Create a codec with explicit limits.
    pub fn with_config(registry: Arc<SchemaRegistry>, config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            pools: Arc::new(PoolSet::from_config(&config)),
            config,
        })
    }

    /// Share pools with another codec.
    pub fn with_pools(mut self, pools: Arc<PoolSet>) -> Self {
        self.pools = pools;
        self
    }

    /// Schemas this codec interprets.
    #[inline]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Pools backing pooled lists.
    #[inline]
    pub fn pools(&self) -> &PoolSet {
        &self.pools
    }

    /// Limits and sizing in effect.
    #[inline]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode one object into a fresh buffer.
    pub fn encode(&self, value: &ObjectValue) -> Result<Bytes> {
        let mut w = WireWriter::with_capacity(self.config.initial_capacity)
            .with_max_length(self.config.max_length)
            .with_max_depth(self.config.max_depth);
        self.serialize(value, &mut w)?;
        Ok(w.into_bytes())
    }

    /// Decode one record of `type_name`.
    ///
    /// `data` must hold exactly one record: a dynamic type captures every
    /// byte after its declared fields. Trailing bytes after a non-dynamic
    /// type are left unread.
    pub fn decode(&self, type_name: &str, data: impl Into<Bytes>) -> Result<ObjectValue> {
        let mut r = WireReader::new(data.into())
            .with_max_length(self.config.max_length)
            .with_max_depth(self.config.max_depth);
        self.deserialize(type_name, &mut r)
    }

    /// Append one object to `w`.
    ///
    /// Length and depth limits are the writer's own. On error, bytes
    /// already written are left in `w`.
    pub fn serialize(&self, value: &ObjectValue, w: &mut WireWriter) -> Result<()> {
        let schema = self.registry.resolve(value.type_name())?;
        self.write_object(&schema, value, w)
    }

    /// Read one object of `type_name` at the reader's cursor.
    ///
    /// Length and depth limits are the reader's own.
    pub fn deserialize(&self, type_name: &str, r: &mut WireReader) -> Result<ObjectValue> {
        let schema = self.registry.resolve(type_name)?;
        self.read_object(&schema, r)
    }

    /// Hand every pooled list inside a decoded object back to the pools.
    ///
    /// The object is consumed; nested objects and lists are walked
    /// recursively. Values of unknown types are dropped.
    pub fn recycle(&self, value: ObjectValue) {
        let Ok(schema) = self.registry.resolve(value.type_name()) else {
            return;
        };
        for (name, field_value) in value.into_fields() {
            if let Some(step) = schema.step(&name) {
                self.recycle_value(&step.field.ty, field_value);
            }
        }
    }

    fn write_object(
        &self,
        schema: &ResolvedSchema,
        value: &ObjectValue,
        w: &mut WireWriter,
    ) -> Result<()> {
        w.enter()?;
        let result = self.write_fields(schema, value, w);
        w.leave();
        result
    }

    fn write_fields(
        &self,
        schema: &ResolvedSchema,
        value: &ObjectValue,
        w: &mut WireWriter,
    ) -> Result<()> {
        tracing::trace!("Encoding {} at offset {}", schema.name, w.position());
        for step in &schema.steps {
            self.write_field(step, value, w)
                .map_err(|e| e.in_field(&step.declaring_type, &step.field.name))?;
        }
        if schema.dynamic {
            TailCodec::append(w, value.tail());
        }
        Ok(())
    }

    fn read_object(&self, schema: &ResolvedSchema, r: &mut WireReader) -> Result<ObjectValue> {
        r.enter()?;
        let result = self.read_fields(schema, r);
        r.leave();
        result
    }

    fn read_fields(&self, schema: &ResolvedSchema, r: &mut WireReader) -> Result<ObjectValue> {
        tracing::trace!("Decoding {} at offset {}", schema.name, r.position());
        let mut obj = ObjectValue::with_capacity(&schema.name, schema.steps.len());
        for step in &schema.steps {
            match self.read_field(step, &obj, r) {
                Ok(Some(value)) => obj.set(&step.field.name, value),
                Ok(None) => {}
                Err(e) => {
                    self.recycle(obj);
                    return Err(e.in_field(&step.declaring_type, &step.field.name));
                }
            }
        }
        if schema.dynamic {
            obj.set_tail(TailCodec::capture(r));
        }
        Ok(obj)
    }

    fn write_field(&self, step: &Step, scope: &ObjectValue, w: &mut WireWriter) -> Result<()> {
        let field = &step.field;
        let FieldPlan::Present { slot, count } = plan(field, scope)? else {
            return Ok(());
        };

        let neutral;
        let value = match scope.get(&field.name) {
            Some(value) => value,
            None => {
                neutral = WireValue::neutral(&field.ty);
                &neutral
            }
        };

        match slot {
            Some(n) => write_slot(w, n, |w| self.write_laid_out(&field.ty, value, slot, count, w)),
            None => self.write_laid_out(&field.ty, value, slot, count, w),
        }
    }

    fn read_field(
        &self,
        step: &Step,
        scope: &ObjectValue,
        r: &mut WireReader,
    ) -> Result<Option<WireValue>> {
        let field = &step.field;
        let FieldPlan::Present { slot, count } = plan(field, scope)? else {
            return Ok(None);
        };

        let value = match slot {
            Some(n) => read_slot(r, n, |r| self.read_laid_out(&field.ty, slot, count, r))?,
            None => self.read_laid_out(&field.ty, slot, count, r)?,
        };
        Ok(Some(value))
    }

    /// Field body after presence and slot are settled.
    fn write_laid_out(
        &self,
        ty: &FieldType,
        value: &WireValue,
        slot: Option<usize>,
        count: CountPolicy,
        w: &mut WireWriter,
    ) -> Result<()> {
        match (ty, raw_region(slot, count)) {
            (FieldType::String, Some(n)) => match value {
                WireValue::String(s) => write_padded(w, s.as_bytes(), n),
                other => Err(mismatch(ty, other)),
            },
            (FieldType::Bytes, Some(n)) => match value {
                WireValue::Bytes(b) => write_padded(w, b, n),
                other => Err(mismatch(ty, other)),
            },
            (FieldType::List { element, .. }, _) => match value {
                WireValue::List(items) => {
                    CollectionCodec::new(self).write(element, items, count, w)
                }
                other => Err(mismatch(ty, other)),
            },
            _ => self.write_value(ty, value, w),
        }
    }

    fn read_laid_out(
        &self,
        ty: &FieldType,
        slot: Option<usize>,
        count: CountPolicy,
        r: &mut WireReader,
    ) -> Result<WireValue> {
        match (ty, raw_region(slot, count)) {
            (FieldType::String, Some(n)) => Ok(WireValue::String(read_fixed_str(r, n)?)),
            (FieldType::Bytes, Some(n)) => Ok(WireValue::Bytes(r.take_bytes(n)?)),
            (FieldType::List { element, pooled }, _) => Ok(WireValue::List(
                CollectionCodec::new(self).read(element, *pooled, count, r)?,
            )),
            _ => self.read_value(ty, r),
        }
    }

    /// Natural encoding of a value: sequences prefixed, objects inlined.
    pub(crate) fn write_value(
        &self,
        ty: &FieldType,
        value: &WireValue,
        w: &mut WireWriter,
    ) -> Result<()> {
        match (ty, value) {
            (FieldType::Scalar(kind), _) => write_scalar(*kind, value, w),
            (FieldType::String, WireValue::String(s)) => write_str(w, s),
            (FieldType::Bytes, WireValue::Bytes(b)) => write_bytes(w, b),
            (FieldType::Id128, WireValue::Id(id)) => {
                id.write(w);
                Ok(())
            }
            (FieldType::Enum(def), _) => write_enum(def, value, w),
            (FieldType::Object(name), WireValue::Object(obj)) => {
                if obj.type_name() != name {
                    return Err(CodecError::TypeMismatch {
                        expected: ty.describe(),
                        found: format!("object {}", obj.type_name()),
                    });
                }
                let schema = self.registry.resolve(name)?;
                self.write_object(&schema, obj, w)
            }
            (FieldType::List { element, .. }, WireValue::List(items)) => {
                CollectionCodec::new(self).write(element, items, CountPolicy::Prefixed, w)
            }
            _ => Err(mismatch(ty, value)),
        }
    }

    pub(crate) fn read_value(&self, ty: &FieldType, r: &mut WireReader) -> Result<WireValue> {
        match ty {
            FieldType::Scalar(kind) => read_scalar(*kind, r),
            FieldType::String => Ok(WireValue::String(read_str(r)?)),
            FieldType::Bytes => Ok(WireValue::Bytes(read_bytes(r)?)),
            FieldType::Id128 => Ok(WireValue::Id(Id128::read(r)?)),
            FieldType::Enum(def) => read_enum(def, r),
            FieldType::Object(name) => {
                let schema = self.registry.resolve(name)?;
                Ok(WireValue::Object(self.read_object(&schema, r)?))
            }
            FieldType::List { element, pooled } => Ok(WireValue::List(
                CollectionCodec::new(self).read(element, *pooled, CountPolicy::Prefixed, r)?,
            )),
        }
    }

    pub(crate) fn recycle_value(&self, ty: &FieldType, value: WireValue) {
        match (ty, value) {
            (FieldType::Object(_), WireValue::Object(obj)) => self.recycle(obj),
            (FieldType::List { element, pooled }, WireValue::List(items)) => {
                self.recycle_items(element, *pooled, items)
            }
            _ => {}
        }
    }

    pub(crate) fn recycle_items(
        &self,
        element: &FieldType,
        pooled: bool,
        mut items: Vec<WireValue>,
    ) {
        if matches!(element, FieldType::Object(_) | FieldType::List { .. }) {
            for item in items.drain(..) {
                self.recycle_value(element, item);
            }
        }
        if pooled {
            self.pools.release(items);
        }
    }
}

/// Byte length of a raw string/bytes region, if the field has one.
///
/// A fixed count sets it; otherwise a fixed slot does.
fn raw_region(slot: Option<usize>, count: CountPolicy) -> Option<usize> {
    match count {
        CountPolicy::Exact(n) => Some(n),
        CountPolicy::Prefixed => slot,
    }
}

fn mismatch(ty: &FieldType, found: &WireValue) -> CodecError {
    CodecError::TypeMismatch {
        expected: ty.describe(),
        found: found.kind_name().to_string(),
    }
}

fn write_scalar(kind: ScalarKind, value: &WireValue, w: &mut WireWriter) -> Result<()> {
    match (kind, value) {
        (ScalarKind::Bool, WireValue::Bool(v)) => w.put(*v),
        (ScalarKind::I8, WireValue::I8(v)) => w.put(*v),
        (ScalarKind::U8, WireValue::U8(v)) => w.put(*v),
        (ScalarKind::I16, WireValue::I16(v)) => w.put(*v),
        (ScalarKind::U16, WireValue::U16(v)) => w.put(*v),
        (ScalarKind::I32, WireValue::I32(v)) => w.put(*v),
        (ScalarKind::U32, WireValue::U32(v)) => w.put(*v),
        (ScalarKind::I64, WireValue::I64(v)) => w.put(*v),
        (ScalarKind::U64, WireValue::U64(v)) => w.put(*v),
        (ScalarKind::F32, WireValue::F32(v)) => w.put(*v),
        (ScalarKind::F64, WireValue::F64(v)) => w.put(*v),
        _ => return Err(mismatch(&FieldType::Scalar(kind), value)),
    }
    Ok(())
}

fn read_scalar(kind: ScalarKind, r: &mut WireReader) -> Result<WireValue> {
    Ok(match kind {
        ScalarKind::Bool => WireValue::Bool(r.read()?),
        ScalarKind::I8 => WireValue::I8(r.read()?),
        ScalarKind::U8 => WireValue::U8(r.read()?),
        ScalarKind::I16 => WireValue::I16(r.read()?),
        ScalarKind::U16 => WireValue::U16(r.read()?),
        ScalarKind::I32 => WireValue::I32(r.read()?),
        ScalarKind::U32 => WireValue::U32(r.read()?),
        ScalarKind::I64 => WireValue::I64(r.read()?),
        ScalarKind::U64 => WireValue::U64(r.read()?),
        ScalarKind::F32 => WireValue::F32(r.read()?),
        ScalarKind::F64 => WireValue::F64(r.read()?),
    })
}

fn put_int<T: WireInteger>(w: &mut WireWriter, value: i64) -> bool {
    match T::from_i64(value) {
        Some(v) => {
            w.put(v);
            true
        }
        None => false,
    }
}

fn get_int<T: WireInteger>(r: &mut WireReader) -> Result<i64> {
    Ok(r.read::<T>()?.to_i64())
}

/// Enums accept any integer value that fits the representation.
fn write_enum(def: &EnumDef, value: &WireValue, w: &mut WireWriter) -> Result<()> {
    let raw = value.as_i64().ok_or_else(|| CodecError::TypeMismatch {
        expected: format!("enum {}", def.name),
        found: value.kind_name().to_string(),
    })?;
    let fits = match def.repr {
        ScalarKind::I8 => put_int::<i8>(w, raw),
        ScalarKind::U8 => put_int::<u8>(w, raw),
        ScalarKind::I16 => put_int::<i16>(w, raw),
        ScalarKind::U16 => put_int::<u16>(w, raw),
        ScalarKind::I32 => put_int::<i32>(w, raw),
        ScalarKind::U32 => put_int::<u32>(w, raw),
        ScalarKind::I64 => put_int::<i64>(w, raw),
        ScalarKind::U64 => put_int::<u64>(w, raw),
        ScalarKind::Bool | ScalarKind::F32 | ScalarKind::F64 => false,
    };
    if !fits {
        return Err(CodecError::TypeMismatch {
            expected: format!("enum {} ({})", def.name, def.repr.name()),
            found: raw.to_string(),
        });
    }
    Ok(())
}

/// Undeclared discriminants decode as-is.
fn read_enum(def: &EnumDef, r: &mut WireReader) -> Result<WireValue> {
    let raw = match def.repr {
        ScalarKind::I8 => get_int::<i8>(r)?,
        ScalarKind::U8 => get_int::<u8>(r)?,
        ScalarKind::I16 => get_int::<i16>(r)?,
        ScalarKind::U16 => get_int::<u16>(r)?,
        ScalarKind::I32 => get_int::<i32>(r)?,
        ScalarKind::U32 => get_int::<u32>(r)?,
        ScalarKind::I64 => get_int::<i64>(r)?,
        ScalarKind::U64 => get_int::<u64>(r)?,
        ScalarKind::Bool | ScalarKind::F32 | ScalarKind::F64 => {
            return Err(CodecError::SchemaValidation(format!(
                "enum {} has non-integer representation {}",
                def.name,
                def.repr.name()
            )))
        }
    };
    Ok(WireValue::Enum(raw))
}
