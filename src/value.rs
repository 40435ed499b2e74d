//! Dynamic values produced and consumed by the schema-driven codec.
//!
//! [`WireValue`] is the decoded form of one field; [`ObjectValue`] is one
//! object instance: its type name, named field values in declaration order,
//! and the raw trailing bytes of a dynamic type.
//!
//! # Example
//!
//! ```
//! use fieldwire::{ObjectValue, WireValue};
//!
//! let obj = ObjectValue::new("ProtoTest")
//!     .with("U0", 7u32)
//!     .with("U1", vec![WireValue::U32(1), WireValue::U32(2)]);
//!
//! assert_eq!(obj.get("U0"), Some(&WireValue::U32(7)));
//! assert_eq!(obj.get("U1").and_then(WireValue::as_list).map(|l| l.len()), Some(2));
//! ```

use bytes::Bytes;

use crate::schema::{FieldType, ScalarKind};
use crate::wire::Id128;

/// Decoded value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// bool
    Bool(bool),
    /// i8
    I8(i8),
    /// u8
    U8(u8),
    /// i16
    I16(i16),
    /// u16
    U16(u16),
    /// i32
    I32(i32),
    /// u32
    U32(u32),
    /// i64
    I64(i64),
    /// u64
    U64(u64),
    /// f32
    F32(f32),
    /// f64
    F64(f64),
    /// UTF-8 string.
    String(String),
    /// Raw bytes (zero-copy view into the decoded record).
    Bytes(Bytes),
    /// 128-bit identifier.
    Id(Id128),
    /// Enum discriminant, whether or not it names a declared variant.
    Enum(i64),
    /// Nested object.
    Object(ObjectValue),
    /// Collection.
    List(Vec<WireValue>),
}

impl WireValue {
    /// Zero value for a scalar kind.
    pub fn zero(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => WireValue::Bool(false),
            ScalarKind::I8 => WireValue::I8(0),
            ScalarKind::U8 => WireValue::U8(0),
            ScalarKind::I16 => WireValue::I16(0),
            ScalarKind::U16 => WireValue::U16(0),
            ScalarKind::I32 => WireValue::I32(0),
            ScalarKind::U32 => WireValue::U32(0),
            ScalarKind::I64 => WireValue::I64(0),
            ScalarKind::U64 => WireValue::U64(0),
            ScalarKind::F32 => WireValue::F32(0.0),
            ScalarKind::F64 => WireValue::F64(0.0),
        }
    }

    /// Neutral value written for absent fields and filler elements.
    pub fn neutral(ty: &FieldType) -> Self {
        match ty {
            FieldType::Scalar(kind) => Self::zero(*kind),
            FieldType::String => WireValue::String(String::new()),
            FieldType::Bytes => WireValue::Bytes(Bytes::new()),
            FieldType::Id128 => WireValue::Id(Id128::NIL),
            FieldType::Enum(_) => WireValue::Enum(0),
            FieldType::Object(name) => WireValue::Object(ObjectValue::new(name)),
            FieldType::List { .. } => WireValue::List(Vec::new()),
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            WireValue::Bool(_) => "bool",
            WireValue::I8(_) => "i8",
            WireValue::U8(_) => "u8",
            WireValue::I16(_) => "i16",
            WireValue::U16(_) => "u16",
            WireValue::I32(_) => "i32",
            WireValue::U32(_) => "u32",
            WireValue::I64(_) => "i64",
            WireValue::U64(_) => "u64",
            WireValue::F32(_) => "f32",
            WireValue::F64(_) => "f64",
            WireValue::String(_) => "string",
            WireValue::Bytes(_) => "bytes",
            WireValue::Id(_) => "id128",
            WireValue::Enum(_) => "enum",
            WireValue::Object(_) => "object",
            WireValue::List(_) => "list",
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WireValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer value widened to i64 (enums included).
    ///
    /// Returns `None` for non-integers and for `u64` values above `i64::MAX`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            WireValue::I8(v) => Some(v.into()),
            WireValue::U8(v) => Some(v.into()),
            WireValue::I16(v) => Some(v.into()),
            WireValue::U16(v) => Some(v.into()),
            WireValue::I32(v) => Some(v.into()),
            WireValue::U32(v) => Some(v.into()),
            WireValue::I64(v) => Some(v),
            WireValue::U64(v) => i64::try_from(v).ok(),
            WireValue::Enum(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            WireValue::Bytes(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_id(&self) -> Option<Id128> {
        match self {
            WireValue::Id(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            WireValue::Object(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[WireValue]> {
        match self {
            WireValue::List(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for WireValue {
                #[inline]
                fn from(v: $ty) -> Self {
                    WireValue::$variant(v)
                }
            }
        )*
    };
}

from_scalar! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Bytes => Bytes,
    Id128 => Id,
    ObjectValue => Object,
    Vec<WireValue> => List,
}

impl From<&str> for WireValue {
    fn from(v: &str) -> Self {
        WireValue::String(v.to_string())
    }
}

/// One object instance.
///
/// Fields are kept in insertion order; the decoder inserts them in wire
/// order. Equality ignores field order. A field that is missing when
/// encoding is written as its neutral value; a conditional field whose
/// guard was false is missing after decoding.
#[derive(Debug, Clone, Default)]
pub struct ObjectValue {
    type_name: String,
    fields: Vec<(String, WireValue)>,
    tail: Bytes,
}

impl ObjectValue {
    /// Create an empty instance of `type_name`.
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            fields: Vec::new(),
            tail: Bytes::new(),
        }
    }

    /// Create an empty instance with room for `capacity` fields.
    pub fn with_capacity(type_name: &str, capacity: usize) -> Self {
        Self {
            type_name: type_name.to_string(),
            fields: Vec::with_capacity(capacity),
            tail: Bytes::new(),
        }
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set a field, builder style.
    pub fn with(mut self, name: &str, value: impl Into<WireValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<WireValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut WireValue> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Remove a field and return its value.
    pub fn remove(&mut self, name: &str) -> Option<WireValue> {
        let index = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(index).1)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Consume the object, yielding its fields.
    pub fn into_fields(self) -> Vec<(String, WireValue)> {
        self.fields
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw trailing bytes of a dynamic type.
    #[inline]
    pub fn tail(&self) -> &Bytes {
        &self.tail
    }

    pub fn set_tail(&mut self, tail: Bytes) {
        self.tail = tail;
    }

    pub fn with_tail(mut self, tail: impl Into<Bytes>) -> Self {
        self.tail = tail.into();
        self
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.tail == other.tail
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}
