//! Schema data model.
//!
//! A [`Schema`] is an ordered list of [`Field`]s plus an optional parent and
//! a `dynamic` flag. Schemas are plain data: they can be built in code with
//! the builder methods or deserialized from JSON.
//!
//! ```json
//! {
//!   "name": "ProtoTest",
//!   "fields": [
//!     { "name": "U0", "type": { "scalar": "u32" } },
//!     { "name": "U1", "type": { "list": { "element": { "scalar": "u32" } } } },
//!     { "name": "U2", "type": { "enum": { "name": "EnumTest", "repr": "i32" } } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Fixed-width scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// 1 byte, 0x00 or 0x01.
    Bool,
    /// Signed 8-bit.
    I8,
    /// Unsigned 8-bit.
    U8,
    /// Signed 16-bit.
    I16,
    /// Unsigned 16-bit.
    U16,
    /// Signed 32-bit.
    I32,
    /// Unsigned 32-bit.
    U32,
    /// Signed 64-bit.
    I64,
    /// Unsigned 64-bit.
    U64,
    /// 32-bit IEEE float.
    F32,
    /// 64-bit IEEE float.
    F64,
}

impl ScalarKind {
    /// Encoded width in bytes.
    pub fn width(self) -> usize {
        match self {
            ScalarKind::Bool | ScalarKind::I8 | ScalarKind::U8 => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
        }
    }

    /// Wire type name.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::U8 => "u8",
            ScalarKind::I16 => "i16",
            ScalarKind::U16 => "u16",
            ScalarKind::I32 => "i32",
            ScalarKind::U32 => "u32",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
    }

    /// Check if this kind is an integer (usable as a count or enum repr).
    pub fn is_integer(self) -> bool {
        !matches!(self, ScalarKind::Bool | ScalarKind::F32 | ScalarKind::F64)
    }
}

/// One named enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Discriminant.
    pub value: i64,
}

/// Enum definition, encoded as its underlying integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    /// Enum type name.
    pub name: String,
    /// Underlying integer kind.
    pub repr: ScalarKind,
    /// Declared variants (informational; undeclared values still decode).
    #[serde(default)]
    pub variants: Vec<EnumVariant>,
}

impl EnumDef {
    /// Create an enum with no variants yet.
    pub fn new(name: &str, repr: ScalarKind) -> Self {
        Self {
            name: name.to_string(),
            repr,
            variants: Vec::new(),
        }
    }

    /// Add a variant.
    pub fn variant(mut self, name: &str, value: i64) -> Self {
        self.variants.push(EnumVariant {
            name: name.to_string(),
            value,
        });
        self
    }

    /// Variant name for a discriminant.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }

    /// Discriminant for a variant name.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.variants.iter().find(|v| v.name == name).map(|v| v.value)
    }
}

/// Semantic type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Fixed-width scalar.
    Scalar(ScalarKind),
    /// UTF-8 string.
    String,
    /// Raw byte sequence.
    Bytes,
    /// 128-bit identifier.
    Id128,
    /// Enum over an integer representation.
    Enum(EnumDef),
    /// Nested object, by schema name.
    Object(String),
    /// Sequence of elements.
    List {
        /// Element type.
        element: Box<FieldType>,
        /// Decode into storage checked out from the pool.
        #[serde(default)]
        pooled: bool,
    },
}

impl FieldType {
    /// Shorthand for a scalar field type.
    pub fn scalar(kind: ScalarKind) -> Self {
        FieldType::Scalar(kind)
    }

    /// Shorthand for a nested object type.
    pub fn object(name: &str) -> Self {
        FieldType::Object(name.to_string())
    }

    /// An owned list of `element`.
    pub fn list(element: FieldType) -> Self {
        FieldType::List {
            element: Box::new(element),
            pooled: false,
        }
    }

    /// A list whose storage comes from the pool on decode.
    pub fn pooled_list(element: FieldType) -> Self {
        FieldType::List {
            element: Box::new(element),
            pooled: true,
        }
    }

    /// Check if this type carries a length (string, bytes or list).
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            FieldType::String | FieldType::Bytes | FieldType::List { .. }
        )
    }

    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Scalar(kind) => kind.name().to_string(),
            FieldType::String => "string".to_string(),
            FieldType::Bytes => "bytes".to_string(),
            FieldType::Id128 => "id128".to_string(),
            FieldType::Enum(def) => format!("enum {}", def.name),
            FieldType::Object(name) => format!("object {}", name),
            FieldType::List { element, .. } => format!("list<{}>", element.describe()),
        }
    }
}

/// Where a fixed element count comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountSource {
    /// Compile-time constant.
    Const(usize),
    /// Value of an earlier integer field, optionally bounded.
    Field {
        /// Referenced field name.
        field: String,
        /// Largest count the reference may hold.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
}

/// One field of a schema: name, type and layout modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    /// Field name, unique across the inheritance chain.
    pub name: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Occupy exactly this many bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_length: Option<usize>,
    /// Element count is known, not prefixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_count: Option<CountSource>,
    /// Present only when this earlier bool field is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Ordered field description of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    /// Type name.
    pub name: String,
    /// Base type, coded before this type's own fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Capture trailing bytes after the declared fields.
    #[serde(default)]
    pub dynamic: bool,
    /// Own fields in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Schema {
    /// Look up one of this schema's own fields.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
