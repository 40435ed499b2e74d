//! Schema builder and single-schema validation.
//!
//! # Example
//!
//! ```
//! use fieldwire::schema::{Field, FieldType, ScalarKind, Schema};
//!
//! let schema = Schema::builder("Packet")
//!     .field(Field::new("has_name", FieldType::Scalar(ScalarKind::Bool)))
//!     .field(Field::new("name", FieldType::String).fixed_length(16).when("has_name"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.fields.len(), 2);
//! ```

use std::collections::HashSet;

use super::types::{CountSource, Field, FieldType, Schema};
use crate::error::{CodecError, Result};

impl Field {
    /// Create a field with no layout modifiers.
    pub fn new(name: &str, ty: FieldType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            fixed_length: None,
            fixed_count: None,
            condition: None,
        }
    }

    /// Occupy exactly `n` bytes on the wire.
    pub fn fixed_length(mut self, n: usize) -> Self {
        self.fixed_length = Some(n);
        self
    }

    /// Exactly `n` elements (or bytes for strings), no prefix.
    pub fn fixed_count(mut self, n: usize) -> Self {
        self.fixed_count = Some(CountSource::Const(n));
        self
    }

    /// Element count taken from an earlier integer field.
    pub fn count_from(mut self, field: &str) -> Self {
        self.fixed_count = Some(CountSource::Field {
            field: field.to_string(),
            max: None,
        });
        self
    }

    /// Element count taken from an earlier integer field, at most `max`.
    pub fn count_from_max(mut self, field: &str, max: usize) -> Self {
        self.fixed_count = Some(CountSource::Field {
            field: field.to_string(),
            max: Some(max),
        });
        self
    }

    /// Present only when the earlier bool field `guard` is true.
    pub fn when(mut self, guard: &str) -> Self {
        self.condition = Some(guard.to_string());
        self
    }

    /// Check that this field's type and modifiers map to a valid layout.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| {
            Err(CodecError::SchemaValidation(format!(
                "field '{}': {}",
                self.name, msg
            )))
        };

        if self.name.is_empty() {
            return Err(CodecError::SchemaValidation(
                "field name must not be empty".to_string(),
            ));
        }

        if self.fixed_length == Some(0) {
            return fail("fixed length must be greater than 0");
        }

        if let Some(count) = &self.fixed_count {
            if !self.ty.is_sequence() {
                return fail(&format!(
                    "fixed count is not valid for {}",
                    self.ty.describe()
                ));
            }
            match count {
                CountSource::Field { field, max } => {
                    if field == &self.name {
                        return fail("fixed count cannot reference the field itself");
                    }
                    if *max == Some(0) {
                        return fail("fixed count max must be greater than 0");
                    }
                }
                CountSource::Const(n) => {
                    // Strings and bytes: the count is a byte count
                    if let (Some(len), FieldType::String | FieldType::Bytes) =
                        (self.fixed_length, &self.ty)
                    {
                        if *n > len {
                            return fail(&format!(
                                "fixed count {} exceeds fixed length {}",
                                n, len
                            ));
                        }
                    }
                }
            }
        }

        if let FieldType::List { .. } = self.ty {
            if self.fixed_length.is_some() && self.fixed_count.is_none() {
                return fail("a list with a fixed length also needs a fixed count");
            }
        }

        if self.condition.as_deref() == Some(self.name.as_str()) {
            return fail("condition cannot reference the field itself");
        }

        validate_type(&self.ty).map_err(|msg| {
            CodecError::SchemaValidation(format!("field '{}': {}", self.name, msg))
        })
    }
}

fn validate_type(ty: &FieldType) -> std::result::Result<(), String> {
    match ty {
        FieldType::Enum(def) if !def.repr.is_integer() => Err(format!(
            "enum {} must use an integer representation, not {}",
            def.name,
            def.repr.name()
        )),
        FieldType::Object(name) if name.is_empty() => {
            Err("object type name must not be empty".to_string())
        }
        FieldType::List { element, .. } => validate_type(element),
        _ => Ok(()),
    }
}

impl Schema {
    /// Start building a schema.
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Check this schema on its own (no cross-type checks).
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CodecError::SchemaValidation(
                "schema name must not be empty".to_string(),
            ));
        }
        if self.parent.as_deref() == Some(self.name.as_str()) {
            return Err(CodecError::SchemaValidation(format!(
                "schema '{}' cannot be its own parent",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            field
                .validate()
                .map_err(|e| e.in_field(&self.name, &field.name))?;
            if !seen.insert(field.name.as_str()) {
                return Err(CodecError::SchemaValidation(format!(
                    "schema '{}' declares field '{}' twice",
                    self.name, field.name
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create a builder for a type with no fields.
    pub fn new(name: &str) -> Self {
        Self {
            schema: Schema {
                name: name.to_string(),
                parent: None,
                dynamic: false,
                fields: Vec::new(),
            },
        }
    }

    /// Set the base type.
    pub fn parent(mut self, parent: &str) -> Self {
        self.schema.parent = Some(parent.to_string());
        self
    }

    /// Capture all trailing bytes after the declared fields.
    pub fn dynamic(mut self) -> Self {
        self.schema.dynamic = true;
        self
    }

    /// Append a field.
    pub fn field(mut self, field: Field) -> Self {
        self.schema.fields.push(field);
        self
    }

    /// Validate and return the schema.
    pub fn build(self) -> Result<Schema> {
        self.schema.validate()?;
        Ok(self.schema)
    }
}
