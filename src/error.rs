//! Error types for fieldwire.

use thiserror::Error;

/// Main error type for all encode, decode and schema operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A read needed more bytes than remain in the record.
    #[error("Buffer underrun at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun {
        /// Cursor position when the read was attempted.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the record.
        remaining: usize,
    },

    /// A fixed-length slot is smaller than the value that must go in it.
    #[error("Field length {len} exceeds fixed slot of {slot} bytes")]
    FieldLengthExceeded {
        /// Natural encoded length of the value.
        len: usize,
        /// Declared slot size.
        slot: usize,
    },

    /// A collection holds more elements than its fixed count allows.
    #[error("Element count {count} exceeds fixed count {limit}")]
    CountExceeded {
        /// Actual or referenced element count.
        count: usize,
        /// Declared count or maximum.
        limit: usize,
    },

    /// A length prefix on the wire is negative.
    #[error("Invalid length prefix: {0}")]
    InvalidLength(i32),

    /// A length prefix on the wire exceeds the configured maximum.
    #[error("Length prefix {len} exceeds maximum {limit}")]
    LengthLimitExceeded {
        /// Length read from the wire.
        len: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Objects are nested deeper than the configured maximum.
    #[error("Nesting depth {depth} exceeds maximum {limit}")]
    DepthLimitExceeded {
        /// Depth the codec tried to enter.
        depth: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// String bytes on the wire are not valid UTF-8.
    #[error("Invalid UTF-8 in string payload")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A typed enum received a discriminant it does not declare.
    #[error("Invalid value {value} for enum {enum_name}")]
    InvalidEnumValue {
        /// Enum type name.
        enum_name: &'static str,
        /// Raw discriminant read from the wire.
        value: i64,
    },

    /// A value does not match the semantic type its field declares.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type the schema declares.
        expected: String,
        /// Type of the supplied value.
        found: String,
    },

    /// A schema name was not found in the registry.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// A schema cannot be mapped to a valid layout.
    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    /// Invalid codec configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON error while loading schemas or configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error raised while coding one field of an object.
    #[error("{type_name}.{field}: {source}")]
    Field {
        /// Declaring type of the field.
        type_name: String,
        /// Field name.
        field: String,
        /// Underlying error.
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Wrap this error with the field it occurred in.
    pub fn in_field(self, type_name: &str, field: &str) -> Self {
        tracing::debug!("Error in field {}.{}: {}", type_name, field, self);
        CodecError::Field {
            type_name: type_name.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Strip any field context and return the underlying error.
    pub fn root_cause(&self) -> &CodecError {
        match self {
            CodecError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias using CodecError.
pub type Result<T> = std::result::Result<T, CodecError>;
