//! Codec configuration.
//!
//! Limits that protect the codec from corrupt length prefixes and runaway
//! nesting, and sizing
//! for the writer and the pooled free-lists. Can be built in code or loaded
//! from JSON:
//!
//! ```
//! use fieldwire::CodecConfig;
//!
//! let config = CodecConfig::from_json(r#"{ "max_length": 4096 }"#).unwrap();
//! assert_eq!(config.max_length, 4096);
//! assert_eq!(config.pool_capacity, fieldwire::config::DEFAULT_POOL_CAPACITY);
//! ```

use serde::Deserialize;

use crate::error::{CodecError, Result};

/// Default maximum accepted length or count prefix (16 MiB).
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024 * 1024;

/// Default maximum nesting depth of inlined objects.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default number of idle instances each pool retains.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Default writer pre-allocation in bytes.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Absolute maximum for a length prefix (max i32).
pub const ABSOLUTE_MAX_LENGTH: usize = i32::MAX as usize;

/// Runtime settings for the codec.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Largest length or element count accepted from a prefix on the wire.
    pub max_length: usize,
    /// Deepest chain of nested objects coded in one call.
    pub max_depth: usize,
    /// Idle instances kept per pooled container type.
    pub pool_capacity: usize,
    /// Initial capacity of encode buffers.
    pub initial_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl CodecConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum accepted length prefix.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the maximum object nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the per-type pool retention.
    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    /// Set the initial encode buffer capacity.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.max_length > ABSOLUTE_MAX_LENGTH {
            return Err(CodecError::Config(format!(
                "max_length {} exceeds absolute maximum {}",
                self.max_length, ABSOLUTE_MAX_LENGTH
            )));
        }
        if self.max_depth == 0 {
            return Err(CodecError::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::new();
        assert_eq!(config.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.pool_capacity, DEFAULT_POOL_CAPACITY);
        assert_eq!(config.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = CodecConfig::new()
            .with_max_length(100)
            .with_pool_capacity(2)
            .with_initial_capacity(16);
        assert_eq!(config.max_length, 100);
        assert_eq!(config.pool_capacity, 2);
        assert_eq!(config.initial_capacity, 16);
    }

    #[test]
    fn test_from_json_partial() {
        let config = CodecConfig::from_json(r#"{"pool_capacity": 8}"#).unwrap();
        assert_eq!(config.pool_capacity, 8);
        assert_eq!(config.max_length, DEFAULT_MAX_LENGTH);
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let result = CodecConfig::from_json(r#"{"max_payload": 8}"#);
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn test_validate_max_length_too_large() {
        let config = CodecConfig::new().with_max_length(ABSOLUTE_MAX_LENGTH + 1);
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("exceeds absolute maximum"));
    }

    #[test]
    fn test_validate_zero_depth() {
        let config = CodecConfig::new().with_max_depth(0);
        assert!(matches!(config.validate(), Err(CodecError::Config(_))));
        assert!(CodecConfig::from_json(r#"{"max_depth": 8}"#).is_ok());
    }
}
