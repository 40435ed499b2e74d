//! Append-only write buffer.
//!
//! Backed by `bytes::BytesMut`; `into_bytes` freezes the encoded record
//! without copying.

use bytes::{BufMut, Bytes, BytesMut};

use super::scalar::WireScalar;
use crate::config::{
    ABSOLUTE_MAX_LENGTH, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH,
};
use crate::error::{CodecError, Result};

/// Write buffer for one encode call.
///
/// Carries the same length and depth limits as [`WireReader`](super::WireReader),
/// so a writer never produces a record the matching reader rejects.
#[derive(Debug)]
pub struct WireWriter {
    buf: BytesMut,
    /// Largest length prefix written.
    max_length: usize,
    /// Objects currently being encoded.
    depth: usize,
    /// Deepest object nesting accepted.
    max_depth: usize,
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WireWriter {
    /// Create a writer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Create a writer with a custom initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            max_length: DEFAULT_MAX_LENGTH,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the largest length prefix this writer emits.
    ///
    /// Capped at the largest value a signed 32-bit prefix can hold.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.min(ABSOLUTE_MAX_LENGTH);
        self
    }

    /// Set the deepest object nesting this writer accepts.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Largest length prefix written.
    #[inline]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Enter one nested object, failing past the depth limit.
    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                depth: self.depth + 1,
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave the object entered last.
    #[inline]
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Bytes written so far (the write cursor).
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append raw bytes.
    #[inline]
    pub fn put_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Append `n` zero bytes.
    #[inline]
    pub fn put_zeros(&mut self, n: usize) {
        self.buf.put_bytes(0, n);
    }

    /// Append one fixed-width scalar.
    #[inline]
    pub fn put<T: WireScalar>(&mut self, value: T) {
        value.put(self);
    }

    /// View the encoded bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Discard everything written.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.depth = 0;
    }

    /// Freeze the encoded record (zero-copy).
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}
