//! Bounds-checked read cursor over one record.
//!
//! The reader owns a cheap clone of the record as `bytes::Bytes`, so byte
//! fields and the dynamic tail can be handed out as zero-copy sub-views.
//!
//! # Example
//!
//! ```
//! use fieldwire::wire::WireReader;
//!
//! let mut reader = WireReader::from_slice(&[0x07, 0x00, 0x00, 0x00, 0xAA]);
//! assert_eq!(reader.read::<u32>().unwrap(), 7);
//! assert_eq!(reader.position(), 4);
//! assert_eq!(reader.rest().as_ref(), &[0xAA]);
//! ```

use bytes::Bytes;

use super::scalar::WireScalar;
use crate::config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
use crate::error::{CodecError, Result};

/// Read cursor over a single record.
///
/// The cursor only moves forward. Every read checks bounds first and fails
/// with [`CodecError::BufferUnderrun`] without advancing.
#[derive(Debug, Clone)]
pub struct WireReader {
    /// Record bytes.
    buf: Bytes,
    /// Current offset into `buf`.
    pos: usize,
    /// Largest length prefix accepted.
    max_length: usize,
    /// Objects currently being decoded.
    depth: usize,
    /// Deepest object nesting accepted.
    max_depth: usize,
}

impl WireReader {
    /// Create a reader over a record (zero-copy).
    pub fn new(buf: Bytes) -> Self {
        Self {
            buf,
            pos: 0,
            max_length: DEFAULT_MAX_LENGTH,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a reader from a borrowed slice (copies once).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Set the largest length prefix this reader accepts.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Largest length prefix accepted.
    #[inline]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Set the deepest object nesting this reader accepts.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Deepest object nesting accepted.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of objects entered and not yet left.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter one nested object.
    ///
    /// Fails with [`CodecError::DepthLimitExceeded`] without changing the
    /// depth. Every successful call must be paired with [`leave`](Self::leave).
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

    /// Current cursor offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the record.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Check if the cursor reached the end of the record.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Total record length.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(CodecError::BufferUnderrun {
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&[u8]> {
        self.ensure(n)?;
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    /// Return the next `n` bytes as a shared view (no copy) and advance.
    pub fn take_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.ensure(n)?;
        let view = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(view)
    }

    /// Read exactly `N` bytes into an array.
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Skip `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Consume everything left in the record.
    pub fn rest(&mut self) -> Bytes {
        let view = self.buf.slice(self.pos..);
        self.pos = self.buf.len();
        view
    }

    /// Read one fixed-width scalar.
    #[inline]
    pub fn read<T: WireScalar>(&mut self) -> Result<T> {
        T::get(self)
    }
}
