//! Dynamic tail - pass-through for trailing raw bytes.
//!
//! A dynamic type ends with a region that has no prefix and no declared
//! length: on write its raw content is appended as-is, on read it is
//! whatever is left of the record.
//!
//! # Example
//!
//! ```
//! use fieldwire::codec::TailCodec;
//! use fieldwire::wire::{WireReader, WireWriter};
//!
//! let mut w = WireWriter::new();
//! w.put(7u8);
//! TailCodec::append(&mut w, b"future fields");
//!
//! let record = w.into_bytes();
//! let mut r = WireReader::new(record.clone());
//! assert_eq!(r.read::<u8>().unwrap(), 7);
//!
//! // Zero-copy: the tail is a view into the record
//! let tail = TailCodec::capture(&mut r);
//! assert_eq!(&tail[..], b"future fields");
//! assert_eq!(tail.as_ptr(), record[1..].as_ptr());
//! ```

use bytes::Bytes;

use crate::wire::{WireReader, WireWriter};

/// Codec for the trailing raw region of dynamic types.
pub struct TailCodec;

impl TailCodec {
    /// Append raw bytes with no prefix.
    #[inline]
    pub fn append(w: &mut WireWriter, tail: &[u8]) {
        w.put_slice(tail);
    }

    /// Consume every remaining byte of the record (zero-copy).
    #[inline]
    pub fn capture(r: &mut WireReader) -> Bytes {
        r.rest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_has_no_prefix() {
        let mut w = WireWriter::new();
        TailCodec::append(&mut w, b"abc");
        assert_eq!(w.as_slice(), b"abc");
    }

    #[test]
    fn test_capture_empty_when_nothing_left() {
        let mut r = WireReader::from_slice(&[1, 2]);
        r.skip(2).unwrap();
        assert!(TailCodec::capture(&mut r).is_empty());
    }

    #[test]
    fn test_capture_consumes_rest() {
        let mut r = WireReader::from_slice(&[1, 2, 3, 4]);
        r.skip(1).unwrap();
        let tail = TailCodec::capture(&mut r);
        assert_eq!(&tail[..], &[2, 3, 4]);
        assert!(r.is_empty());
        assert_eq!(r.position(), 4);
    }

    #[test]
    fn test_binary_data_preserved() {
        let all_bytes: Vec<u8> = (0..=255).collect();
        let mut w = WireWriter::new();
        TailCodec::append(&mut w, &all_bytes);
        let mut r = WireReader::new(w.into_bytes());
        assert_eq!(&TailCodec::capture(&mut r)[..], &all_bytes[..]);
    }
}
