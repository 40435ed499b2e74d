//! Length prefixes, fixed slots and string/byte payloads.
//!
//! These helpers are the single implementation of the layout rules shared
//! by the schema interpreter and by typed (generated) code:
//!
//! ```text
//! prefixed payload   [len: i32 LE][payload: len bytes]
//! fixed slot (N)     [natural encoding][0x00 padding up to N bytes]
//! ```

use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::wire::{WireReader, WireWriter};

/// Write a 4-byte little-endian signed length or count prefix.
///
/// Lengths above the writer's `max_length` are rejected, mirroring
/// [`read_length`].
pub fn write_length(w: &mut WireWriter, len: usize) -> Result<()> {
    if len > w.max_length() {
        return Err(CodecError::LengthLimitExceeded {
            len,
            limit: w.max_length(),
        });
    }
    w.put(len as i32);
    Ok(())
}

/// Read a 4-byte little-endian signed length or count prefix.
///
/// Negative prefixes and prefixes above the reader's `max_length` are
/// rejected before anything is allocated.
pub fn read_length(r: &mut WireReader) -> Result<usize> {
    let raw = r.read::<i32>()?;
    if raw < 0 {
        return Err(CodecError::InvalidLength(raw));
    }
    let len = raw as usize;
    if len > r.max_length() {
        return Err(CodecError::LengthLimitExceeded {
            len,
            limit: r.max_length(),
        });
    }
    Ok(len)
}

/// Run `f` and pad its output with zeros up to exactly `slot` bytes.
///
/// Fails with [`CodecError::FieldLengthExceeded`] if `f` wrote more than
/// `slot` bytes. Bytes already written are left in place.
pub fn write_slot<F>(w: &mut WireWriter, slot: usize, f: F) -> Result<()>
where
    F: FnOnce(&mut WireWriter) -> Result<()>,
{
    let start = w.position();
    f(w)?;
    let written = w.position() - start;
    if written > slot {
        return Err(CodecError::FieldLengthExceeded { len: written, slot });
    }
    w.put_zeros(slot - written);
    Ok(())
}

/// Run `f` and then skip whatever is left of a `slot`-byte region.
pub fn read_slot<T, F>(r: &mut WireReader, slot: usize, f: F) -> Result<T>
where
    F: FnOnce(&mut WireReader) -> Result<T>,
{
    let start = r.position();
    let value = f(r)?;
    let consumed = r.position() - start;
    if consumed > slot {
        return Err(CodecError::FieldLengthExceeded {
            len: consumed,
            slot,
        });
    }
    r.skip(slot - consumed)?;
    Ok(value)
}

/// Write raw bytes into a fixed region of `n` bytes, zero-padded.
pub fn write_padded(w: &mut WireWriter, data: &[u8], n: usize) -> Result<()> {
    if data.len() > n {
        return Err(CodecError::FieldLengthExceeded {
            len: data.len(),
            slot: n,
        });
    }
    w.put_slice(data);
    w.put_zeros(n - data.len());
    Ok(())
}

/// Write a length-prefixed UTF-8 string (prefix counts bytes).
pub fn write_str(w: &mut WireWriter, value: &str) -> Result<()> {
    write_bytes(w, value.as_bytes())
}

/// Read a length-prefixed UTF-8 string.
pub fn read_str(r: &mut WireReader) -> Result<String> {
    let len = read_length(r)?;
    read_utf8(r, len)
}

/// Read exactly `n` bytes as UTF-8 with no prefix.
pub fn read_utf8(r: &mut WireReader, n: usize) -> Result<String> {
    let raw = r.take(n)?;
    Ok(std::str::from_utf8(raw)?.to_owned())
}

/// Read a fixed `n`-byte string region, trimming trailing zero padding.
///
/// Lossy for values that end in `\0`: those characters are indistinguishable
/// from padding and do not survive a round-trip.
pub fn read_fixed_str(r: &mut WireReader, n: usize) -> Result<String> {
    let raw = r.take(n)?;
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    Ok(std::str::from_utf8(&raw[..end])?.to_owned())
}

/// Write a length-prefixed byte sequence.
pub fn write_bytes(w: &mut WireWriter, data: &[u8]) -> Result<()> {
    write_length(w, data.len())?;
    w.put_slice(data);
    Ok(())
}

/// Read a length-prefixed byte sequence as a zero-copy view.
pub fn read_bytes(r: &mut WireReader) -> Result<Bytes> {
    let len = read_length(r)?;
    r.take_bytes(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_prefix_encoding() {
        let mut w = WireWriter::new();
        write_length(&mut w, 3).unwrap();
        assert_eq!(w.as_slice(), &[3, 0, 0, 0]);
    }

    #[test]
    fn test_read_length_negative_rejected() {
        let mut r = WireReader::from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(read_length(&mut r), Err(CodecError::InvalidLength(-1))));
    }

    #[test]
    fn test_write_length_limit() {
        let mut w = WireWriter::new().with_max_length(4);
        write_str(&mut w, "four").unwrap();
        let err = write_str(&mut w, "hello").unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthLimitExceeded { len: 5, limit: 4 }
        ));
        assert_eq!(w.position(), 8);
    }

    #[test]
    fn test_fixed_str_drops_trailing_nul() {
        let mut w = WireWriter::new();
        write_padded(&mut w, b"ab\0", 5).unwrap();
        let mut r = WireReader::new(w.into_bytes());
        assert_eq!(read_fixed_str(&mut r, 5).unwrap(), "ab");
    }

    #[test]
    fn test_read_length_limit() {
        let mut r = WireReader::from_slice(&100i32.to_le_bytes()).with_max_length(10);
        let err = read_length(&mut r).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum 10"));
    }

    #[test]
    fn test_string_prefix_counts_utf8_bytes() {
        let mut w = WireWriter::new();
        write_str(&mut w, "héllo").unwrap();
        // 'é' is two bytes in UTF-8
        assert_eq!(&w.as_slice()[..4], &[6, 0, 0, 0]);
        assert_eq!(w.position(), 10);

        let mut r = WireReader::from_slice(w.as_slice());
        assert_eq!(read_str(&mut r).unwrap(), "héllo");
        assert!(r.is_empty());
    }

    #[test]
    fn test_empty_string() {
        let mut w = WireWriter::new();
        write_str(&mut w, "").unwrap();
        assert_eq!(w.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut r = WireReader::from_slice(&[2, 0, 0, 0, 0xFF, 0xFE]);
        assert!(matches!(read_str(&mut r), Err(CodecError::InvalidUtf8(_))));
    }

    #[test]
    fn test_write_slot_pads() {
        let mut w = WireWriter::new();
        write_slot(&mut w, 4, |w| {
            w.put(true);
            Ok(())
        })
        .unwrap();
        assert_eq!(w.as_slice(), &[1, 0, 0, 0]);
    }

    #[test]
    fn test_write_slot_overflow_is_error() {
        let mut w = WireWriter::new();
        let err = write_slot(&mut w, 2, |w| {
            w.put(7u32);
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            CodecError::FieldLengthExceeded { len: 4, slot: 2 }
        ));
    }

    #[test]
    fn test_read_slot_skips_remainder() {
        let mut r = WireReader::from_slice(&[1, 0xAA, 0xBB, 0xCC, 9]);
        let value = read_slot(&mut r, 4, |r| r.read::<bool>()).unwrap();
        assert!(value);
        assert_eq!(r.position(), 4);
        assert_eq!(r.read::<u8>().unwrap(), 9);
    }

    #[test]
    fn test_read_slot_overrun_is_error() {
        let mut r = WireReader::from_slice(&[0u8; 8]);
        let result = read_slot(&mut r, 2, |r| r.read::<u32>());
        assert!(matches!(
            result,
            Err(CodecError::FieldLengthExceeded { len: 4, slot: 2 })
        ));
    }

    #[test]
    fn test_padded_and_fixed_str() {
        let mut w = WireWriter::new();
        write_padded(&mut w, b"abc", 6).unwrap();
        assert_eq!(w.as_slice(), b"abc\0\0\0");

        let mut r = WireReader::from_slice(w.as_slice());
        assert_eq!(read_fixed_str(&mut r, 6).unwrap(), "abc");
        assert!(r.is_empty());

        assert!(write_padded(&mut w, b"too long", 3).is_err());
    }

    #[test]
    fn test_fixed_str_all_padding() {
        let mut r = WireReader::from_slice(&[0u8; 4]);
        assert_eq!(read_fixed_str(&mut r, 4).unwrap(), "");
    }

    #[test]
    fn test_bytes_roundtrip_is_zero_copy() {
        let mut w = WireWriter::new();
        write_bytes(&mut w, &[9, 8, 7]).unwrap();
        let record = w.into_bytes();

        let mut r = WireReader::new(record.clone());
        let view = read_bytes(&mut r).unwrap();
        assert_eq!(&view[..], &[9, 8, 7]);
        assert_eq!(view.as_ptr(), record[4..].as_ptr());
    }
}
