//! Fixed-width scalar encoding.
//!
//! ```text
//! bool       1 byte   0x00 / 0x01
//! i8 / u8    1 byte
//! i16 / u16  2 bytes  little-endian
//! i32 / u32  4 bytes  little-endian
//! i64 / u64  8 bytes  little-endian
//! f32        4 bytes  little-endian IEEE-754
//! f64        8 bytes  little-endian IEEE-754
//! ```
//!
//! All conversions go through `to_le_bytes` / `from_le_bytes`, so the wire
//! is little-endian regardless of host byte order. No alignment padding is
//! ever inserted.

use super::reader::WireReader;
use super::writer::WireWriter;
use crate::error::Result;

/// A scalar with a fixed wire width.
pub trait WireScalar: Copy + Sized {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Wire type name, used in error messages.
    const NAME: &'static str;

    /// The neutral (zero) value used for fillers.
    const ZERO: Self;

    /// Append the little-endian encoding.
    fn put(self, w: &mut WireWriter);

    /// Read the little-endian encoding, advancing by exactly `WIDTH`.
    fn get(r: &mut WireReader) -> Result<Self>;
}

/// An integer scalar that can act as a count or an enum representation.
pub trait WireInteger: WireScalar {
    /// Widen to `i64` (u64 values above `i64::MAX` wrap).
    fn to_i64(self) -> i64;

    /// Narrow from `i64`, `None` if out of range.
    fn from_i64(value: i64) -> Option<Self>;
}

impl WireScalar for bool {
    const WIDTH: usize = 1;
    const NAME: &'static str = "bool";
    const ZERO: Self = false;

    #[inline]
    fn put(self, w: &mut WireWriter) {
        w.put_slice(&[u8::from(self)]);
    }

    /// Only `0x01` reads as `true`.
    #[inline]
    fn get(r: &mut WireReader) -> Result<Self> {
        let [b] = r.take_array::<1>()?;
        Ok(b == 1)
    }
}

macro_rules! le_scalar {
    ($($ty:ty => $name:literal, $zero:expr;)*) => {$(
        impl WireScalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const NAME: &'static str = $name;
            const ZERO: Self = $zero;

            #[inline]
            fn put(self, w: &mut WireWriter) {
                w.put_slice(&self.to_le_bytes());
            }

            #[inline]
            fn get(r: &mut WireReader) -> Result<Self> {
                Ok(<$ty>::from_le_bytes(r.take_array()?))
            }
        }
    )*};
}

le_scalar! {
    i8 => "i8", 0;
    u8 => "u8", 0;
    i16 => "i16", 0;
    u16 => "u16", 0;
    i32 => "i32", 0;
    u32 => "u32", 0;
    i64 => "i64", 0;
    u64 => "u64", 0;
    f32 => "f32", 0.0;
    f64 => "f64", 0.0;
}

macro_rules! wire_integer {
    ($($ty:ty),*) => {$(
        impl WireInteger for $ty {
            #[inline]
            fn to_i64(self) -> i64 {
                self as i64
            }

            #[inline]
            fn from_i64(value: i64) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }
        }
    )*};
}

wire_integer!(i8, u8, i16, u16, i32, u32, i64);

impl WireInteger for u64 {
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }

    #[inline]
    fn from_i64(value: i64) -> Option<Self> {
        Some(value as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: WireScalar>(value: T) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put(value);
        w.as_slice().to_vec()
    }

    #[test]
    fn test_widths() {
        assert_eq!(encode(true).len(), 1);
        assert_eq!(encode(-1i8).len(), 1);
        assert_eq!(encode(1u16).len(), 2);
        assert_eq!(encode(1i32).len(), 4);
        assert_eq!(encode(1u64).len(), 8);
        assert_eq!(encode(1.0f32).len(), 4);
        assert_eq!(encode(1.0f64).len(), 8);
    }

    #[test]
    fn test_little_endian_byte_order() {
        assert_eq!(encode(0x0102u16), vec![0x02, 0x01]);
        assert_eq!(encode(0x0102_0304i32), vec![0x04, 0x03, 0x02, 0x01]);
        assert_eq!(
            encode(0x0102_0304_0506_0708u64),
            vec![0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(encode(-2i16), vec![0xFE, 0xFF]);
    }

    #[test]
    fn test_float_bit_pattern() {
        // 1.0f32 = 0x3F800000
        assert_eq!(encode(1.0f32), vec![0x00, 0x00, 0x80, 0x3F]);

        let mut r = WireReader::from_slice(&[0x00, 0x00, 0x80, 0x3F]);
        assert_eq!(r.read::<f32>().unwrap(), 1.0);
    }

    #[test]
    fn test_bool_encoding() {
        assert_eq!(encode(true), vec![1]);
        assert_eq!(encode(false), vec![0]);

        let mut r = WireReader::from_slice(&[1, 0, 2]);
        assert!(r.read::<bool>().unwrap());
        assert!(!r.read::<bool>().unwrap());
        // Anything other than 0x01 reads as false
        assert!(!r.read::<bool>().unwrap());
    }

    #[test]
    fn test_read_advances_by_width() {
        let mut r = WireReader::from_slice(&[0u8; 15]);
        r.read::<u8>().unwrap();
        assert_eq!(r.position(), 1);
        r.read::<i16>().unwrap();
        assert_eq!(r.position(), 3);
        r.read::<u32>().unwrap();
        assert_eq!(r.position(), 7);
        r.read::<i64>().unwrap();
        assert_eq!(r.position(), 15);
    }

    #[test]
    fn test_read_underrun() {
        let mut r = WireReader::from_slice(&[1, 2, 3]);
        assert!(r.read::<u32>().is_err());
        assert_eq!(r.position(), 0);
        assert_eq!(r.read::<u16>().unwrap(), 0x0201);
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(u8::from_i64(255), Some(255));
        assert_eq!(u8::from_i64(256), None);
        assert_eq!(i16::from_i64(-5), Some(-5));
        assert_eq!(u32::from_i64(-1), None);
        assert_eq!(7u16.to_i64(), 7);
    }

    #[test]
    fn test_min_max_values() {
        for v in [i32::MIN, -1, 0, i32::MAX] {
            let bytes = encode(v);
            let mut r = WireReader::from_slice(&bytes);
            assert_eq!(r.read::<i32>().unwrap(), v);
        }
        let bytes = encode(u64::MAX);
        assert_eq!(bytes, vec![0xFF; 8]);
    }
}
