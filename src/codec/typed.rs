//! Typed contract - the functions a code generator emits per type.
//!
//! A type implements [`Encode`] and [`Decode`] by coding its base type
//! first, then each of its own fields in declaration order, using the
//! helpers in this module for layout modifiers.
//!
//! # Example
//!
//! ```
//! use fieldwire::codec::{decode_enum, encode_enum, Decode, Encode, WireEnum};
//! use fieldwire::wire::{WireReader, WireWriter};
//! use fieldwire::Result;
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Mode { A = 0, B = 1 }
//!
//! impl WireEnum for Mode {
//!     type Repr = i32;
//!     const NAME: &'static str = "Mode";
//!     fn to_repr(self) -> i32 { self as i32 }
//!     fn from_repr(v: i32) -> Option<Self> {
//!         match v { 0 => Some(Mode::A), 1 => Some(Mode::B), _ => None }
//!     }
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Sample { u0: u32, u1: Vec<u32>, u2: Mode }
//!
//! impl Encode for Sample {
//!     fn encode(&self, w: &mut WireWriter) -> Result<()> {
//!         self.u0.encode(w)?;
//!         self.u1.encode(w)?;
//!         encode_enum(w, self.u2);
//!         Ok(())
//!     }
//! }
//!
//! impl Decode for Sample {
//!     fn decode(r: &mut WireReader) -> Result<Self> {
//!         Ok(Self { u0: u32::decode(r)?, u1: Vec::decode(r)?, u2: decode_enum(r)? })
//!     }
//! }
//!
//! let sample = Sample { u0: 7, u1: vec![1, 2, 3], u2: Mode::B };
//! let mut w = WireWriter::new();
//! sample.encode(&mut w).unwrap();
//! assert_eq!(w.position(), 24);
//!
//! let mut r = WireReader::new(w.into_bytes());
//! assert_eq!(Sample::decode(&mut r).unwrap(), sample);
//! ```

use bytes::Bytes;

use super::tail::TailCodec;
use crate::error::{CodecError, Result};
use crate::layout::{
    read_bytes, read_fixed_str, read_length, read_slot, read_str, write_bytes, write_length,
    write_padded, write_slot, write_str, CountPolicy,
};
use crate::pool::PoolSet;
use crate::wire::{Id128, WireInteger, WireReader, WireScalar, WireWriter};

/// Write a value's natural encoding.
pub trait Encode {
    fn encode(&self, w: &mut WireWriter) -> Result<()>;
}

/// Read a value's natural encoding.
pub trait Decode: Sized {
    fn decode(r: &mut WireReader) -> Result<Self>;
}

macro_rules! scalar_contract {
    ($($ty:ty),*) => {$(
        impl Encode for $ty {
            #[inline]
            fn encode(&self, w: &mut WireWriter) -> Result<()> {
                w.put(*self);
                Ok(())
            }
        }

        impl Decode for $ty {
            #[inline]
            fn decode(r: &mut WireReader) -> Result<Self> {
                <$ty as WireScalar>::get(r)
            }
        }
    )*};
}

scalar_contract!(bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl Encode for str {
    #[inline]
    fn encode(&self, w: &mut WireWriter) -> Result<()> {
        write_str(w, self)
    }
}

impl Encode for String {
    #[inline]
    fn encode(&self, w: &mut WireWriter) -> Result<()> {
        write_str(w, self)
    }
}

impl Decode for String {
    #[inline]
    fn decode(r: &mut WireReader) -> Result<Self> {
        read_str(r)
    }
}

impl Encode for Bytes {
    #[inline]
    fn encode(&self, w: &mut WireWriter) -> Result<()> {
        write_bytes(w, self)
    }
}

impl Decode for Bytes {
    #[inline]
    fn decode(r: &mut WireReader) -> Result<Self> {
        read_bytes(r)
    }
}

impl Encode for Id128 {
    #[inline]
    fn encode(&self, w: &mut WireWriter) -> Result<()> {
        self.write(w);
        Ok(())
    }
}

impl Decode for Id128 {
    #[inline]
    fn decode(r: &mut WireReader) -> Result<Self> {
        Id128::read(r)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, w: &mut WireWriter) -> Result<()> {
        write_length(w, self.len())?;
        self.iter().try_for_each(|item| item.encode(w))
    }
}

impl<T: Encode> Encode for Vec<T> {
    #[inline]
    fn encode(&self, w: &mut WireWriter) -> Result<()> {
        self.as_slice().encode(w)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(r: &mut WireReader) -> Result<Self> {
        let count = read_length(r)?;
        decode_fixed_count(r, count)
    }
}

/// An enum coded as its underlying integer.
pub trait WireEnum: Copy {
    /// Underlying integer type.
    type Repr: WireInteger;

    /// Enum name for error messages.
    const NAME: &'static str;

    fn to_repr(self) -> Self::Repr;

    /// `None` for undeclared discriminants.
    fn from_repr(repr: Self::Repr) -> Option<Self>;
}

/// Write an enum as its underlying integer.
#[inline]
pub fn encode_enum<E: WireEnum>(w: &mut WireWriter, value: E) {
    w.put(value.to_repr());
}

/// Read an enum, rejecting undeclared discriminants.
pub fn decode_enum<E: WireEnum>(r: &mut WireReader) -> Result<E> {
    let raw = r.read::<E::Repr>()?;
    E::from_repr(raw).ok_or(CodecError::InvalidEnumValue {
        enum_name: E::NAME,
        value: raw.to_i64(),
    })
}

/// Write `value` inside a zero-padded slot of exactly `n` bytes.
#[inline]
pub fn encode_fixed_length<T: Encode + ?Sized>(
    w: &mut WireWriter,
    value: &T,
    n: usize,
) -> Result<()> {
    write_slot(w, n, |w| value.encode(w))
}

/// Read a value from a slot of exactly `n` bytes, skipping the padding.
#[inline]
pub fn decode_fixed_length<T: Decode>(r: &mut WireReader, n: usize) -> Result<T> {
    read_slot(r, n, T::decode)
}

/// Write exactly `count` elements with no prefix.
///
/// Missing elements are written as `T::default()`; more than `count`
/// elements fail with [`CodecError::CountExceeded`].
pub fn encode_fixed_count<T: Encode + Default>(
    w: &mut WireWriter,
    items: &[T],
    count: usize,
) -> Result<()> {
    if items.len() > count {
        return Err(CodecError::CountExceeded {
            count: items.len(),
            limit: count,
        });
    }
    items.iter().try_for_each(|item| item.encode(w))?;
    if items.len() < count {
        let filler = T::default();
        for _ in items.len()..count {
            filler.encode(w)?;
        }
    }
    Ok(())
}

/// Read exactly `count` elements with no prefix.
pub fn decode_fixed_count<T: Decode>(r: &mut WireReader, count: usize) -> Result<Vec<T>> {
    // Every element takes at least one byte, except zero-field objects
    let mut items = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        items.push(T::decode(r)?);
    }
    Ok(items)
}

/// Read a list into storage checked out from `pools`.
///
/// The caller owns the returned list and should hand it back with
/// [`PoolSet::release`] when done. On error the storage goes straight back
/// to the pool.
pub fn decode_pooled_list<T>(
    r: &mut WireReader,
    pools: &PoolSet,
    count: CountPolicy,
) -> Result<Vec<T>>
where
    T: Decode + Send + 'static,
{
    let count = match count {
        CountPolicy::Prefixed => read_length(r)?,
        CountPolicy::Exact(n) => n,
    };
    let mut items: Vec<T> = pools.checkout();
    items.reserve(count.min(r.remaining()));
    for _ in 0..count {
        match T::decode(r) {
            Ok(item) => items.push(item),
            Err(e) => {
                pools.release(items);
                return Err(e);
            }
        }
    }
    Ok(items)
}

/// Write a string as exactly `n` raw bytes, zero-padded, no prefix.
#[inline]
pub fn encode_fixed_str(w: &mut WireWriter, value: &str, n: usize) -> Result<()> {
    write_padded(w, value.as_bytes(), n)
}

/// Read an `n`-byte string region, trimming trailing zero padding.
#[inline]
pub fn decode_fixed_str(r: &mut WireReader, n: usize) -> Result<String> {
    read_fixed_str(r, n)
}

/// Write `value` only when `guard` is true.
#[inline]
pub fn encode_when<T: Encode + ?Sized>(w: &mut WireWriter, guard: bool, value: &T) -> Result<()> {
    if guard {
        value.encode(w)?;
    }
    Ok(())
}

/// Read a value only when `guard` is true.
#[inline]
pub fn decode_when<T: Decode>(r: &mut WireReader, guard: bool) -> Result<Option<T>> {
    if guard {
        T::decode(r).map(Some)
    } else {
        Ok(None)
    }
}

/// Append the raw tail of a dynamic type.
#[inline]
pub fn encode_tail(w: &mut WireWriter, tail: &[u8]) {
    TailCodec::append(w, tail);
}

/// Capture the rest of the record as the raw tail of a dynamic type.
#[inline]
pub fn decode_tail(r: &mut WireReader) -> Bytes {
    TailCodec::capture(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Level {
        Low,
        High,
    }

    impl WireEnum for Level {
        type Repr = u8;
        const NAME: &'static str = "Level";

        fn to_repr(self) -> u8 {
            match self {
                Level::Low => 0,
                Level::High => 1,
            }
        }

        fn from_repr(repr: u8) -> Option<Self> {
            match repr {
                0 => Some(Level::Low),
                1 => Some(Level::High),
                _ => None,
            }
        }
    }

    #[test]
    fn test_vec_prefix_counts_elements() {
        let mut w = WireWriter::new();
        vec![1u16, 2, 3].encode(&mut w).unwrap();
        assert_eq!(w.as_slice(), &[3, 0, 0, 0, 1, 0, 2, 0, 3, 0]);

        let mut r = WireReader::new(w.into_bytes());
        assert_eq!(Vec::<u16>::decode(&mut r).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_vec() {
        let mut w = WireWriter::new();
        Vec::<u32>::new().encode(&mut w).unwrap();
        assert_eq!(w.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_strings_in_list_carry_own_prefix() {
        let mut w = WireWriter::new();
        vec!["a".to_string(), "bc".to_string()].encode(&mut w).unwrap();
        assert_eq!(
            w.as_slice(),
            &[2, 0, 0, 0, 1, 0, 0, 0, b'a', 2, 0, 0, 0, b'b', b'c']
        );
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        // Claims 1M elements but carries none
        let mut r = WireReader::from_slice(&1_000_000i32.to_le_bytes());
        let err = Vec::<u64>::decode(&mut r).unwrap_err();
        assert!(matches!(err, CodecError::BufferUnderrun { .. }));
    }

    #[test]
    fn test_enum_roundtrip_and_invalid() {
        let mut w = WireWriter::new();
        encode_enum(&mut w, Level::High);
        assert_eq!(w.as_slice(), &[1]);

        let mut r = WireReader::new(w.into_bytes());
        assert_eq!(decode_enum::<Level>(&mut r).unwrap(), Level::High);

        let mut r = WireReader::from_slice(&[9]);
        let err = decode_enum::<Level>(&mut r).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value 9 for enum Level");
    }

    #[test]
    fn test_fixed_length_scalar() {
        let mut w = WireWriter::new();
        encode_fixed_length(&mut w, &true, 4).unwrap();
        w.put(0xEEu8);
        assert_eq!(w.as_slice(), &[1, 0, 0, 0, 0xEE]);

        let mut r = WireReader::new(w.into_bytes());
        assert!(decode_fixed_length::<bool>(&mut r, 4).unwrap());
        assert_eq!(r.read::<u8>().unwrap(), 0xEE);
    }

    #[test]
    fn test_fixed_length_overflow() {
        let mut w = WireWriter::new();
        let err = encode_fixed_length(&mut w, "too long for slot", 8).unwrap_err();
        assert!(matches!(err, CodecError::FieldLengthExceeded { slot: 8, .. }));
    }

    #[test]
    fn test_fixed_count_fills_with_default() {
        let mut w = WireWriter::new();
        encode_fixed_count(&mut w, &[5u16], 3).unwrap();
        assert_eq!(w.as_slice(), &[5, 0, 0, 0, 0, 0]);

        let mut r = WireReader::new(w.into_bytes());
        assert_eq!(decode_fixed_count::<u16>(&mut r, 3).unwrap(), vec![5, 0, 0]);
    }

    #[test]
    fn test_fixed_count_too_many() {
        let mut w = WireWriter::new();
        let err = encode_fixed_count(&mut w, &[1u8, 2, 3], 2).unwrap_err();
        assert!(matches!(err, CodecError::CountExceeded { count: 3, limit: 2 }));
    }

    #[test]
    fn test_pooled_list_reuses_storage() {
        let pools = PoolSet::new(4);
        let mut w = WireWriter::new();
        vec![1u32, 2, 3].encode(&mut w).unwrap();
        let record = w.into_bytes();

        let first: Vec<u32> =
            decode_pooled_list(&mut WireReader::new(record.clone()), &pools, CountPolicy::Prefixed)
                .unwrap();
        assert_eq!(first, vec![1, 2, 3]);
        pools.release(first);

        let second: Vec<u32> =
            decode_pooled_list(&mut WireReader::new(record), &pools, CountPolicy::Prefixed)
                .unwrap();
        assert_eq!(second, vec![1, 2, 3]);

        let pool = pools.pool::<Vec<u32>>();
        assert_eq!(pool.created(), 1);
        assert_eq!(pool.reused(), 1);
    }

    #[test]
    fn test_pooled_list_error_returns_storage() {
        let pools = PoolSet::new(4);
        let mut r = WireReader::from_slice(&[1, 0]);
        let result: Result<Vec<u32>> = decode_pooled_list(&mut r, &pools, CountPolicy::Exact(1));
        assert!(result.is_err());
        assert_eq!(pools.pool::<Vec<u32>>().idle(), 1);
    }

    #[test]
    fn test_fixed_str() {
        let mut w = WireWriter::new();
        encode_fixed_str(&mut w, "hi", 5).unwrap();
        assert_eq!(w.as_slice(), b"hi\0\0\0");

        let mut r = WireReader::new(w.into_bytes());
        assert_eq!(decode_fixed_str(&mut r, 5).unwrap(), "hi");
    }

    #[test]
    fn test_when() {
        let mut w = WireWriter::new();
        encode_when(&mut w, false, &7u32).unwrap();
        assert!(w.is_empty());
        encode_when(&mut w, true, &7u32).unwrap();
        assert_eq!(w.position(), 4);

        let mut r = WireReader::new(w.into_bytes());
        assert_eq!(decode_when::<u32>(&mut r, false).unwrap(), None);
        assert_eq!(r.position(), 0);
        assert_eq!(decode_when::<u32>(&mut r, true).unwrap(), Some(7));
    }

    #[test]
    fn test_id128_is_unprefixed() {
        let id = Id128::from(0x0102u128);
        let mut w = WireWriter::new();
        id.encode(&mut w).unwrap();
        assert_eq!(w.position(), 16);
        assert_eq!(w.as_slice()[0], 0x02);
        let mut r = WireReader::new(w.into_bytes());
        assert_eq!(Id128::decode(&mut r).unwrap(), id);
    }
}
