//! 128-bit identifiers.

use std::fmt;

use super::reader::WireReader;
use super::writer::WireWriter;
use crate::error::Result;

/// Identifier size in bytes.
pub const ID128_SIZE: usize = 16;

/// A 128-bit identifier, encoded as 16 raw bytes with no length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Id128(pub [u8; ID128_SIZE]);

impl Id128 {
    /// The all-zero identifier.
    pub const NIL: Id128 = Id128([0u8; ID128_SIZE]);

    /// Create an identifier from raw bytes.
    pub const fn from_bytes(bytes: [u8; ID128_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw bytes in wire order.
    pub const fn as_bytes(&self) -> &[u8; ID128_SIZE] {
        &self.0
    }

    /// Check if this is the all-zero identifier.
    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; ID128_SIZE]
    }

    /// Write the 16 raw bytes.
    #[inline]
    pub fn write(&self, w: &mut WireWriter) {
        w.put_slice(&self.0);
    }

    /// Read 16 raw bytes.
    #[inline]
    pub fn read(r: &mut WireReader) -> Result<Self> {
        Ok(Self(r.take_array()?))
    }
}

impl From<u128> for Id128 {
    fn from(value: u128) -> Self {
        Self(value.to_le_bytes())
    }
}

impl fmt::Display for Id128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_is_16_raw_bytes() {
        let id = Id128::from_bytes([0xAB; 16]);
        let mut w = WireWriter::new();
        id.write(&mut w);
        assert_eq!(w.as_slice(), &[0xAB; 16]);
    }

    #[test]
    fn test_read_is_unprefixed() {
        let bytes: Vec<u8> = (0..16).collect();
        let mut r = WireReader::from_slice(&bytes);
        let id = Id128::read(&mut r).unwrap();
        assert_eq!(id.as_bytes()[0], 0);
        assert_eq!(id.as_bytes()[15], 15);
        assert!(r.is_empty());
    }

    #[test]
    fn test_read_underrun() {
        let mut r = WireReader::from_slice(&[0u8; 15]);
        assert!(Id128::read(&mut r).is_err());
    }

    #[test]
    fn test_nil_and_display() {
        assert!(Id128::NIL.is_nil());
        assert!(!Id128::from(1u128).is_nil());
        assert_eq!(
            Id128::from(1u128).to_string(),
            "01000000000000000000000000000000"
        );
    }
}
