//! Attribute type UUIDs.

use std::fmt;

use crate::PduError;

/// Bluetooth base UUID `00000000-0000-1000-8000-00805f9b34fb`, little-endian.
const BASE_UUID_LE: [u8; 16] = [
    0xfb, 0x34, 0x9b, 0x5f, 0x80, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Primary service declaration type.
pub const PRIMARY_SERVICE: Uuid = Uuid::Uuid16(0x2800);
/// Generic Access service.
pub const GENERIC_ACCESS: Uuid = Uuid::Uuid16(0x1800);

/// An attribute type as it appears on the wire.
///
/// 128-bit values are stored little-endian, in the byte order ATT uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Uuid {
    Uuid16(u16),
    Uuid128([u8; 16]),
}

impl Uuid {
    /// Decode a 2- or 16-byte little-endian UUID.
    pub fn from_le_slice(bytes: &[u8]) -> Result<Self, PduError> {
        match bytes.len() {
            2 => Ok(Uuid::Uuid16(u16::from_le_bytes([bytes[0], bytes[1]]))),
            16 => {
                let mut raw = [0u8; 16];
                raw.copy_from_slice(bytes);
                Ok(Uuid::Uuid128(raw))
            }
            len => Err(PduError::InvalidUuidLength(len)),
        }
    }

    /// Wire length in bytes.
    pub fn wire_len(&self) -> usize {
        match self {
            Uuid::Uuid16(_) => 2,
            Uuid::Uuid128(_) => 16,
        }
    }

    /// Append the little-endian encoding to `buf`.
    pub fn write_le(&self, buf: &mut Vec<u8>) {
        match self {
            Uuid::Uuid16(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Uuid::Uuid128(raw) => buf.extend_from_slice(raw),
        }
    }

    /// Expand to the full 128-bit form.
    pub fn to_uuid128(&self) -> [u8; 16] {
        match self {
            Uuid::Uuid16(v) => {
                let mut raw = BASE_UUID_LE;
                raw[12..14].copy_from_slice(&v.to_le_bytes());
                raw
            }
            Uuid::Uuid128(raw) => *raw,
        }
    }
}

impl From<u16> for Uuid {
    fn from(v: u16) -> Self {
        Uuid::Uuid16(v)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uuid::Uuid16(v) => write!(f, "0x{:04x}", v),
            Uuid::Uuid128(raw) => {
                // Canonical text form is big-endian.
                let b: Vec<u8> = raw.iter().rev().copied().collect();
                write!(
                    f,
                    "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11],
                    b[12], b[13], b[14], b[15]
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_16_bit() {
        let uuid = Uuid::from_le_slice(&[0x00, 0x18]).unwrap();
        assert_eq!(uuid, GENERIC_ACCESS);
        assert_eq!(uuid.to_string(), "0x1800");
    }

    #[test]
    fn decodes_128_bit_in_canonical_order() {
        let raw = [
            0xef, 0xcd, 0xab, 0x89, 0x67, 0x45, 0x23, 0x01, 0x00, 0x00, 0x00, 0x00, 0x85, 0x60,
            0x00, 0x00,
        ];
        let uuid = Uuid::from_le_slice(&raw).unwrap();
        assert_eq!(uuid.to_string(), "00006085-0000-0000-0123-456789abcdef");

        let mut out = Vec::new();
        uuid.write_le(&mut out);
        assert_eq!(out, raw);
    }

    #[test]
    fn rejects_odd_lengths() {
        assert_eq!(
            Uuid::from_le_slice(&[1, 2, 3]),
            Err(PduError::InvalidUuidLength(3))
        );
    }

    #[test]
    fn expands_to_base_uuid() {
        let full = GENERIC_ACCESS.to_uuid128();
        assert_eq!(
            Uuid::Uuid128(full).to_string(),
            "00001800-0000-1000-8000-00805f9b34fb"
        );
    }
}
