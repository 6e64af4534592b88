//! ATT error codes.

use std::fmt;

/// Error codes carried by an ATT Error Response.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidHandle = 0x01,
    ReadNotPermitted = 0x02,
    WriteNotPermitted = 0x03,
    InvalidPdu = 0x04,
    InsufficientAuthentication = 0x05,
    RequestNotSupported = 0x06,
    InvalidOffset = 0x07,
    InsufficientAuthorization = 0x08,
    PrepareQueueFull = 0x09,
    AttributeNotFound = 0x0a,
    AttributeNotLong = 0x0b,
    InsufficientEncryptionKeySize = 0x0c,
    InvalidAttributeValueLength = 0x0d,
    Unlikely = 0x0e,
    InsufficientEncryption = 0x0f,
    UnsupportedGroupType = 0x10,
    InsufficientResources = 0x11,
}

impl ErrorCode {
    /// Convert from a u8 wire value.
    /// Returns None for application or reserved codes.
    pub fn from_u8(val: u8) -> Option<Self> {
        Some(match val {
            0x01 => ErrorCode::InvalidHandle,
            0x02 => ErrorCode::ReadNotPermitted,
            0x03 => ErrorCode::WriteNotPermitted,
            0x04 => ErrorCode::InvalidPdu,
            0x05 => ErrorCode::InsufficientAuthentication,
            0x06 => ErrorCode::RequestNotSupported,
            0x07 => ErrorCode::InvalidOffset,
            0x08 => ErrorCode::InsufficientAuthorization,
            0x09 => ErrorCode::PrepareQueueFull,
            0x0a => ErrorCode::AttributeNotFound,
            0x0b => ErrorCode::AttributeNotLong,
            0x0c => ErrorCode::InsufficientEncryptionKeySize,
            0x0d => ErrorCode::InvalidAttributeValueLength,
            0x0e => ErrorCode::Unlikely,
            0x0f => ErrorCode::InsufficientEncryption,
            0x10 => ErrorCode::UnsupportedGroupType,
            0x11 => ErrorCode::InsufficientResources,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::InvalidHandle => "invalid handle",
            ErrorCode::ReadNotPermitted => "read not permitted",
            ErrorCode::WriteNotPermitted => "write not permitted",
            ErrorCode::InvalidPdu => "invalid PDU",
            ErrorCode::InsufficientAuthentication => "insufficient authentication",
            ErrorCode::RequestNotSupported => "request not supported",
            ErrorCode::InvalidOffset => "invalid offset",
            ErrorCode::InsufficientAuthorization => "insufficient authorization",
            ErrorCode::PrepareQueueFull => "prepare queue full",
            ErrorCode::AttributeNotFound => "attribute not found",
            ErrorCode::AttributeNotLong => "attribute not long",
            ErrorCode::InsufficientEncryptionKeySize => "insufficient encryption key size",
            ErrorCode::InvalidAttributeValueLength => "invalid attribute value length",
            ErrorCode::Unlikely => "unlikely error",
            ErrorCode::InsufficientEncryption => "insufficient encryption",
            ErrorCode::UnsupportedGroupType => "unsupported group type",
            ErrorCode::InsufficientResources => "insufficient resources",
        }
    }
}

impl From<ErrorCode> for u8 {
    fn from(code: ErrorCode) -> u8 {
        code.as_u8()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.description(), self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_codes() {
        for raw in 0x01u8..=0x11 {
            let code = ErrorCode::from_u8(raw).unwrap();
            assert_eq!(code.as_u8(), raw);
        }
        assert_eq!(ErrorCode::from_u8(0x00), None);
        assert_eq!(ErrorCode::from_u8(0x80), None);
    }

    #[test]
    fn display() {
        assert_eq!(
            ErrorCode::AttributeNotFound.to_string(),
            "attribute not found (0x0a)"
        );
    }
}
