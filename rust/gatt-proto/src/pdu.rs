//! PDU builders and parsers for the procedures the client side needs.
//!
//! All multi-byte fields are little-endian. Builders return owned buffers,
//! parsers validate the opcode and length before touching the body.

use std::fmt;

use crate::{ErrorCode, Opcode, Uuid};

/// Minimum ATT MTU on an LE link.
pub const DEFAULT_MTU: u16 = 23;

/// Highest valid attribute handle.
pub const MAX_HANDLE: u16 = 0xffff;

/// Errors raised while decoding a PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PduError {
    /// Zero-length PDU
    Empty,
    /// First byte is not the opcode the caller asked for
    UnexpectedOpcode { expected: u8, found: u8 },
    /// Body length does not fit the opcode's layout
    InvalidLength { opcode: u8, len: usize },
    /// Per-entry length byte is not one the format allows
    InvalidEntryLength(u8),
    /// UUID field is neither 2 nor 16 bytes
    InvalidUuidLength(usize),
}

impl fmt::Display for PduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PduError::Empty => write!(f, "empty PDU"),
            PduError::UnexpectedOpcode { expected, found } => {
                write!(f, "expected opcode 0x{:02x}, found 0x{:02x}", expected, found)
            }
            PduError::InvalidLength { opcode, len } => {
                write!(f, "invalid length {} for opcode 0x{:02x}", len, opcode)
            }
            PduError::InvalidEntryLength(len) => write!(f, "invalid entry length {}", len),
            PduError::InvalidUuidLength(len) => write!(f, "invalid UUID length {}", len),
        }
    }
}

impl std::error::Error for PduError {}

/// Decoded Error Response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Raw opcode of the request that failed.
    pub request: u8,
    pub handle: u16,
    /// Raw error code; see [`ErrorResponse::error_code`].
    pub code: u8,
}

impl ErrorResponse {
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_u8(self.code)
    }
}

/// One entry of a Read By Group Type Response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupEntry {
    pub start: u16,
    pub end: u16,
    pub uuid: Uuid,
}

/// One entry of a Find By Type Value Response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleRange {
    pub start: u16,
    pub end: u16,
}

fn le16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn expect_opcode(pdu: &[u8], expected: Opcode) -> Result<(), PduError> {
    let found = *pdu.first().ok_or(PduError::Empty)?;
    if found != expected.as_u8() {
        return Err(PduError::UnexpectedOpcode {
            expected: expected.as_u8(),
            found,
        });
    }
    Ok(())
}

// =============================================================================
// Builders
// =============================================================================

pub fn exchange_mtu_req(mtu: u16) -> Vec<u8> {
    let mut pdu = vec![Opcode::ExchangeMtuReq.as_u8()];
    pdu.extend_from_slice(&mtu.to_le_bytes());
    pdu
}

pub fn read_by_group_type_req(start: u16, end: u16, group_type: Uuid) -> Vec<u8> {
    let mut pdu = vec![Opcode::ReadByGroupTypeReq.as_u8()];
    pdu.extend_from_slice(&start.to_le_bytes());
    pdu.extend_from_slice(&end.to_le_bytes());
    group_type.write_le(&mut pdu);
    pdu
}

/// `attr_type` is always a 16-bit UUID in this request.
pub fn find_by_type_value_req(start: u16, end: u16, attr_type: u16, value: &[u8]) -> Vec<u8> {
    let mut pdu = vec![Opcode::FindByTypeValueReq.as_u8()];
    pdu.extend_from_slice(&start.to_le_bytes());
    pdu.extend_from_slice(&end.to_le_bytes());
    pdu.extend_from_slice(&attr_type.to_le_bytes());
    pdu.extend_from_slice(value);
    pdu
}

pub fn read_req(handle: u16) -> Vec<u8> {
    let mut pdu = vec![Opcode::ReadReq.as_u8()];
    pdu.extend_from_slice(&handle.to_le_bytes());
    pdu
}

pub fn error_rsp(request: u8, handle: u16, code: ErrorCode) -> Vec<u8> {
    let mut pdu = vec![Opcode::ErrorRsp.as_u8(), request];
    pdu.extend_from_slice(&handle.to_le_bytes());
    pdu.push(code.as_u8());
    pdu
}

// =============================================================================
// Parsers
// =============================================================================

/// Parse either direction of an MTU exchange and return the MTU field.
pub fn parse_exchange_mtu(pdu: &[u8], opcode: Opcode) -> Result<u16, PduError> {
    expect_opcode(pdu, opcode)?;
    if pdu.len() != 3 {
        return Err(PduError::InvalidLength {
            opcode: opcode.as_u8(),
            len: pdu.len(),
        });
    }
    Ok(le16(pdu, 1))
}

pub fn parse_error_rsp(pdu: &[u8]) -> Result<ErrorResponse, PduError> {
    expect_opcode(pdu, Opcode::ErrorRsp)?;
    if pdu.len() != 5 {
        return Err(PduError::InvalidLength {
            opcode: Opcode::ErrorRsp.as_u8(),
            len: pdu.len(),
        });
    }
    Ok(ErrorResponse {
        request: pdu[1],
        handle: le16(pdu, 2),
        code: pdu[4],
    })
}

pub fn parse_read_by_group_type_rsp(pdu: &[u8]) -> Result<Vec<GroupEntry>, PduError> {
    expect_opcode(pdu, Opcode::ReadByGroupTypeRsp)?;
    if pdu.len() < 2 {
        return Err(PduError::InvalidLength {
            opcode: pdu[0],
            len: pdu.len(),
        });
    }

    let entry_len = pdu[1];
    if entry_len != 6 && entry_len != 20 {
        return Err(PduError::InvalidEntryLength(entry_len));
    }

    let body = &pdu[2..];
    let entry_len = entry_len as usize;
    if body.is_empty() || body.len() % entry_len != 0 {
        return Err(PduError::InvalidLength {
            opcode: pdu[0],
            len: pdu.len(),
        });
    }

    body.chunks_exact(entry_len)
        .map(|entry| {
            Ok(GroupEntry {
                start: le16(entry, 0),
                end: le16(entry, 2),
                uuid: Uuid::from_le_slice(&entry[4..])?,
            })
        })
        .collect()
}

pub fn parse_find_by_type_value_rsp(pdu: &[u8]) -> Result<Vec<HandleRange>, PduError> {
    expect_opcode(pdu, Opcode::FindByTypeValueRsp)?;

    let body = &pdu[1..];
    if body.is_empty() || body.len() % 4 != 0 {
        return Err(PduError::InvalidLength {
            opcode: pdu[0],
            len: pdu.len(),
        });
    }

    Ok(body
        .chunks_exact(4)
        .map(|entry| HandleRange {
            start: le16(entry, 0),
            end: le16(entry, 2),
        })
        .collect())
}
