use std::fmt;

use gatt_proto::{ErrorCode, ErrorResponse, PduError};
use gatt_transport::TransportError;

/// Errors reported by the bearer and the procedures built on it.
#[derive(Debug)]
pub enum AttError {
    /// The remote answered with an Error Response.
    Protocol(ErrorResponse),
    /// A response could not be decoded.
    Pdu(PduError),
    /// A response decoded but breaks the procedure's rules.
    InvalidResponse(&'static str),
    /// The first byte is not a request opcode.
    NotARequest(u8),
    /// PDU longer than the current MTU.
    TooLong { len: usize, mtu: u16 },
    /// The transport accepted fewer bytes than the PDU holds.
    ShortWrite { expected: usize, written: usize },
    Transport(TransportError),
    /// The bearer task is gone.
    Closed,
    /// Client initialisation failed; carries the rendered cause.
    Init(String),
}

impl AttError {
    /// The ATT error code, if the remote sent an Error Response.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            AttError::Protocol(rsp) => rsp.error_code(),
            _ => None,
        }
    }

    pub fn is_attribute_not_found(&self) -> bool {
        self.error_code() == Some(ErrorCode::AttributeNotFound)
    }
}

impl fmt::Display for AttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttError::Protocol(rsp) => match rsp.error_code() {
                Some(code) => write!(
                    f,
                    "request 0x{:02x} failed at handle 0x{:04x}: {}",
                    rsp.request, rsp.handle, code
                ),
                None => write!(
                    f,
                    "request 0x{:02x} failed at handle 0x{:04x}: error 0x{:02x}",
                    rsp.request, rsp.handle, rsp.code
                ),
            },
            AttError::Pdu(e) => write!(f, "malformed response: {}", e),
            AttError::InvalidResponse(why) => write!(f, "invalid response: {}", why),
            AttError::NotARequest(op) => write!(f, "opcode 0x{:02x} is not a request", op),
            AttError::TooLong { len, mtu } => {
                write!(f, "PDU of {} bytes exceeds MTU {}", len, mtu)
            }
            AttError::ShortWrite { expected, written } => {
                write!(f, "short write: {} of {} bytes", written, expected)
            }
            AttError::Transport(e) => write!(f, "{}", e),
            AttError::Closed => write!(f, "ATT bearer closed"),
            AttError::Init(why) => write!(f, "client initialisation failed: {}", why),
        }
    }
}

impl std::error::Error for AttError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttError::Pdu(e) => Some(e),
            AttError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PduError> for AttError {
    fn from(e: PduError) -> Self {
        AttError::Pdu(e)
    }
}

impl From<TransportError> for AttError {
    fn from(e: TransportError) -> Self {
        AttError::Transport(e)
    }
}
