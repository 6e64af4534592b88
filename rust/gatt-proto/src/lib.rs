//! Attribute protocol wire types.
//!
//! Opcodes, error codes, UUIDs and the handful of PDU layouts a GATT client
//! needs for MTU negotiation and primary service discovery. Nothing here does
//! I/O; see `gatt-att` for the bearer that moves these bytes.

#![deny(unsafe_code)]

mod ecode;
mod opcode;
pub mod pdu;
mod uuid;

pub use ecode::*;
pub use opcode::*;
pub use pdu::{DEFAULT_MTU, ErrorResponse, GroupEntry, HandleRange, MAX_HANDLE, PduError};
pub use uuid::*;
