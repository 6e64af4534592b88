//! ATT opcodes and their properties.

use std::fmt;

/// Attribute protocol opcodes.
///
/// Bit 6 marks a command (no response expected), bit 7 marks a signed PDU.
/// Every request opcode is answered either by `request + 1` or by
/// [`Opcode::ErrorRsp`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    ErrorRsp = 0x01,
    ExchangeMtuReq = 0x02,
    ExchangeMtuRsp = 0x03,
    FindInformationReq = 0x04,
    FindInformationRsp = 0x05,
    FindByTypeValueReq = 0x06,
    FindByTypeValueRsp = 0x07,
    ReadByTypeReq = 0x08,
    ReadByTypeRsp = 0x09,
    ReadReq = 0x0a,
    ReadRsp = 0x0b,
    ReadBlobReq = 0x0c,
    ReadBlobRsp = 0x0d,
    ReadMultipleReq = 0x0e,
    ReadMultipleRsp = 0x0f,
    ReadByGroupTypeReq = 0x10,
    ReadByGroupTypeRsp = 0x11,
    WriteReq = 0x12,
    WriteRsp = 0x13,
    PrepareWriteReq = 0x16,
    PrepareWriteRsp = 0x17,
    ExecuteWriteReq = 0x18,
    ExecuteWriteRsp = 0x19,
    HandleValueNotification = 0x1b,
    HandleValueIndication = 0x1d,
    HandleValueConfirmation = 0x1e,
    WriteCmd = 0x52,
    SignedWriteCmd = 0xd2,
}

/// Bit set on every command opcode.
pub const COMMAND_FLAG: u8 = 0x40;

impl Opcode {
    /// Convert from the first byte of a PDU.
    pub fn from_u8(val: u8) -> Option<Self> {
        Some(match val {
            0x01 => Opcode::ErrorRsp,
            0x02 => Opcode::ExchangeMtuReq,
            0x03 => Opcode::ExchangeMtuRsp,
            0x04 => Opcode::FindInformationReq,
            0x05 => Opcode::FindInformationRsp,
            0x06 => Opcode::FindByTypeValueReq,
            0x07 => Opcode::FindByTypeValueRsp,
            0x08 => Opcode::ReadByTypeReq,
            0x09 => Opcode::ReadByTypeRsp,
            0x0a => Opcode::ReadReq,
            0x0b => Opcode::ReadRsp,
            0x0c => Opcode::ReadBlobReq,
            0x0d => Opcode::ReadBlobRsp,
            0x0e => Opcode::ReadMultipleReq,
            0x0f => Opcode::ReadMultipleRsp,
            0x10 => Opcode::ReadByGroupTypeReq,
            0x11 => Opcode::ReadByGroupTypeRsp,
            0x12 => Opcode::WriteReq,
            0x13 => Opcode::WriteRsp,
            0x16 => Opcode::PrepareWriteReq,
            0x17 => Opcode::PrepareWriteRsp,
            0x18 => Opcode::ExecuteWriteReq,
            0x19 => Opcode::ExecuteWriteRsp,
            0x1b => Opcode::HandleValueNotification,
            0x1d => Opcode::HandleValueIndication,
            0x1e => Opcode::HandleValueConfirmation,
            0x52 => Opcode::WriteCmd,
            0xd2 => Opcode::SignedWriteCmd,
            _ => return None,
        })
    }

    /// Convert to the wire byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// True for opcodes that expect a response or an error response.
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Opcode::ExchangeMtuReq
                | Opcode::FindInformationReq
                | Opcode::FindByTypeValueReq
                | Opcode::ReadByTypeReq
                | Opcode::ReadReq
                | Opcode::ReadBlobReq
                | Opcode::ReadMultipleReq
                | Opcode::ReadByGroupTypeReq
                | Opcode::WriteReq
                | Opcode::PrepareWriteReq
                | Opcode::ExecuteWriteReq
        )
    }

    /// The success response paired with this request, if any.
    pub fn response(self) -> Option<Opcode> {
        if self.is_request() {
            Opcode::from_u8(self.as_u8() + 1)
        } else {
            None
        }
    }

    /// Get a human-readable description of this opcode.
    pub fn description(self) -> &'static str {
        match self {
            Opcode::ErrorRsp => "error response",
            Opcode::ExchangeMtuReq => "exchange MTU request",
            Opcode::ExchangeMtuRsp => "exchange MTU response",
            Opcode::FindInformationReq => "find information request",
            Opcode::FindInformationRsp => "find information response",
            Opcode::FindByTypeValueReq => "find by type value request",
            Opcode::FindByTypeValueRsp => "find by type value response",
            Opcode::ReadByTypeReq => "read by type request",
            Opcode::ReadByTypeRsp => "read by type response",
            Opcode::ReadReq => "read request",
            Opcode::ReadRsp => "read response",
            Opcode::ReadBlobReq => "read blob request",
            Opcode::ReadBlobRsp => "read blob response",
            Opcode::ReadMultipleReq => "read multiple request",
            Opcode::ReadMultipleRsp => "read multiple response",
            Opcode::ReadByGroupTypeReq => "read by group type request",
            Opcode::ReadByGroupTypeRsp => "read by group type response",
            Opcode::WriteReq => "write request",
            Opcode::WriteRsp => "write response",
            Opcode::PrepareWriteReq => "prepare write request",
            Opcode::PrepareWriteRsp => "prepare write response",
            Opcode::ExecuteWriteReq => "execute write request",
            Opcode::ExecuteWriteRsp => "execute write response",
            Opcode::HandleValueNotification => "handle value notification",
            Opcode::HandleValueIndication => "handle value indication",
            Opcode::HandleValueConfirmation => "handle value confirmation",
            Opcode::WriteCmd => "write command",
            Opcode::SignedWriteCmd => "signed write command",
        }
    }
}

/// True when the raw opcode byte has the command bit set.
pub fn is_command(raw: u8) -> bool {
    raw & COMMAND_FLAG != 0
}

impl TryFrom<u8> for Opcode {
    type Error = UnknownOpcode;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        Opcode::from_u8(val).ok_or(UnknownOpcode(val))
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op.as_u8()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.description(), self.as_u8())
    }
}

/// Error when converting from an unknown opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownOpcode(pub u8);

impl fmt::Display for UnknownOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown ATT opcode: 0x{:02x}", self.0)
    }
}

impl std::error::Error for UnknownOpcode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_request_has_a_response() {
        for raw in 0u8..=0xff {
            let Some(op) = Opcode::from_u8(raw) else {
                continue;
            };
            assert_eq!(op.as_u8(), raw);
            if op.is_request() {
                let rsp = op.response().unwrap();
                assert_eq!(rsp.as_u8(), raw + 1);
            } else {
                assert!(op.response().is_none());
            }
        }
    }

    #[test]
    fn command_bit() {
        assert!(is_command(Opcode::WriteCmd.as_u8()));
        assert!(is_command(Opcode::SignedWriteCmd.as_u8()));
        assert!(!is_command(Opcode::WriteReq.as_u8()));
    }

    #[test]
    fn unknown_opcode() {
        assert_eq!(Opcode::try_from(0x20), Err(UnknownOpcode(0x20)));
        assert!(format!("{}", UnknownOpcode(0x20)).contains("0x20"));
    }

    #[test]
    fn display_includes_wire_value() {
        let s = Opcode::ReadByGroupTypeReq.to_string();
        assert!(s.contains("read by group type request"));
        assert!(s.contains("0x10"));
    }
}
