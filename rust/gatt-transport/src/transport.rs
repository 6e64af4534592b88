//! Transport enum and backend selection.
//!
//! The public API is the [`Transport`] enum. Each backend lives in its own
//! module under `transport/`. Endpoints are not `Clone`: whoever holds an
//! endpoint is its only owner, and dropping it hangs up the connection.

use std::fmt;
use std::str::FromStr;

use crate::TransportError;

/// Which backend [`Transport::pair`] should build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// In-process channel pair.
    #[default]
    Mem,
    /// Unix datagram socket pair.
    Datagram,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Mem => "mem",
            TransportKind::Datagram => "datagram",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown transport name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransportKind(pub String);

impl fmt::Display for UnknownTransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown transport '{}': expected 'mem' or 'datagram'",
            self.0
        )
    }
}

impl std::error::Error for UnknownTransportKind {}

impl FromStr for TransportKind {
    type Err = UnknownTransportKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mem" => Ok(TransportKind::Mem),
            "datagram" => Ok(TransportKind::Datagram),
            other => Err(UnknownTransportKind(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum Transport {
    #[cfg(feature = "mem")]
    Mem(mem::MemTransport),
    #[cfg(all(unix, feature = "datagram"))]
    Datagram(datagram::DatagramTransport),
}

impl Transport {
    /// Create a connected endpoint pair.
    ///
    /// The datagram backend registers with the tokio reactor, so this must be
    /// called from within a runtime.
    pub fn pair(kind: TransportKind) -> Result<(Self, Self), TransportError> {
        match kind {
            #[cfg(feature = "mem")]
            TransportKind::Mem => {
                let (a, b) = mem::MemTransport::pair();
                Ok((Transport::Mem(a), Transport::Mem(b)))
            }
            #[cfg(all(unix, feature = "datagram"))]
            TransportKind::Datagram => {
                let (a, b) = datagram::DatagramTransport::pair()?;
                Ok((Transport::Datagram(a), Transport::Datagram(b)))
            }
            #[allow(unreachable_patterns)]
            other => Err(TransportError::Unsupported(other.as_str())),
        }
    }

    /// Send one message. Returns the number of bytes the transport accepted,
    /// which callers compare against `msg.len()` to detect short writes.
    pub async fn send(&self, msg: &[u8]) -> Result<usize, TransportError> {
        match self {
            #[cfg(feature = "mem")]
            Transport::Mem(t) => t.send(msg).await,
            #[cfg(all(unix, feature = "datagram"))]
            Transport::Datagram(t) => t.send(msg).await,
        }
    }

    /// Receive one message into `buf`.
    ///
    /// Messages longer than `buf` are truncated to `buf.len()`. `Ok(0)` means
    /// the other end hung up.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self {
            #[cfg(feature = "mem")]
            Transport::Mem(t) => t.recv(buf).await,
            #[cfg(all(unix, feature = "datagram"))]
            Transport::Datagram(t) => t.recv(buf).await,
        }
    }

    pub fn close(&self) {
        match self {
            #[cfg(feature = "mem")]
            Transport::Mem(t) => t.close(),
            #[cfg(all(unix, feature = "datagram"))]
            Transport::Datagram(t) => t.close(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            #[cfg(feature = "mem")]
            Transport::Mem(t) => t.is_closed(),
            #[cfg(all(unix, feature = "datagram"))]
            Transport::Datagram(t) => t.is_closed(),
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            #[cfg(feature = "mem")]
            Transport::Mem(_) => TransportKind::Mem,
            #[cfg(all(unix, feature = "datagram"))]
            Transport::Datagram(_) => TransportKind::Datagram,
        }
    }
}

#[cfg(all(unix, feature = "datagram"))]
pub mod datagram;
#[cfg(feature = "mem")]
pub mod mem;
