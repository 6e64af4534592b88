use std::fmt;
use std::io;

/// Errors surfaced by a transport endpoint.
#[derive(Debug)]
pub enum TransportError {
    /// This endpoint was closed locally, or the other end is gone.
    Closed,
    /// The requested backend is not compiled into this build.
    Unsupported(&'static str),
    /// Underlying socket error.
    Io(io::Error),
}

impl TransportError {
    pub fn is_closed(&self) -> bool {
        matches!(self, TransportError::Closed)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Closed => write!(f, "transport closed"),
            TransportError::Unsupported(kind) => {
                write!(f, "transport backend '{}' is not available", kind)
            }
            TransportError::Io(e) => write!(f, "transport I/O error: {}", e),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::Io(e)
    }
}
