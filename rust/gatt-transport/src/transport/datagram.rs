use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::UnixDatagram;

use crate::TransportError;

/// Endpoint of a connected `AF_UNIX`/`SOCK_DGRAM` socket pair.
///
/// The kernel keeps datagram boundaries. A datagram socket cannot report a
/// hangup the way a seqpacket socket does, so a vanished peer shows up as a
/// failed `send` rather than a zero-length `recv`.
#[derive(Debug)]
pub struct DatagramTransport {
    socket: UnixDatagram,
    closed: AtomicBool,
}

impl DatagramTransport {
    pub fn pair() -> Result<(Self, Self), TransportError> {
        let (a, b) = UnixDatagram::pair()?;
        Ok((
            Self {
                socket: a,
                closed: AtomicBool::new(false),
            },
            Self {
                socket: b,
                closed: AtomicBool::new(false),
            },
        ))
    }

    pub async fn send(&self, msg: &[u8]) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        Ok(self.socket.send(msg).await?)
    }

    pub async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        Ok(self.socket.recv(buf).await?)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
