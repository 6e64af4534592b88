use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::TransportError;

const CHANNEL_CAPACITY: usize = 64;

/// In-process endpoint backed by a pair of bounded channels.
///
/// Each message travels as its own `Bytes`, so boundaries are preserved by
/// construction.
#[derive(Debug)]
pub struct MemTransport {
    tx: mpsc::Sender<Bytes>,
    rx: tokio::sync::Mutex<mpsc::Receiver<Bytes>>,
    closed: AtomicBool,
}

impl MemTransport {
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = mpsc::channel(CHANNEL_CAPACITY);
        let (tx_b, rx_b) = mpsc::channel(CHANNEL_CAPACITY);

        let a = Self {
            tx: tx_b,
            rx: tokio::sync::Mutex::new(rx_a),
            closed: AtomicBool::new(false),
        };

        let b = Self {
            tx: tx_a,
            rx: tokio::sync::Mutex::new(rx_b),
            closed: AtomicBool::new(false),
        };

        (a, b)
    }

    pub async fn send(&self, msg: &[u8]) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        self.tx
            .send(Bytes::copy_from_slice(msg))
            .await
            .map_err(|_| TransportError::Closed)?;

        Ok(msg.len())
    }

    pub async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        let msg = {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        };

        let Some(msg) = msg else {
            return Ok(0);
        };

        let n = msg.len().min(buf.len());
        if n < msg.len() {
            tracing::trace!(len = msg.len(), capacity = buf.len(), "truncating message");
        }
        buf[..n].copy_from_slice(&msg[..n]);
        Ok(n)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio_test_lite::test]
    async fn drop_is_seen_as_hangup() {
        let (a, b) = MemTransport::pair();
        drop(a);

        let mut buf = [0u8; 8];
        assert_eq!(b.recv(&mut buf).await.unwrap(), 0);
        assert!(b.send(&[1]).await.unwrap_err().is_closed());
    }

    #[tokio_test_lite::test]
    async fn oversized_message_is_truncated() {
        let (a, b) = MemTransport::pair();
        a.send(&[1, 2, 3, 4, 5]).await.unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(b.recv(&mut buf).await.unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
    }

    #[tokio_test_lite::test]
    async fn closed_endpoint_refuses_io() {
        let (a, _b) = MemTransport::pair();
        a.close();
        assert!(a.is_closed());
        assert!(a.send(&[1]).await.unwrap_err().is_closed());
    }
}
