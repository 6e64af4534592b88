//! ATT bearer: one transport endpoint, one outstanding request.
//!
//! [`Att`] is a cheap handle. Cloning takes a reference, dropping releases
//! it, and the bearer task (which owns the transport endpoint) is aborted
//! when the last reference goes away. Requests are queued FIFO and written
//! one at a time; the next request leaves only after the previous one was
//! answered by its response or by an Error Response.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use gatt_proto::{DEFAULT_MTU, ErrorCode, Opcode, PduError, is_command, pdu};
use gatt_transport::Transport;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::AttError;

/// Debug sink shared by the bearer and the client.
pub type DebugFn = Arc<dyn Fn(&str) + Send + Sync>;

type Reply = oneshot::Sender<Result<Vec<u8>, AttError>>;

struct PendingRequest {
    opcode: Opcode,
    pdu: Vec<u8>,
    /// `None` for fire-and-forget requests.
    reply: Option<Reply>,
}

impl PendingRequest {
    fn complete(self, result: Result<Vec<u8>, AttError>) {
        match self.reply {
            Some(reply) => {
                let _ = reply.send(result);
            }
            None => {
                if let Err(e) = result {
                    tracing::debug!(opcode = %self.opcode, error = %e, "unobserved request failed");
                }
            }
        }
    }
}

/// State shared between the handles and the bearer task.
struct Shared {
    mtu: AtomicU16,
    max_mtu: u16,
    debug: Mutex<Option<DebugFn>>,
}

impl Shared {
    fn debug(&self, msg: impl FnOnce() -> String) {
        let sink = self.debug.lock().clone();
        if let Some(sink) = sink {
            sink(&msg());
        }
    }
}

struct AttInner {
    requests: mpsc::UnboundedSender<PendingRequest>,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl Drop for AttInner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Protocol connection over one transport endpoint.
#[derive(Clone)]
pub struct Att {
    inner: Arc<AttInner>,
}

impl std::fmt::Debug for Att {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Att")
            .field("mtu", &self.mtu())
            .field("max_mtu", &self.max_mtu())
            .finish()
    }
}

impl Att {
    /// Take ownership of `transport` and start the bearer task.
    ///
    /// `max_mtu` bounds both the MTU offered during negotiation and the size
    /// of inbound PDUs. Must be called from within a tokio runtime.
    pub fn new(transport: Transport, max_mtu: u16) -> Self {
        let max_mtu = max_mtu.max(DEFAULT_MTU);
        let shared = Arc::new(Shared {
            mtu: AtomicU16::new(DEFAULT_MTU),
            max_mtu,
            debug: Mutex::new(None),
        });
        let (requests, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_bearer(transport, rx, shared.clone()));

        Self {
            inner: Arc::new(AttInner {
                requests,
                shared,
                task,
            }),
        }
    }

    /// Current ATT MTU (23 until an exchange completes).
    pub fn mtu(&self) -> u16 {
        self.inner.shared.mtu.load(Ordering::Acquire)
    }

    pub fn max_mtu(&self) -> u16 {
        self.inner.shared.max_mtu
    }

    /// Number of live handles to this bearer.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn set_debug(&self, sink: Option<DebugFn>) {
        *self.inner.shared.debug.lock() = sink;
    }

    /// Queue an MTU exchange without waiting for its outcome.
    ///
    /// The request is queued before this returns, so anything queued
    /// afterwards goes out after it.
    pub fn exchange_mtu(&self, mtu: u16) -> Result<(), AttError> {
        self.enqueue(pdu::exchange_mtu_req(mtu), None)
    }

    /// Exchange MTU and return the negotiated value.
    pub async fn exchange_mtu_with(&self, mtu: u16) -> Result<u16, AttError> {
        self.request(pdu::exchange_mtu_req(mtu)).await?;
        Ok(self.mtu())
    }

    /// Send a request PDU and wait for its response PDU.
    ///
    /// An Error Response comes back as [`AttError::Protocol`].
    pub async fn request(&self, pdu: Vec<u8>) -> Result<Vec<u8>, AttError> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(pdu, Some(tx))?;
        rx.await.map_err(|_| AttError::Closed)?
    }

    fn enqueue(&self, pdu: Vec<u8>, reply: Option<Reply>) -> Result<(), AttError> {
        let raw = *pdu.first().ok_or(AttError::Pdu(PduError::Empty))?;
        let opcode = Opcode::from_u8(raw)
            .filter(|op| op.is_request())
            .ok_or(AttError::NotARequest(raw))?;

        let mtu = self.mtu();
        if pdu.len() > mtu as usize {
            return Err(AttError::TooLong {
                len: pdu.len(),
                mtu,
            });
        }

        self.inner
            .requests
            .send(PendingRequest { opcode, pdu, reply })
            .map_err(|_| AttError::Closed)
    }
}

async fn run_bearer(
    transport: Transport,
    mut requests: mpsc::UnboundedReceiver<PendingRequest>,
    shared: Arc<Shared>,
) {
    let mut buf = vec![0u8; shared.max_mtu as usize];
    let mut queue: VecDeque<PendingRequest> = VecDeque::new();
    let mut in_flight: Option<PendingRequest> = None;
    let mut accepting = true;

    loop {
        if in_flight.is_none()
            && let Some(req) = queue.pop_front()
        {
            shared.debug(|| format!("ATT op 0x{:02x}", req.opcode.as_u8()));
            match transport.send(&req.pdu).await {
                Ok(n) if n == req.pdu.len() => {
                    tracing::trace!(opcode = %req.opcode, len = n, "request sent");
                    in_flight = Some(req);
                }
                Ok(n) => {
                    let expected = req.pdu.len();
                    req.complete(Err(AttError::ShortWrite {
                        expected,
                        written: n,
                    }));
                    continue;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "bearer send failed");
                    req.complete(Err(AttError::Transport(e)));
                    break;
                }
            }
        }

        tokio::select! {
            req = requests.recv(), if accepting => match req {
                Some(req) => queue.push_back(req),
                None => accepting = false,
            },
            res = transport.recv(&mut buf) => match res {
                Ok(0) => {
                    tracing::debug!("remote hung up");
                    break;
                }
                Ok(n) => handle_pdu(&transport, &buf[..n], &mut in_flight, &shared).await,
                Err(e) => {
                    tracing::debug!(error = %e, "bearer recv failed");
                    break;
                }
            },
        }
    }

    if let Some(req) = in_flight.take() {
        req.complete(Err(AttError::Closed));
    }
    for req in queue.drain(..) {
        req.complete(Err(AttError::Closed));
    }
}

async fn handle_pdu(
    transport: &Transport,
    pdu: &[u8],
    in_flight: &mut Option<PendingRequest>,
    shared: &Shared,
) {
    let raw = pdu[0];
    let opcode = Opcode::from_u8(raw);
    tracing::trace!(opcode = raw, len = pdu.len(), "PDU received");

    match opcode {
        Some(Opcode::ErrorRsp) => {
            let rsp = match pdu::parse_error_rsp(pdu) {
                Ok(rsp) => rsp,
                Err(e) => {
                    if let Some(req) = in_flight.take() {
                        req.complete(Err(e.into()));
                    }
                    return;
                }
            };
            match in_flight.take() {
                Some(req) if req.opcode.as_u8() == rsp.request => {
                    req.complete(Err(AttError::Protocol(rsp)));
                }
                other => {
                    tracing::warn!(request = rsp.request, "error response for no pending request");
                    *in_flight = other;
                }
            }
        }
        Some(op) if in_flight.as_ref().and_then(|r| r.opcode.response()) == Some(op) => {
            let Some(req) = in_flight.take() else {
                return;
            };
            if op == Opcode::ExchangeMtuRsp {
                match pdu::parse_exchange_mtu(pdu, op) {
                    Ok(remote) => {
                        let mtu = remote.min(shared.max_mtu).max(DEFAULT_MTU);
                        shared.mtu.store(mtu, Ordering::Release);
                        shared.debug(|| format!("MTU exchange complete, with MTU: {}", mtu));
                    }
                    Err(e) => {
                        req.complete(Err(e.into()));
                        return;
                    }
                }
            }
            req.complete(Ok(pdu.to_vec()));
        }
        Some(Opcode::HandleValueNotification) => {
            tracing::trace!(len = pdu.len(), "notification ignored");
        }
        Some(Opcode::HandleValueIndication) => {
            let confirm = [Opcode::HandleValueConfirmation.as_u8()];
            if let Err(e) = transport.send(&confirm).await {
                tracing::debug!(error = %e, "failed to confirm indication");
            }
        }
        _ if is_command(raw) => {
            tracing::trace!(opcode = raw, "command ignored");
        }
        Some(op) if !op.is_request() => {
            tracing::warn!(opcode = %op, "unexpected PDU");
        }
        _ => {
            // Requests and unknown non-command opcodes are refused.
            let rsp = pdu::error_rsp(raw, 0x0000, ErrorCode::RequestNotSupported);
            shared.debug(|| format!("ATT request 0x{:02x} not supported", raw));
            if let Err(e) = transport.send(&rsp).await {
                tracing::debug!(error = %e, "failed to send error response");
            }
        }
    }
}
