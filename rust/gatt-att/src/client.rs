//! GATT client layered on an [`Att`] bearer.
//!
//! Creating a client starts an init task on the current runtime: MTU
//! exchange followed by discovery of every primary service. Callers can
//! wait for it with [`GattClient::ready`] or run their own procedures in
//! the meantime; the bearer serializes them.
//!
//! The client takes its own reference to the bearer. Whoever handed the
//! bearer in still holds theirs, and the connection stays up until both
//! are dropped.

use std::sync::Arc;

use gatt_proto::Uuid;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::bearer::DebugFn;
use crate::discovery::{self, PrimaryService};
use crate::{Att, AttError};

/// Progress of the init task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    Initializing,
    Ready(Vec<PrimaryService>),
    Failed(String),
}

struct ClientInner {
    att: Att,
    mtu: u16,
    debug: Arc<Mutex<Option<DebugFn>>>,
    state: watch::Receiver<ClientState>,
    init: JoinHandle<()>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.init.abort();
    }
}

#[derive(Clone)]
pub struct GattClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for GattClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GattClient")
            .field("mtu", &self.inner.mtu)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl GattClient {
    /// Build a client on `att`, offering `mtu` in the MTU exchange.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(att: Att, mtu: u16) -> Self {
        let debug: Arc<Mutex<Option<DebugFn>>> = Arc::new(Mutex::new(None));
        let (tx, state) = watch::channel(ClientState::Initializing);
        let init = tokio::spawn(init_client(att.clone(), mtu, debug.clone(), tx));

        Self {
            inner: Arc::new(ClientInner {
                att,
                mtu,
                debug,
                state,
                init,
            }),
        }
    }

    /// Number of live handles to this client.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Install a debug sink on the client and its bearer.
    pub fn set_debug(&self, sink: Option<DebugFn>) {
        self.inner.att.set_debug(sink.clone());
        *self.inner.debug.lock() = sink;
    }

    pub fn state(&self) -> ClientState {
        self.inner.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.inner.state.borrow(), ClientState::Ready(_))
    }

    /// Services found during init. Empty until the client is ready.
    pub fn services(&self) -> Vec<PrimaryService> {
        match &*self.inner.state.borrow() {
            ClientState::Ready(services) => services.clone(),
            _ => Vec::new(),
        }
    }

    /// Wait for init to finish.
    pub async fn ready(&self) -> Result<Vec<PrimaryService>, AttError> {
        let mut state = self.inner.state.clone();
        let settled = state
            .wait_for(|s| !matches!(s, ClientState::Initializing))
            .await
            .map_err(|_| AttError::Closed)?;
        match &*settled {
            ClientState::Ready(services) => Ok(services.clone()),
            ClientState::Failed(why) => Err(AttError::Init(why.clone())),
            ClientState::Initializing => Err(AttError::Closed),
        }
    }

    /// Discover primary services, optionally only those matching `filter`.
    pub async fn discover_primary_services(
        &self,
        filter: Option<Uuid>,
    ) -> Result<Vec<PrimaryService>, AttError> {
        let services = discovery::discover_primary_services(&self.inner.att, filter).await?;
        emit(&self.inner.debug, || {
            format!("Primary services found: {}", services.len())
        });
        Ok(services)
    }
}

fn emit(debug: &Mutex<Option<DebugFn>>, msg: impl FnOnce() -> String) {
    let sink = debug.lock().clone();
    if let Some(sink) = sink {
        sink(&msg());
    }
}

async fn init_client(
    att: Att,
    mtu: u16,
    debug: Arc<Mutex<Option<DebugFn>>>,
    state: watch::Sender<ClientState>,
) {
    let result = async {
        let negotiated = att.exchange_mtu_with(mtu).await?;
        tracing::debug!(mtu = negotiated, "client MTU negotiated");
        discovery::discover_primary_services(&att, None).await
    }
    .await;

    let next = match result {
        Ok(services) => {
            emit(&debug, || {
                format!("Primary services found: {}", services.len())
            });
            for svc in &services {
                emit(&debug, || {
                    format!(
                        "start: 0x{:04x}, end: 0x{:04x}, uuid: {}",
                        svc.start, svc.end, svc.uuid
                    )
                });
            }
            ClientState::Ready(services)
        }
        Err(e) => {
            tracing::debug!(error = %e, "client init failed");
            emit(&debug, || format!("Client initialisation failed: {}", e));
            ClientState::Failed(e.to_string())
        }
    };
    state.send_replace(next);
}
