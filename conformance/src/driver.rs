//! Per-case setup, run loop and teardown.
//!
//! Every run gets its own current-thread runtime, transport pair and
//! [`RunContext`]. Endpoint A goes to the collaborator; endpoint B stays
//! with the context and is the only thing the scripted peer reads from and
//! writes to.
//!
//! Scripted sends are deferred: the run loop yields to the scheduler once
//! before writing, so the collaborator finishes reacting to the message it
//! just got before the next scripted one arrives.

use std::sync::Arc;

use gatt_att::{Att, AttError, DebugFn, GattClient, PrimaryService};
use gatt_transport::{Transport, TransportError};
use tokio::task::{JoinError, JoinHandle};

use crate::config::HarnessConfig;
use crate::hexdump::{self, INBOUND, OUTBOUND};
use crate::peer::{InboundBuffer, PeerState, ScriptedPeer};
use crate::testcase::{HarnessError, Procedure, Role, TestCase, TestResult};

type ProcedureHandle = JoinHandle<Result<Vec<PrimaryService>, AttError>>;

/// What a call to [`RunContext::teardown`] released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Released {
    pub watch: bool,
    pub pending_send: bool,
    pub procedure: bool,
    pub client: bool,
    pub att: bool,
}

impl Released {
    pub fn anything(&self) -> bool {
        self.watch || self.pending_send || self.procedure || self.client || self.att
    }
}

/// Mutable state of one run.
pub struct RunContext {
    case: TestCase,
    config: HarnessConfig,
    client: Option<GattClient>,
    att: Option<Att>,
    /// Endpoint B.
    watch: Option<Transport>,
    procedure: Option<ProcedureHandle>,
    peer: ScriptedPeer,
    inbound: InboundBuffer,
    torn_down: bool,
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("case", &self.case.name)
            .field("cursor", &self.peer.cursor())
            .field("state", &self.peer.state())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl RunContext {
    /// Set up the transport and the collaborator for `case`, and trigger
    /// its procedure. Must be called from within a tokio runtime.
    pub fn create(case: TestCase, config: HarnessConfig) -> Result<Self, HarnessError> {
        let (a, b) = Transport::pair(config.transport)
            .map_err(|e| HarnessError::Setup(format!("transport pair: {}", e)))?;

        let mtu = config.mtu;
        let att = Att::new(a, mtu);
        if config.verbose {
            att.set_debug(Some(debug_sink("att: ")));
        }

        let mut peer = ScriptedPeer::new(case.vectors.clone());
        let mut client = None;
        match case.role {
            Role::RawTransport => {
                att.exchange_mtu(mtu)
                    .map_err(|e| HarnessError::Setup(format!("MTU exchange: {}", e)))?;
            }
            Role::ClientUnderTest => {
                let c = GattClient::new(att.clone(), mtu);
                if config.verbose {
                    c.set_debug(Some(debug_sink("gatt: ")));
                }
                client = Some(c);
            }
            Role::ServerUnderTest => {
                peer.schedule_send()?;
            }
        }

        let procedure = match case.procedure {
            Procedure::None => None,
            Procedure::DiscoverPrimary => {
                let filter = case.filter;
                let handle = match &client {
                    Some(client) => {
                        let client = client.clone();
                        tokio::spawn(async move { client.discover_primary_services(filter).await })
                    }
                    None => {
                        let att = att.clone();
                        tokio::spawn(async move {
                            gatt_att::discover_primary_services(&att, filter).await
                        })
                    }
                };
                Some(handle)
            }
        };

        tracing::debug!(case = %case.name, role = ?case.role, transport = %config.transport, "context created");

        Ok(Self {
            inbound: InboundBuffer::new(usize::from(mtu)),
            case,
            config,
            client,
            att: Some(att),
            watch: Some(b),
            procedure,
            peer,
            torn_down: false,
        })
    }

    pub fn peer(&self) -> &ScriptedPeer {
        &self.peer
    }

    /// Drive the exchange until it passes or fails.
    ///
    /// A match on the last expected message ends the run at once, abandoning
    /// a procedure that is still in flight. When the script instead ends on a
    /// scripted send, the run waits for the procedure to complete.
    pub async fn run(&mut self) -> Result<(), HarnessError> {
        if self.torn_down {
            return Err(HarnessError::TornDown);
        }

        loop {
            if self.procedure.is_none() && self.peer.is_complete() {
                return Ok(());
            }

            let send_due = self.peer.send_pending();
            let reading = !send_due && self.watch.is_some();

            tokio::select! {
                biased;

                done = wait_procedure(&mut self.procedure), if self.procedure.is_some() => {
                    self.procedure = None;
                    self.on_procedure_done(done)?;
                    return Ok(());
                }

                _ = tokio::task::yield_now(), if send_due => {
                    self.emit().await?;
                }

                res = recv_watch(&self.watch, &mut self.inbound), if reading => {
                    let n = res?;
                    let pdu = self.inbound.filled(n)?;
                    if self.config.verbose {
                        hexdump::log(INBOUND, pdu);
                    }
                    if self.peer.on_inbound(pdu)? == PeerState::TerminatedSuccess {
                        // The last expected message arrived: the script is
                        // done whether or not the procedure has finished.
                        if let Some(handle) = self.procedure.take() {
                            handle.abort();
                        }
                        return Ok(());
                    }
                }

                _ = tokio::time::sleep(self.config.stall_timeout) => {
                    return Err(HarnessError::Stalled { cursor: self.peer.cursor() });
                }
            }
        }
    }

    /// Write the pending scripted PDU to endpoint B.
    async fn emit(&mut self) -> Result<(), HarnessError> {
        let bytes = self.peer.begin_send()?;
        if self.config.verbose {
            hexdump::log(OUTBOUND, &bytes);
        }
        let watch = self.watch.as_ref().ok_or(TransportError::Closed)?;
        let written = watch.send(&bytes).await?;
        self.peer.finish_send(written)?;
        Ok(())
    }

    fn on_procedure_done(
        &self,
        done: Result<Result<Vec<PrimaryService>, AttError>, JoinError>,
    ) -> Result<(), HarnessError> {
        let services = done
            .map_err(HarnessError::ProcedureTask)?
            .map_err(HarnessError::Procedure)?;

        tracing::debug!(count = services.len(), "procedure complete");
        if self.config.verbose {
            for svc in &services {
                tracing::info!(
                    "start: 0x{:04x}, end: 0x{:04x}, uuid: {}",
                    svc.start,
                    svc.end,
                    svc.uuid
                );
            }
        }

        if !self.peer.is_complete() {
            return Err(HarnessError::ScriptIncomplete {
                cursor: self.peer.cursor(),
                len: self.peer.script().len(),
            });
        }
        Ok(())
    }

    /// Release everything the context holds. Only the first call releases
    /// anything; later calls return an empty [`Released`].
    pub fn teardown(&mut self) -> Released {
        if self.torn_down {
            return Released::default();
        }
        self.torn_down = true;

        let procedure = match self.procedure.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        };
        let released = Released {
            watch: self.watch.take().is_some(),
            pending_send: self.peer.cancel_send(),
            procedure,
            client: self.client.take().is_some(),
            att: self.att.take().is_some(),
        };
        tracing::debug!(case = %self.case.name, ?released, "context torn down");
        released
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn wait_procedure(
    procedure: &mut Option<ProcedureHandle>,
) -> Result<Result<Vec<PrimaryService>, AttError>, JoinError> {
    match procedure.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn recv_watch(
    watch: &Option<Transport>,
    inbound: &mut InboundBuffer,
) -> Result<usize, TransportError> {
    match watch {
        Some(transport) => transport.recv(inbound.slot()).await,
        None => std::future::pending().await,
    }
}

fn debug_sink(prefix: &'static str) -> DebugFn {
    Arc::new(move |msg: &str| tracing::info!("{}{}", prefix, msg))
}

/// Run one case to completion on a fresh current-thread runtime.
pub fn run_test_case(case: &TestCase, config: &HarnessConfig) -> TestResult {
    tracing::info!(case = %case.name, "running");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => return TestResult::fail(format!("failed to build runtime: {}", e)),
    };

    let result = runtime.block_on(async {
        let mut ctx = RunContext::create(case.clone(), config.clone())?;
        let result = ctx.run().await;
        ctx.teardown();
        result
    });

    match &result {
        Ok(()) => tracing::info!(case = %case.name, "passed"),
        Err(e) => tracing::info!(case = %case.name, error = %e, "failed"),
    }
    TestResult::from(result)
}
