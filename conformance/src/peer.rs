//! The scripted peer.
//!
//! [`ScriptedPeer`] impersonates the remote side of the connection. It does
//! no I/O itself: the driver hands it every inbound message and asks it for
//! the next outbound one, and the peer tracks the script cursor and decides
//! whether the exchange still matches.
//!
//! The cursor moves by exactly one per consumed or emitted vector. At most
//! one send is pending at a time: a send is scheduled once per inbound match
//! (or once by [`ScriptedPeer::schedule_send`]) and cleared when it has been
//! written.

use std::fmt;

use crate::script::Script;

/// Where the peer is in its script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Next step is reading a message from the collaborator.
    WaitingForInbound,
    /// A scripted send is pending.
    SendScheduled,
    /// The cursor reached the sentinel.
    TerminatedSuccess,
    TerminatedFailure,
}

impl PeerState {
    pub fn is_terminated(self) -> bool {
        matches!(
            self,
            PeerState::TerminatedSuccess | PeerState::TerminatedFailure
        )
    }
}

/// Ways an exchange can diverge from its script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptViolation {
    LengthMismatch {
        cursor: usize,
        expected: usize,
        actual: usize,
    },
    ContentMismatch {
        cursor: usize,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },
    /// Something was read or written after the script ended.
    PastSentinel { cursor: usize },
    /// A zero-length read: the collaborator hung up.
    UnexpectedClose { cursor: usize },
    /// Inbound message larger than the maximum PDU size.
    Oversized { len: usize, max: usize },
    /// A send was scheduled while another one was still pending.
    DoubleSchedule { cursor: usize },
    ShortWrite {
        cursor: usize,
        expected: usize,
        written: usize,
    },
    /// The peer already failed.
    Terminated,
}

impl fmt::Display for ScriptViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptViolation::LengthMismatch {
                cursor,
                expected,
                actual,
            } => write!(
                f,
                "vector {}: expected {} bytes, got {}",
                cursor, expected, actual
            ),
            ScriptViolation::ContentMismatch {
                cursor,
                expected,
                actual,
            } => write!(
                f,
                "vector {}: expected [{}], got [{}]",
                cursor,
                hex(expected),
                hex(actual)
            ),
            ScriptViolation::PastSentinel { cursor } => {
                write!(f, "vector {}: past the end of the script", cursor)
            }
            ScriptViolation::UnexpectedClose { cursor } => {
                write!(f, "vector {}: connection closed by collaborator", cursor)
            }
            ScriptViolation::Oversized { len, max } => {
                write!(f, "inbound PDU of {} bytes exceeds maximum {}", len, max)
            }
            ScriptViolation::DoubleSchedule { cursor } => {
                write!(f, "vector {}: send already scheduled", cursor)
            }
            ScriptViolation::ShortWrite {
                cursor,
                expected,
                written,
            } => write!(
                f,
                "vector {}: short write, {} of {} bytes",
                cursor, written, expected
            ),
            ScriptViolation::Terminated => write!(f, "scripted peer already failed"),
        }
    }
}

impl std::error::Error for ScriptViolation {}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug)]
pub struct ScriptedPeer {
    script: Script,
    cursor: usize,
    state: PeerState,
    send_pending: bool,
    /// Length of the vector handed out by the last `begin_send`.
    in_progress: Option<usize>,
}

impl ScriptedPeer {
    pub fn new(script: Script) -> Self {
        let state = if script.is_empty() {
            PeerState::TerminatedSuccess
        } else {
            PeerState::WaitingForInbound
        };
        Self {
            script,
            cursor: 0,
            state,
            send_pending: false,
            in_progress: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn send_pending(&self) -> bool {
        self.send_pending
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// True once the cursor sits on the sentinel with nothing left to send.
    pub fn is_complete(&self) -> bool {
        self.state == PeerState::TerminatedSuccess && !self.send_pending
    }

    /// Check one inbound message against the script.
    ///
    /// On a match the next scripted send is scheduled, or the peer
    /// terminates successfully if the script is exhausted.
    pub fn on_inbound(&mut self, bytes: &[u8]) -> Result<PeerState, ScriptViolation> {
        if self.state == PeerState::TerminatedFailure {
            return Err(ScriptViolation::Terminated);
        }
        if bytes.is_empty() {
            return self.fail(ScriptViolation::UnexpectedClose {
                cursor: self.cursor,
            });
        }

        let cursor = self.cursor;
        let vector = match self.script.next(cursor) {
            Ok(v) if v.valid => v,
            Ok(_) => return self.fail(ScriptViolation::PastSentinel { cursor }),
            Err(e) => return self.fail(e),
        };
        self.cursor += 1;

        if vector.bytes.len() != bytes.len() {
            let expected = vector.bytes.len();
            return self.fail(ScriptViolation::LengthMismatch {
                cursor,
                expected,
                actual: bytes.len(),
            });
        }
        if vector.bytes != bytes {
            let expected = vector.bytes.clone();
            return self.fail(ScriptViolation::ContentMismatch {
                cursor,
                expected,
                actual: bytes.to_vec(),
            });
        }

        if self.at_sentinel()? {
            self.state = PeerState::TerminatedSuccess;
        } else {
            self.send_pending = true;
            self.state = PeerState::SendScheduled;
        }
        tracing::debug!(cursor = self.cursor, state = ?self.state, "inbound matched");
        Ok(self.state)
    }

    /// Schedule a send without a preceding inbound match.
    pub fn schedule_send(&mut self) -> Result<(), ScriptViolation> {
        if self.state.is_terminated() {
            return Err(ScriptViolation::Terminated);
        }
        if self.send_pending {
            return self.fail(ScriptViolation::DoubleSchedule {
                cursor: self.cursor,
            });
        }
        self.send_pending = true;
        self.state = PeerState::SendScheduled;
        Ok(())
    }

    /// Take the next vector for writing and advance the cursor.
    ///
    /// Must be paired with [`finish_send`](Self::finish_send) once the
    /// bytes were written.
    pub fn begin_send(&mut self) -> Result<Vec<u8>, ScriptViolation> {
        if self.state == PeerState::TerminatedFailure {
            return Err(ScriptViolation::Terminated);
        }

        let cursor = self.cursor;
        let bytes = match self.script.next(cursor) {
            Ok(v) if v.valid => v.bytes.clone(),
            Ok(_) => return self.fail(ScriptViolation::PastSentinel { cursor }),
            Err(e) => return self.fail(e),
        };
        self.cursor += 1;
        self.in_progress = Some(bytes.len());
        Ok(bytes)
    }

    /// Record how many bytes the transport accepted for the vector handed
    /// out by [`begin_send`](Self::begin_send).
    pub fn finish_send(&mut self, written: usize) -> Result<PeerState, ScriptViolation> {
        let Some(expected) = self.in_progress.take() else {
            return Err(ScriptViolation::Terminated);
        };
        self.send_pending = false;

        if written != expected {
            return self.fail(ScriptViolation::ShortWrite {
                cursor: self.cursor - 1,
                expected,
                written,
            });
        }

        self.state = if self.at_sentinel()? {
            PeerState::TerminatedSuccess
        } else {
            PeerState::WaitingForInbound
        };
        tracing::debug!(cursor = self.cursor, state = ?self.state, "scripted send written");
        Ok(self.state)
    }

    /// Drop a pending send, if any. Returns whether one was pending.
    pub fn cancel_send(&mut self) -> bool {
        let was_pending = self.send_pending;
        self.send_pending = false;
        self.in_progress = None;
        if self.state == PeerState::SendScheduled {
            self.state = PeerState::WaitingForInbound;
        }
        was_pending
    }

    fn at_sentinel(&mut self) -> Result<bool, ScriptViolation> {
        match self.script.next(self.cursor) {
            Ok(v) => Ok(v.is_sentinel()),
            Err(e) => self.fail(e),
        }
    }

    fn fail<T>(&mut self, violation: ScriptViolation) -> Result<T, ScriptViolation> {
        tracing::debug!(cursor = self.cursor, %violation, "script violated");
        self.state = PeerState::TerminatedFailure;
        self.send_pending = false;
        self.in_progress = None;
        Err(violation)
    }
}

/// Reusable receive buffer bounded by the maximum PDU size.
///
/// One spare byte lets an oversized message show up as longer than the
/// maximum instead of being silently truncated to it.
#[derive(Debug)]
pub struct InboundBuffer {
    buf: Vec<u8>,
    max: usize,
}

impl InboundBuffer {
    pub fn new(max: usize) -> Self {
        Self {
            buf: vec![0u8; max + 1],
            max,
        }
    }

    pub fn slot(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// The first `len` bytes of the last read.
    pub fn filled(&self, len: usize) -> Result<&[u8], ScriptViolation> {
        if len > self.max {
            return Err(ScriptViolation::Oversized { len, max: self.max });
        }
        Ok(&self.buf[..len])
    }
}
