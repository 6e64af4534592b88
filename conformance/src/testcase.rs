//! Test cases and their verdicts.

use std::fmt;

use gatt_att::AttError;
use gatt_proto::Uuid;
use gatt_transport::TransportError;

use crate::peer::ScriptViolation;
use crate::script::Script;

/// Which collaborator the driver attaches to endpoint A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A bare ATT bearer.
    RawTransport,
    /// A GATT client layered on a bearer.
    ClientUnderTest,
    /// A bare bearer acting as server; the harness speaks first.
    ServerUnderTest,
}

/// Protocol action the driver triggers once the collaborator is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Procedure {
    #[default]
    None,
    DiscoverPrimary,
}

/// A registered scenario.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub vectors: Script,
    pub role: Role,
    pub filter: Option<Uuid>,
    pub procedure: Procedure,
}

impl TestCase {
    pub fn new(name: impl Into<String>, role: Role, vectors: Script) -> Self {
        Self {
            name: name.into(),
            vectors,
            role,
            filter: None,
            procedure: Procedure::None,
        }
    }

    pub fn with_procedure(mut self, procedure: Procedure) -> Self {
        self.procedure = procedure;
        self
    }

    pub fn with_filter(mut self, filter: Uuid) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Why a run failed.
#[derive(Debug)]
pub enum HarnessError {
    Script(ScriptViolation),
    Transport(TransportError),
    /// The triggered procedure completed with an error.
    Procedure(AttError),
    /// The procedure succeeded but script entries remain.
    ScriptIncomplete { cursor: usize, len: usize },
    /// Nothing happened for the configured stall timeout.
    Stalled { cursor: usize },
    Setup(String),
    /// `run` was called after `teardown`.
    TornDown,
    /// The procedure task panicked or was cancelled.
    ProcedureTask(tokio::task::JoinError),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::Script(e) => write!(f, "script violation: {}", e),
            HarnessError::Transport(e) => write!(f, "transport error: {}", e),
            HarnessError::Procedure(e) => write!(f, "procedure failed: {}", e),
            HarnessError::ScriptIncomplete { cursor, len } => write!(
                f,
                "procedure completed with script at vector {} of {}",
                cursor, len
            ),
            HarnessError::Stalled { cursor } => write!(f, "stalled at vector {}", cursor),
            HarnessError::Setup(why) => write!(f, "setup failed: {}", why),
            HarnessError::TornDown => write!(f, "context already torn down"),
            HarnessError::ProcedureTask(e) => write!(f, "procedure task failed: {}", e),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Script(e) => Some(e),
            HarnessError::Transport(e) => Some(e),
            HarnessError::Procedure(e) => Some(e),
            HarnessError::ProcedureTask(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ScriptViolation> for HarnessError {
    fn from(e: ScriptViolation) -> Self {
        HarnessError::Script(e)
    }
}

impl From<TransportError> for HarnessError {
    fn from(e: TransportError) -> Self {
        HarnessError::Transport(e)
    }
}

/// Result of a conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub passed: bool,
    pub error: Option<String>,
}

impl TestResult {
    pub fn pass() -> Self {
        Self {
            passed: true,
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            passed: false,
            error: Some(error.into()),
        }
    }
}

impl From<Result<(), HarnessError>> for TestResult {
    fn from(result: Result<(), HarnessError>) -> Self {
        match result {
            Ok(()) => TestResult::pass(),
            Err(e) => TestResult::fail(e.to_string()),
        }
    }
}
