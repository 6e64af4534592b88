//! Harness configuration.

use std::time::Duration;

use gatt_transport::TransportKind;

pub const DEFAULT_MTU: u16 = 512;
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(5);

const ENV_VERBOSE: &str = "GATT_CONFORMANCE_VERBOSE";
const ENV_TRANSPORT: &str = "GATT_CONFORMANCE_TRANSPORT";
const ENV_TIMEOUT_MS: &str = "GATT_CONFORMANCE_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// MTU the collaborator offers, also the largest inbound PDU accepted.
    pub mtu: u16,
    /// Hex dump every exchange and turn on collaborator debug output.
    pub verbose: bool,
    pub transport: TransportKind,
    /// Fail a run that makes no progress for this long.
    pub stall_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mtu: DEFAULT_MTU,
            verbose: false,
            transport: TransportKind::default(),
            stall_timeout: DEFAULT_STALL_TIMEOUT,
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by `GATT_CONFORMANCE_*` environment variables.
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup(ENV_VERBOSE) {
            config.verbose = matches!(v.as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = lookup(ENV_TRANSPORT) {
            match v.parse() {
                Ok(kind) => config.transport = kind,
                Err(e) => tracing::warn!(%e, "ignoring {}", ENV_TRANSPORT),
            }
        }
        if let Some(v) = lookup(ENV_TIMEOUT_MS) {
            match v.parse::<u64>() {
                Ok(ms) if ms > 0 => config.stall_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(value = %v, "ignoring {}", ENV_TIMEOUT_MS),
            }
        }

        config
    }
}
