//! Scripted ATT/GATT conformance harness.
//!
//! Each case is a fixed script of PDUs. The harness plays the remote side
//! over a boundary-preserving transport pair: it checks every PDU the
//! collaborator sends against the script and writes the scripted replies
//! back, in order. Any divergence fails the case.
//!
//! # Usage
//!
//! ```bash
//! gatt-conformance --list
//! gatt-conformance --case /TP/GAD/CL/BV-01-C --verbose
//! ```
//!
//! The binary exits with:
//! - 0: Test passed
//! - 1: Test failed
//! - 2: Usage error

#![deny(unsafe_code)]

pub mod config;
pub mod driver;
pub mod hexdump;
pub mod peer;
pub mod script;
pub mod testcase;
pub mod tests;

use gatt_proto::Uuid;

use script::Script;
use testcase::{Procedure, Role, TestCase};

/// A registered conformance case, as written in the case tables.
#[derive(Debug)]
pub struct ConformanceTest {
    pub name: &'static str,
    pub role: Role,
    pub procedure: Procedure,
    pub filter: Option<Uuid>,
    /// Script entries, without the sentinel.
    pub pdus: &'static [&'static [u8]],
}

impl ConformanceTest {
    /// Copy the static tables into an owned [`TestCase`].
    pub fn to_case(&self) -> TestCase {
        let mut case = TestCase::new(self.name, self.role, Script::new(self.pdus.iter().copied()))
            .with_procedure(self.procedure);
        if let Some(filter) = self.filter {
            case = case.with_filter(filter);
        }
        case
    }
}
