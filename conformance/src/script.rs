//! PDU scripts.
//!
//! A script is an ordered list of PDUs followed by a sentinel. Which side
//! a PDU belongs to is implied by its position: the scripted peer checks
//! inbound PDUs against the entry at the cursor and writes outbound ones
//! from it.

use crate::peer::ScriptViolation;

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    /// `false` only for the sentinel that ends a script.
    pub valid: bool,
    pub bytes: Vec<u8>,
}

impl TestVector {
    pub fn pdu(bytes: &[u8]) -> Self {
        Self {
            valid: true,
            bytes: bytes.to_vec(),
        }
    }

    pub fn sentinel() -> Self {
        Self {
            valid: false,
            bytes: Vec::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !self.valid
    }
}

/// An immutable script. Always ends with exactly one sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    vectors: Vec<TestVector>,
}

impl Script {
    /// Copy `pdus` into a script and append the sentinel.
    pub fn new<'a>(pdus: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut vectors: Vec<TestVector> = pdus.into_iter().map(TestVector::pdu).collect();
        vectors.push(TestVector::sentinel());
        Self { vectors }
    }

    /// Number of PDUs, not counting the sentinel.
    pub fn len(&self) -> usize {
        self.vectors.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The vector at `cursor`. The sentinel sits at `len()`; anything past
    /// it is an error.
    pub fn next(&self, cursor: usize) -> Result<&TestVector, ScriptViolation> {
        self.vectors
            .get(cursor)
            .ok_or(ScriptViolation::PastSentinel { cursor })
    }

    pub fn pdus(&self) -> impl Iterator<Item = &[u8]> {
        self.vectors
            .iter()
            .filter(|v| v.valid)
            .map(|v| v.bytes.as_slice())
    }
}
