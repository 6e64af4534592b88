//! ATT bearer and GATT client.
//!
//! [`Att`] owns one transport endpoint and runs the request/response side of
//! the attribute protocol on it. [`GattClient`] sits on top and adds MTU
//! negotiation and primary service discovery. Both are reference-counted
//! handles: clone to share, drop to release.

#![deny(unsafe_code)]

mod bearer;
mod client;
mod discovery;
mod error;

pub use bearer::{Att, DebugFn};
pub use client::{ClientState, GattClient};
pub use discovery::{PrimaryService, discover_primary_services};
pub use error::AttError;
