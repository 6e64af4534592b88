//! Duplex, boundary-preserving transports.
//!
//! A [`Transport`] is one endpoint of a connected pair. Every `send` on one
//! end arrives as exactly one `recv` on the other, never split and never
//! coalesced with its neighbours, which is what an ATT bearer expects from
//! L2CAP.

#![deny(unsafe_code)]

mod error;
mod transport;

pub use error::*;
pub use transport::*;
