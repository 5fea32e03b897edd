//! Ports for the packet router.
//!
//! - `inbound`: API exposed to registrants and to the host transport.
//! - `outbound`: SPI the router needs from a host transport backend.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
