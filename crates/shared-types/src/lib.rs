//! # Shared Types Crate
//!
//! Types shared between the packet router and the transport that feeds it.
//!
//! ## Design Principles
//!
//! - **Opaque messages**: nothing here knows the wire layout of a message. A
//!   message is identified only by its numeric [`MessageTypeId`].
//! - **Transport-owned identity**: a [`PeerId`] is handed out by the transport
//!   and is only ever compared, hashed and logged by the router.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
