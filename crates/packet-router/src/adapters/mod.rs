//! Adapters over the transport port.
//!
//! - `compat`: silent-send call convention, detected once per gateway.
//! - `backlog`: outbound queue accounting.

mod backlog;
mod compat;

pub use backlog::BacklogAccountant;
pub use compat::{CompatibilityShim, SilentSendConvention};
