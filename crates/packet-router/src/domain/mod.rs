//! # Domain Layer for Packet Routing
//!
//! Pure logic with no I/O. Nothing here touches a transport directly; the
//! transport's capability table is passed in as a predicate.
//!
//! ## Contents
//!
//! - **whitelist**: `Priority`, `Whitelist`, `WhitelistPair` and the filtering rule
//! - **registration**: `Registrant` and the `RegistrationInfo` snapshot row
//! - **events**: per-dispatch state and the listener-facing event views
//! - **config**: `BridgeConfig` and the silent-send mode

mod config;
mod events;
mod registration;
mod whitelist;

pub use config::*;
pub use events::*;
pub use registration::*;
pub use whitelist::*;
