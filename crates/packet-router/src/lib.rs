//! # Packet Router
//!
//! Sits between live peer connections and independently registered observers.
//! Observers inspect, mutate, cancel or silently inject protocol messages
//! without hooking the transport themselves.
//!
//! ## Architecture Role
//!
//! ```text
//! [Transport] ──deliver_inbound/outbound──→ [InjectionGateway]
//!                                                 │
//!                                                 ↓ dispatch
//!                                           [PacketRouter]
//!                                     listeners (registration order)
//!                                                 ↓
//!                                     monitors (final outcome, read-only)
//!                                                 │
//!                          write / process_inbound / silent send (shim)
//!                                                 ↓
//!                                            [Transport]
//! ```
//!
//! ## Guarantees
//!
//! - Whitelists only contain ids the backend supports in that direction.
//! - Monitors run after every listener and can never change cancellation.
//! - Silent sends never reach listeners.
//! - `remove_all` is atomic with respect to dispatch snapshots.
//! - `transfer_all` preserves registration order and the original requested ids.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{BacklogAccountant, CompatibilityShim, SilentSendConvention};
pub use domain::*;
pub use error::{BridgeError, CallbackError};
pub use metrics::{MetricsSnapshot, RouterMetrics};
pub use ports::inbound::{ObserverRegistry, PacketGateway, PacketListener, PacketMonitor};
pub use ports::outbound::{PacketTransport, QueueLengths, SendCapabilities, SilentSendCall};
pub use service::{InjectionGateway, ObserverAdapter, ObserverKind, PacketRouter};
