//! # Core Entities
//!
//! Identity and routing primitives for intercepted traffic.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a remote connection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub Uuid);

impl PeerId {
    /// Create a fresh random peer identity.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a deterministic identity (fixtures, replays).
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric wire type of a message.
///
/// [`MessageTypeId::UNKNOWN`] is reserved: it is never routed and never
/// appears in a whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageTypeId(pub u32);

impl MessageTypeId {
    /// Sentinel for "type unknown, do not route".
    pub const UNKNOWN: MessageTypeId = MessageTypeId(u32::MAX);

    /// Whether this id is the reserved sentinel.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == u32::MAX
    }
}

impl From<u32> for MessageTypeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("unknown")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Which way a message travels relative to the local endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Received from the peer.
    Inbound,
    /// About to be written to the peer.
    Outbound,
}

impl Direction {
    /// Both directions, inbound first.
    pub const ALL: [Direction; 2] = [Direction::Inbound, Direction::Outbound];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

/// Correlation marker carried by the newer silent-send convention.
///
/// The router never inspects it; it only decides whether one is passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMarker(pub Vec<u8>);
