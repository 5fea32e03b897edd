//! # Error Types
//!
//! Errors a transport reports back to the router.

use thiserror::Error;

/// Failure reported by a transport while handing a message to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer logged out between the guard check and the write.
    #[error("Peer already disconnected")]
    PeerGone,

    /// The transport itself is shut down.
    #[error("Transport closed")]
    Closed,

    /// The transport refused the message.
    #[error("Message rejected: {0}")]
    Rejected(String),

    /// Lower-level I/O failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Whether this is the benign logout race.
    #[must_use]
    pub fn is_peer_gone(&self) -> bool {
        matches!(self, TransportError::PeerGone)
    }
}
