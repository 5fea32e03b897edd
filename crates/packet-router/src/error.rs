//! Error types for the packet router.

use shared_types::{Direction, MessageTypeId, PeerId, TransportError};
use thiserror::Error;

use crate::domain::{Priority, Registrant};

/// Error returned by a listener or monitor callback.
///
/// Any `std::error::Error + Send + Sync` (and `anyhow::Error`) converts into
/// it with `?` or `.into()`.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while routing or delivering a message.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The transport could not name the message's wire type.
    #[error("Cannot resolve message type for {direction} message to peer {peer}")]
    UnresolvableType { direction: Direction, peer: PeerId },

    /// An observer callback failed; the rest of the chain was skipped.
    #[error("{priority:?} observer of {registrant} failed on {direction} message {type_id}: {source}")]
    ObserverFailed {
        registrant: Registrant,
        priority: Priority,
        direction: Direction,
        type_id: MessageTypeId,
        #[source]
        source: CallbackError,
    },

    /// The transport failed for a reason other than the peer logging out.
    #[error("Error while delivering {direction} message to peer {peer}: {source}")]
    Transport {
        direction: Direction,
        peer: PeerId,
        #[source]
        source: TransportError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
