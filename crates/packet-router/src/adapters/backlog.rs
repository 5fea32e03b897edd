//! Outbound backlog accounting.

use shared_types::PeerId;
use std::sync::Arc;

use crate::ports::PacketTransport;

/// Reports queued-but-unflushed outbound entries per peer.
///
/// Queues are mutated concurrently by the transport, so every reading is a
/// best-effort snapshot.
pub struct BacklogAccountant<T: PacketTransport> {
    transport: Arc<T>,
}

impl<T: PacketTransport> BacklogAccountant<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Sum of the low and high priority queue entries, or 0 for an unknown peer.
    pub fn pending_bytes(&self, peer: &PeerId) -> u64 {
        self.transport
            .outbound_queue_lengths(peer)
            .map(|queues| queues.total())
            .unwrap_or(0)
    }
}
