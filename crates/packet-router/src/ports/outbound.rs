//! Outbound ports (SPI) for the packet router.

use shared_types::{Direction, MessageTypeId, NetworkMarker, PeerId, TransportError};

/// Host transport backend.
///
/// The router never inspects message bodies itself; everything it needs to
/// know about a message or peer goes through this trait.
pub trait PacketTransport: Send + Sync + 'static {
    /// Opaque message value carried by this backend.
    type Packet: Send + Sync + 'static;

    /// Backend name, for logs and diagnostics.
    fn name(&self) -> &str;

    /// Whether the backend currently handles `id` for received messages.
    fn supports_inbound_type(&self, id: MessageTypeId) -> bool;

    /// Whether the backend currently handles `id` for sent messages.
    fn supports_outbound_type(&self, id: MessageTypeId) -> bool;

    fn supports(&self, direction: Direction, id: MessageTypeId) -> bool {
        match direction {
            Direction::Inbound => self.supports_inbound_type(id),
            Direction::Outbound => self.supports_outbound_type(id),
        }
    }

    /// Wire type of a message, if the backend can name it.
    fn resolve_type_id(&self, packet: &Self::Packet) -> Option<MessageTypeId>;

    /// Whether `peer` still has a live connection.
    fn is_connected(&self, peer: &PeerId) -> bool;

    /// Whether `peer` is a real connected party rather than a simulated one.
    fn is_legitimate_peer(&self, peer: &PeerId) -> bool;

    /// Write a message to `peer`.
    fn write(&self, peer: &PeerId, packet: Self::Packet) -> Result<(), TransportError>;

    /// Hand a received message to the host's normal processing.
    fn process_inbound(&self, peer: &PeerId, packet: Self::Packet) -> Result<(), TransportError>;

    /// Optional capabilities of this backend version.
    ///
    /// Probed once when a gateway is built.
    fn send_capabilities(&self) -> SendCapabilities;

    /// Write a message that bypasses the host's own listener machinery.
    fn write_silent(&self, peer: &PeerId, packet: Self::Packet, call: SilentSendCall) -> Result<(), TransportError>;

    /// Entry counts of the peer's outbound queues, if the peer is known.
    fn outbound_queue_lengths(&self, peer: &PeerId) -> Option<QueueLengths>;
}

/// Optional backend features that changed between versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendCapabilities {
    /// The network marker type exists.
    pub network_marker: bool,
    /// The 4-argument silent send (marker plus filtered flag) exists.
    pub marked_silent_send: bool,
}

impl SendCapabilities {
    pub fn legacy() -> Self {
        Self::default()
    }

    pub fn marked() -> Self {
        Self {
            network_marker: true,
            marked_silent_send: true,
        }
    }
}

/// Arguments of a silent send, in the shape each backend generation expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SilentSendCall {
    /// `(peer, packet, filtered)`
    Legacy { filtered: bool },
    /// `(peer, packet, marker, filtered)`
    Marked {
        marker: Option<NetworkMarker>,
        filtered: bool,
    },
}

/// Outbound queue sizes for one peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueLengths {
    pub low: u64,
    pub high: u64,
}

impl QueueLengths {
    pub fn total(&self) -> u64 {
        self.low.saturating_add(self.high)
    }
}
