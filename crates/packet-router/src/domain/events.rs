//! Per-dispatch state and the event views handed to listeners.

use shared_types::PeerId;
use std::mem;

/// Mutable state of one message travelling through one dispatch.
///
/// Owned by the router for the duration of a single dispatch and never shared
/// between concurrent dispatches.
#[derive(Debug)]
pub struct DispatchEvent<M> {
    pub peer: PeerId,
    pub packet: M,
    pub cancelled: bool,
}

impl<M> DispatchEvent<M> {
    pub fn new(peer: PeerId, packet: M) -> Self {
        Self {
            peer,
            packet,
            cancelled: false,
        }
    }

    pub fn into_outcome(self) -> DispatchOutcome<M> {
        DispatchOutcome {
            packet: self.packet,
            cancelled: self.cancelled,
        }
    }
}

/// Final message value and cancellation state after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome<M> {
    pub packet: M,
    pub cancelled: bool,
}

/// A message received from a peer, as seen by a listener.
///
/// The cancelled flag starts at whatever earlier listeners left it at.
#[derive(Debug)]
pub struct PacketReceiveEvent<'a, M> {
    peer: &'a PeerId,
    packet: &'a mut M,
    cancelled: bool,
}

impl<'a, M> PacketReceiveEvent<'a, M> {
    pub fn new(peer: &'a PeerId, packet: &'a mut M, cancelled: bool) -> Self {
        Self {
            peer,
            packet,
            cancelled,
        }
    }

    pub fn peer(&self) -> &PeerId {
        self.peer
    }

    pub fn packet(&self) -> &M {
        self.packet
    }

    pub fn packet_mut(&mut self) -> &mut M {
        self.packet
    }

    /// Replace the message, returning the previous one.
    pub fn set_packet(&mut self, packet: M) -> M {
        mem::replace(self.packet, packet)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

/// A message about to be written to a peer, as seen by a listener.
#[derive(Debug)]
pub struct PacketSendEvent<'a, M> {
    peer: &'a PeerId,
    packet: &'a mut M,
    cancelled: bool,
}

impl<'a, M> PacketSendEvent<'a, M> {
    pub fn new(peer: &'a PeerId, packet: &'a mut M, cancelled: bool) -> Self {
        Self {
            peer,
            packet,
            cancelled,
        }
    }

    pub fn peer(&self) -> &PeerId {
        self.peer
    }

    pub fn packet(&self) -> &M {
        self.packet
    }

    pub fn packet_mut(&mut self) -> &mut M {
        self.packet
    }

    /// Replace the message, returning the previous one.
    pub fn set_packet(&mut self, packet: M) -> M {
        mem::replace(self.packet, packet)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

/// Read-only view handed to monitors.
///
/// `is_cancelled` reports the final state decided by the listeners. Silent
/// sends are never cancelled.
#[derive(Debug, Clone, Copy)]
pub struct MonitorEvent<'a, M> {
    peer: &'a PeerId,
    packet: &'a M,
    cancelled: bool,
}

impl<'a, M> MonitorEvent<'a, M> {
    pub fn new(peer: &'a PeerId, packet: &'a M, cancelled: bool) -> Self {
        Self {
            peer,
            packet,
            cancelled,
        }
    }

    pub fn peer(&self) -> &'a PeerId {
        self.peer
    }

    pub fn packet(&self) -> &'a M {
        self.packet
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
