//! Inbound ports (API) for the packet router.

use shared_types::{MessageTypeId, PeerId};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{MonitorEvent, PacketReceiveEvent, PacketSendEvent, Registrant, RegistrationInfo};
use crate::error::{BridgeError, CallbackError};

/// Observer that may mutate or cancel messages.
///
/// Both callbacks default to doing nothing, so a listener only interested in
/// one direction implements one method. Returning an error aborts the rest of
/// the dispatch unless observer isolation is enabled.
pub trait PacketListener<M>: Send + Sync {
    /// Called for a whitelisted message received from a peer.
    fn on_packet_receive(&self, event: &mut PacketReceiveEvent<'_, M>) -> Result<(), CallbackError> {
        let _ = event;
        Ok(())
    }

    /// Called for a whitelisted message about to be written to a peer.
    fn on_packet_send(&self, event: &mut PacketSendEvent<'_, M>) -> Result<(), CallbackError> {
        let _ = event;
        Ok(())
    }
}

/// Read-only observer that runs after every listener.
///
/// Monitors see the final message value and cancelled flag and can change
/// neither.
pub trait PacketMonitor<M>: Send + Sync {
    fn on_monitor_packet_receive(&self, event: &MonitorEvent<'_, M>) -> Result<(), CallbackError> {
        let _ = event;
        Ok(())
    }

    fn on_monitor_packet_send(&self, event: &MonitorEvent<'_, M>) -> Result<(), CallbackError> {
        let _ = event;
        Ok(())
    }
}

/// Registration table operations.
///
/// Observer identity is the `Arc` allocation: removing a listener removes
/// every registration made with a clone of the same `Arc`.
pub trait ObserverRegistry<M>: Send + Sync {
    /// Register a listener for the requested ids.
    ///
    /// Ids the backend does not support in a direction are silently left out
    /// of that direction's whitelist.
    fn add_listener(
        &self,
        registrant: Registrant,
        listener: Arc<dyn PacketListener<M>>,
        ids: &[MessageTypeId],
    );

    /// Register a monitor for the requested ids.
    fn add_monitor(&self, registrant: Registrant, monitor: Arc<dyn PacketMonitor<M>>, ids: &[MessageTypeId]);

    /// Remove every registration of `listener`. Returns how many were removed.
    fn remove_listener(&self, listener: &Arc<dyn PacketListener<M>>) -> usize;

    /// Remove every registration of `monitor`. Returns how many were removed.
    fn remove_monitor(&self, monitor: &Arc<dyn PacketMonitor<M>>) -> usize;

    /// Atomically remove every listener and monitor owned by `registrant`.
    fn remove_all(&self, registrant: &Registrant);

    /// Registrants with a listener whose outbound whitelist contains `id`.
    ///
    /// Monitors are never included.
    fn listening(&self, id: MessageTypeId) -> HashSet<Registrant>;

    /// Snapshot of the registration table, listeners first then monitors.
    fn registrations(&self) -> Vec<RegistrationInfo>;

    /// Re-register every observer on `target` with its original requested ids.
    ///
    /// Listeners are transferred before monitors, each in registration order.
    /// The source is left untouched.
    fn transfer_all(&self, target: &dyn ObserverRegistry<M>);
}

/// Entry point for delivering messages through the router.
pub trait PacketGateway<M>: Send + Sync {
    /// Human readable name of the host backend.
    fn backend_name(&self) -> &str;

    /// Deliver a message as if it had been received from `peer`.
    ///
    /// Runs the inbound chain and hands the message to the host unless a
    /// listener cancelled it.
    fn deliver_inbound(&self, peer: &PeerId, packet: M) -> Result<(), BridgeError>;

    /// Write a message to `peer`.
    ///
    /// With `through_listeners` the outbound chain runs first and a cancelled
    /// message is not written. Without it the message goes out unmodified and
    /// only monitors are notified.
    fn deliver_outbound(&self, peer: &PeerId, packet: M, through_listeners: bool) -> Result<(), BridgeError>;

    /// Bytes still queued for `peer` in the transport, or 0 if unknown.
    fn pending_bytes(&self, peer: &PeerId) -> u64;
}
