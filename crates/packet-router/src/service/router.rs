//! # Packet Router
//!
//! Owns the listener and monitor registrations and runs one dispatch per
//! message per direction.
//!
//! ## Ordering
//!
//! Listeners run first, in registration order. Monitors run last, in
//! registration order, against the final message and cancelled flag.
//!
//! ## Thread Safety
//!
//! The registration table sits behind a single `RwLock`. A dispatch takes a
//! snapshot of the interested adapters under the read lock and invokes them
//! after releasing it, so callbacks never run under the lock and registration
//! changes only affect later dispatches.

use parking_lot::RwLock;
use shared_types::{Direction, MessageTypeId, PeerId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::domain::{BridgeConfig, DispatchEvent, DispatchOutcome, MonitorEvent, Registrant, RegistrationInfo};
use crate::error::{BridgeError, CallbackError};
use crate::metrics::RouterMetrics;
use crate::ports::{ObserverRegistry, PacketListener, PacketMonitor, PacketTransport};
use crate::service::observer::{ObserverAdapter, ObserverKind};

type Adapters<M> = Vec<Arc<ObserverAdapter<M>>>;

struct Registrations<M> {
    listeners: Adapters<M>,
    monitors: Adapters<M>,
}

impl<M> Default for Registrations<M> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            monitors: Vec::new(),
        }
    }
}

/// Dispatch engine bound to one transport backend.
pub struct PacketRouter<T: PacketTransport> {
    transport: Arc<T>,
    registrations: RwLock<Registrations<T::Packet>>,
    config: BridgeConfig,
    metrics: Arc<RouterMetrics>,
}

impl<T: PacketTransport> PacketRouter<T> {
    pub fn new(transport: Arc<T>, config: BridgeConfig) -> Self {
        Self::with_metrics(transport, config, Arc::new(RouterMetrics::new()))
    }

    pub fn with_metrics(transport: Arc<T>, config: BridgeConfig, metrics: Arc<RouterMetrics>) -> Self {
        Self {
            transport,
            registrations: RwLock::new(Registrations::default()),
            config,
            metrics,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<RouterMetrics> {
        &self.metrics
    }

    /// Run the listener chain then the monitors for one message.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::UnresolvableType`] if the transport cannot name the
    ///   message type. No observer is invoked.
    /// - [`BridgeError::ObserverFailed`] if a callback fails and observer
    ///   isolation is off. Remaining observers are skipped.
    pub fn dispatch(
        &self,
        peer: &PeerId,
        packet: T::Packet,
        direction: Direction,
    ) -> Result<DispatchOutcome<T::Packet>, BridgeError> {
        let type_id = self.resolve(peer, &packet, direction)?;
        let (listeners, monitors) = self.interested(direction, type_id);

        let mut event = DispatchEvent::new(*peer, packet);
        for adapter in &listeners {
            if let Err(source) = adapter.dispatch(&mut event, direction) {
                self.observer_failed(adapter, direction, type_id, source)?;
            }
        }
        let view = MonitorEvent::new(&event.peer, &event.packet, event.cancelled);
        for adapter in &monitors {
            if let Err(source) = adapter.observe(&view, direction) {
                self.observer_failed(adapter, direction, type_id, source)?;
            }
        }

        self.metrics.record_dispatch(direction, event.cancelled);
        debug!(
            peer = %peer,
            type_id = %type_id,
            %direction,
            listeners = listeners.len(),
            monitors = monitors.len(),
            cancelled = event.cancelled,
            "Dispatched packet"
        );
        Ok(event.into_outcome())
    }

    /// Show a message to the monitors only. Used by silent sends.
    pub fn notify_monitors(&self, peer: &PeerId, packet: &T::Packet, direction: Direction) -> Result<(), BridgeError> {
        let type_id = self.resolve(peer, packet, direction)?;
        let monitors: Adapters<T::Packet> = {
            let registrations = self.registrations.read();
            interested_in(&registrations.monitors, direction, type_id)
        };

        let view = MonitorEvent::new(peer, packet, false);
        for adapter in &monitors {
            if let Err(source) = adapter.observe(&view, direction) {
                self.observer_failed(adapter, direction, type_id, source)?;
            }
        }
        Ok(())
    }

    fn resolve(&self, peer: &PeerId, packet: &T::Packet, direction: Direction) -> Result<MessageTypeId, BridgeError> {
        match self.transport.resolve_type_id(packet) {
            Some(id) if !id.is_unknown() => Ok(id),
            _ => Err(BridgeError::UnresolvableType {
                direction,
                peer: *peer,
            }),
        }
    }

    fn interested(&self, direction: Direction, type_id: MessageTypeId) -> (Adapters<T::Packet>, Adapters<T::Packet>) {
        let registrations = self.registrations.read();
        (
            interested_in(&registrations.listeners, direction, type_id),
            interested_in(&registrations.monitors, direction, type_id),
        )
    }

    fn observer_failed(
        &self,
        adapter: &ObserverAdapter<T::Packet>,
        direction: Direction,
        type_id: MessageTypeId,
        source: CallbackError,
    ) -> Result<(), BridgeError> {
        if !self.config.isolate_observer_failures {
            return Err(BridgeError::ObserverFailed {
                registrant: adapter.registrant().clone(),
                priority: adapter.priority(),
                direction,
                type_id,
                source,
            });
        }

        self.metrics.record_observer_failure();
        error!(
            registrant = %adapter.registrant(),
            priority = ?adapter.priority(),
            %direction,
            type_id = %type_id,
            error = %source,
            "Observer failed, continuing dispatch"
        );
        Ok(())
    }

    fn supports(&self) -> impl Fn(Direction, MessageTypeId) -> bool + '_ {
        move |direction, id| self.transport.supports(direction, id)
    }
}

fn interested_in<M>(adapters: &[Arc<ObserverAdapter<M>>], direction: Direction, type_id: MessageTypeId) -> Adapters<M> {
    adapters
        .iter()
        .filter(|adapter| adapter.interested_in(direction).contains(type_id))
        .cloned()
        .collect()
}

impl<T: PacketTransport> ObserverRegistry<T::Packet> for PacketRouter<T> {
    fn add_listener(&self, registrant: Registrant, listener: Arc<dyn PacketListener<T::Packet>>, ids: &[MessageTypeId]) {
        let adapter = ObserverAdapter::listener(registrant, listener, ids, self.supports());
        info!(
            registrant = %adapter.registrant(),
            backend = self.transport.name(),
            inbound = adapter.interested_in(Direction::Inbound).ids().len(),
            outbound = adapter.interested_in(Direction::Outbound).ids().len(),
            "Registered packet listener"
        );
        self.registrations.write().listeners.push(Arc::new(adapter));
    }

    fn add_monitor(&self, registrant: Registrant, monitor: Arc<dyn PacketMonitor<T::Packet>>, ids: &[MessageTypeId]) {
        let adapter = ObserverAdapter::monitor(registrant, monitor, ids, self.supports());
        info!(
            registrant = %adapter.registrant(),
            backend = self.transport.name(),
            inbound = adapter.interested_in(Direction::Inbound).ids().len(),
            outbound = adapter.interested_in(Direction::Outbound).ids().len(),
            "Registered packet monitor"
        );
        self.registrations.write().monitors.push(Arc::new(adapter));
    }

    fn remove_listener(&self, listener: &Arc<dyn PacketListener<T::Packet>>) -> usize {
        let mut registrations = self.registrations.write();
        let before = registrations.listeners.len();
        registrations.listeners.retain(|adapter| !adapter.wraps_listener(listener));
        let removed = before - registrations.listeners.len();
        debug!(removed, "Removed packet listener");
        removed
    }

    fn remove_monitor(&self, monitor: &Arc<dyn PacketMonitor<T::Packet>>) -> usize {
        let mut registrations = self.registrations.write();
        let before = registrations.monitors.len();
        registrations.monitors.retain(|adapter| !adapter.wraps_monitor(monitor));
        let removed = before - registrations.monitors.len();
        debug!(removed, "Removed packet monitor");
        removed
    }

    fn remove_all(&self, registrant: &Registrant) {
        let mut registrations = self.registrations.write();
        let before = registrations.listeners.len() + registrations.monitors.len();
        registrations.listeners.retain(|adapter| adapter.registrant() != registrant);
        registrations.monitors.retain(|adapter| adapter.registrant() != registrant);
        let removed = before - registrations.listeners.len() - registrations.monitors.len();
        info!(registrant = %registrant, removed, "Removed all registrations");
    }

    fn listening(&self, id: MessageTypeId) -> HashSet<Registrant> {
        self.registrations
            .read()
            .listeners
            .iter()
            .filter(|adapter| adapter.interested_in(Direction::Outbound).contains(id))
            .map(|adapter| adapter.registrant().clone())
            .collect()
    }

    fn registrations(&self) -> Vec<RegistrationInfo> {
        let registrations = self.registrations.read();
        registrations
            .listeners
            .iter()
            .chain(registrations.monitors.iter())
            .map(|adapter| adapter.info())
            .collect()
    }

    fn transfer_all(&self, target: &dyn ObserverRegistry<T::Packet>) {
        // Snapshot first so the target may be this router without deadlocking.
        let (listeners, monitors) = {
            let registrations = self.registrations.read();
            (registrations.listeners.clone(), registrations.monitors.clone())
        };

        for adapter in listeners.iter().chain(monitors.iter()) {
            let registrant = adapter.registrant().clone();
            match adapter.kind() {
                ObserverKind::Listener(listener) => {
                    target.add_listener(registrant, Arc::clone(listener), adapter.requested())
                }
                ObserverKind::Monitor(monitor) => target.add_monitor(registrant, Arc::clone(monitor), adapter.requested()),
            }
        }

        info!(
            backend = self.transport.name(),
            listeners = listeners.len(),
            monitors = monitors.len(),
            "Transferred registrations"
        );
    }
}
