//! Uniform wrapper around listeners and monitors.

use shared_types::{Direction, MessageTypeId};
use std::fmt;
use std::sync::Arc;

use crate::domain::{
    DispatchEvent, MonitorEvent, PacketReceiveEvent, PacketSendEvent, Priority, Registrant,
    RegistrationInfo, Whitelist, WhitelistPair,
};
use crate::error::CallbackError;
use crate::ports::{PacketListener, PacketMonitor};

/// The wrapped observer. Listeners may mutate; monitors are read-only.
pub enum ObserverKind<M> {
    Listener(Arc<dyn PacketListener<M>>),
    Monitor(Arc<dyn PacketMonitor<M>>),
}

impl<M> Clone for ObserverKind<M> {
    fn clone(&self) -> Self {
        match self {
            ObserverKind::Listener(l) => ObserverKind::Listener(Arc::clone(l)),
            ObserverKind::Monitor(m) => ObserverKind::Monitor(Arc::clone(m)),
        }
    }
}

/// One registration: observer, owner, original request and whitelists.
pub struct ObserverAdapter<M> {
    registrant: Registrant,
    kind: ObserverKind<M>,
    requested: Vec<MessageTypeId>,
    whitelist: WhitelistPair,
}

impl<M> ObserverAdapter<M> {
    pub fn listener<F>(
        registrant: Registrant,
        listener: Arc<dyn PacketListener<M>>,
        requested: &[MessageTypeId],
        supports: F,
    ) -> Self
    where
        F: Fn(Direction, MessageTypeId) -> bool,
    {
        Self {
            registrant,
            kind: ObserverKind::Listener(listener),
            requested: requested.to_vec(),
            whitelist: WhitelistPair::compute(Priority::Normal, requested, supports),
        }
    }

    pub fn monitor<F>(
        registrant: Registrant,
        monitor: Arc<dyn PacketMonitor<M>>,
        requested: &[MessageTypeId],
        supports: F,
    ) -> Self
    where
        F: Fn(Direction, MessageTypeId) -> bool,
    {
        Self {
            registrant,
            kind: ObserverKind::Monitor(monitor),
            requested: requested.to_vec(),
            whitelist: WhitelistPair::compute(Priority::Monitor, requested, supports),
        }
    }

    pub fn registrant(&self) -> &Registrant {
        &self.registrant
    }

    pub fn kind(&self) -> &ObserverKind<M> {
        &self.kind
    }

    pub fn priority(&self) -> Priority {
        self.whitelist.priority()
    }

    pub fn requested(&self) -> &[MessageTypeId] {
        &self.requested
    }

    /// Effective whitelist for `direction`.
    pub fn interested_in(&self, direction: Direction) -> &Whitelist {
        self.whitelist.for_direction(direction)
    }

    pub fn info(&self) -> RegistrationInfo {
        RegistrationInfo {
            registrant: self.registrant.clone(),
            priority: self.priority(),
            requested_ids: self.requested.clone(),
        }
    }

    pub fn wraps_listener(&self, listener: &Arc<dyn PacketListener<M>>) -> bool {
        match &self.kind {
            ObserverKind::Listener(own) => same_object(own, listener),
            ObserverKind::Monitor(_) => false,
        }
    }

    pub fn wraps_monitor(&self, monitor: &Arc<dyn PacketMonitor<M>>) -> bool {
        match &self.kind {
            ObserverKind::Monitor(own) => same_object(own, monitor),
            ObserverKind::Listener(_) => false,
        }
    }

    /// Run a listener against an in-flight event. Monitors are skipped.
    ///
    /// The listener sees the current cancelled flag and its change is written
    /// back only if the callback succeeds.
    pub fn dispatch(&self, event: &mut DispatchEvent<M>, direction: Direction) -> Result<(), CallbackError> {
        match &self.kind {
            ObserverKind::Listener(listener) => {
                let DispatchEvent {
                    peer,
                    packet,
                    cancelled,
                } = event;
                match direction {
                    Direction::Inbound => {
                        let mut view = PacketReceiveEvent::new(peer, packet, *cancelled);
                        listener.on_packet_receive(&mut view)?;
                        *cancelled = view.is_cancelled();
                    }
                    Direction::Outbound => {
                        let mut view = PacketSendEvent::new(peer, packet, *cancelled);
                        listener.on_packet_send(&mut view)?;
                        *cancelled = view.is_cancelled();
                    }
                }
                Ok(())
            }
            ObserverKind::Monitor(_) => Ok(()),
        }
    }

    /// Notify a monitor without an event. Listeners are skipped.
    pub fn observe(&self, event: &MonitorEvent<'_, M>, direction: Direction) -> Result<(), CallbackError> {
        match &self.kind {
            ObserverKind::Monitor(monitor) => match direction {
                Direction::Inbound => monitor.on_monitor_packet_receive(event),
                Direction::Outbound => monitor.on_monitor_packet_send(event),
            },
            ObserverKind::Listener(_) => Ok(()),
        }
    }
}

impl<M> fmt::Debug for ObserverAdapter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverAdapter")
            .field("registrant", &self.registrant)
            .field("priority", &self.priority())
            .field("requested", &self.requested)
            .finish()
    }
}

fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    // Compare data pointers only; vtable pointers may differ per codegen unit.
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}
