//! # Injection Gateway
//!
//! Entry point for pushing messages into the pipeline. Every delivery first
//! passes the peer guards; a peer that is simulated or already disconnected
//! turns the call into a silent no-op.
//!
//! ## Delivery paths
//!
//! - Inbound: listener chain, monitors, then the host's inbound processing.
//! - Outbound through listeners: listener chain, monitors, then a normal write.
//! - Outbound silent: monitors only, then a write through the compatibility
//!   shim. Listeners never see these messages and cannot cancel them.
//!
//! A transport reporting [`TransportError::PeerGone`] is treated as the peer
//! having logged out between the guard and the write. It is counted and
//! swallowed. Any other transport error is wrapped with direction and peer.

use shared_types::{Direction, PeerId, TransportError};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::{BacklogAccountant, CompatibilityShim, SilentSendConvention};
use crate::domain::BridgeConfig;
use crate::error::BridgeError;
use crate::metrics::RouterMetrics;
use crate::ports::{PacketGateway, PacketTransport};
use crate::service::router::PacketRouter;

pub struct InjectionGateway<T: PacketTransport> {
    router: Arc<PacketRouter<T>>,
    transport: Arc<T>,
    shim: CompatibilityShim,
    backlog: BacklogAccountant<T>,
    metrics: Arc<RouterMetrics>,
}

impl<T: PacketTransport> InjectionGateway<T> {
    /// Build a router and gateway over `transport`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidConfig`] if the configured silent-send mode is not
    /// available on this transport.
    pub fn new(transport: Arc<T>, config: BridgeConfig) -> Result<Self, BridgeError> {
        Self::with_router(Arc::new(PacketRouter::new(transport, config)))
    }

    /// Put a gateway in front of an existing router.
    pub fn with_router(router: Arc<PacketRouter<T>>) -> Result<Self, BridgeError> {
        let transport = Arc::clone(router.transport());
        let shim = CompatibilityShim::detect(transport.as_ref(), router.config().silent_send)?;
        Ok(Self {
            backlog: BacklogAccountant::new(Arc::clone(&transport)),
            metrics: Arc::clone(router.metrics()),
            router,
            transport,
            shim,
        })
    }

    pub fn router(&self) -> &Arc<PacketRouter<T>> {
        &self.router
    }

    pub fn convention(&self) -> SilentSendConvention {
        self.shim.convention()
    }

    pub fn metrics(&self) -> &Arc<RouterMetrics> {
        &self.metrics
    }

    fn accepts(&self, peer: &PeerId, direction: Direction) -> bool {
        if !self.transport.is_legitimate_peer(peer) {
            self.metrics.record_guard_drop();
            debug!(peer = %peer, %direction, "Dropping delivery for non-network peer");
            return false;
        }
        if !self.transport.is_connected(peer) {
            self.metrics.record_guard_drop();
            debug!(peer = %peer, %direction, "Dropping delivery for disconnected peer");
            return false;
        }
        true
    }

    fn settle(&self, peer: &PeerId, direction: Direction, result: Result<(), TransportError>) -> Result<(), BridgeError> {
        match result {
            Ok(()) => Ok(()),
            Err(error) if error.is_peer_gone() => {
                self.metrics.record_peer_gone(direction);
                debug!(peer = %peer, %direction, "Peer logged out during delivery");
                Ok(())
            }
            Err(source) => {
                warn!(peer = %peer, %direction, error = %source, "Transport failed during delivery");
                Err(BridgeError::Transport {
                    direction,
                    peer: *peer,
                    source,
                })
            }
        }
    }
}

impl<T: PacketTransport> PacketGateway<T::Packet> for InjectionGateway<T> {
    fn backend_name(&self) -> &str {
        self.transport.name()
    }

    fn deliver_inbound(&self, peer: &PeerId, packet: T::Packet) -> Result<(), BridgeError> {
        if !self.accepts(peer, Direction::Inbound) {
            return Ok(());
        }

        let outcome = self.router.dispatch(peer, packet, Direction::Inbound)?;
        if outcome.cancelled {
            debug!(peer = %peer, "Inbound packet cancelled by listener");
            return Ok(());
        }
        let result = self.transport.process_inbound(peer, outcome.packet);
        self.settle(peer, Direction::Inbound, result)
    }

    fn deliver_outbound(&self, peer: &PeerId, packet: T::Packet, through_listeners: bool) -> Result<(), BridgeError> {
        if !self.accepts(peer, Direction::Outbound) {
            return Ok(());
        }

        if through_listeners {
            let outcome = self.router.dispatch(peer, packet, Direction::Outbound)?;
            if outcome.cancelled {
                debug!(peer = %peer, "Outbound packet cancelled by listener");
                return Ok(());
            }
            let result = self.transport.write(peer, outcome.packet);
            return self.settle(peer, Direction::Outbound, result);
        }

        self.router.notify_monitors(peer, &packet, Direction::Outbound)?;
        self.metrics.record_silent_send();
        let result = self.shim.send_silent(self.transport.as_ref(), peer, packet);
        self.settle(peer, Direction::Outbound, result)
    }

    fn pending_bytes(&self, peer: &PeerId) -> u64 {
        self.backlog.pending_bytes(peer)
    }
}
