//! # Test Fixtures
//!
//! In-memory transport and recording observers shared by the integration
//! tests and benchmarks.

use bridge_telemetry::{init_telemetry, log_packet_event, TelemetryConfig, TelemetryGuard};
use packet_router::{
    CallbackError, MonitorEvent, PacketListener, PacketMonitor, PacketReceiveEvent, PacketSendEvent,
    PacketTransport, QueueLengths, SendCapabilities, SilentSendCall,
};
use parking_lot::{Mutex, RwLock};
use shared_types::{Direction, MessageTypeId, PeerId, TransportError};
use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Install the log subscriber once per test binary.
///
/// Defaults to `warn` unless `PB_LOG_LEVEL` is set.
pub fn init_test_logging() {
    static GUARD: OnceLock<Option<TelemetryGuard>> = OnceLock::new();
    GUARD.get_or_init(|| {
        let mut config = TelemetryConfig::from_env().with_service_name("pb-tests");
        if env::var("PB_LOG_LEVEL").is_err() {
            config = config.with_log_level("warn");
        }
        init_telemetry(config).ok()
    });
}

// =============================================================================
// PACKET
// =============================================================================

/// Opaque test message. `type_id: None` cannot be resolved by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub type_id: Option<u32>,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(type_id: u32) -> Self {
        Self {
            type_id: Some(type_id),
            payload: Vec::new(),
        }
    }

    pub fn unresolvable() -> Self {
        Self {
            type_id: None,
            payload: Vec::new(),
        }
    }

    pub fn with_payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }
}

pub fn ids(raw: &[u32]) -> Vec<MessageTypeId> {
    raw.iter().copied().map(MessageTypeId).collect()
}

// =============================================================================
// FAKE TRANSPORT
// =============================================================================

/// Transport with configurable capabilities and peer state.
///
/// Peers are connected and legitimate unless told otherwise.
#[derive(Default)]
pub struct FakeTransport {
    inbound: RwLock<HashSet<MessageTypeId>>,
    outbound: RwLock<HashSet<MessageTypeId>>,
    capabilities: SendCapabilities,
    probes: AtomicUsize,
    disconnected: RwLock<HashSet<PeerId>>,
    synthetic: RwLock<HashSet<PeerId>>,
    queues: RwLock<HashMap<PeerId, QueueLengths>>,
    failure: Mutex<Option<TransportError>>,
    writes: Mutex<Vec<(PeerId, Packet)>>,
    processed: Mutex<Vec<(PeerId, Packet)>>,
    silent: Mutex<Vec<(PeerId, Packet, SilentSendCall)>>,
}

impl FakeTransport {
    /// Transport supporting `supported` in both directions, legacy send only.
    pub fn new(supported: &[u32]) -> Self {
        Self::with_directions(supported, supported)
    }

    pub fn with_directions(inbound: &[u32], outbound: &[u32]) -> Self {
        Self {
            inbound: RwLock::new(ids(inbound).into_iter().collect()),
            outbound: RwLock::new(ids(outbound).into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_capabilities(mut self, capabilities: SendCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn disconnect(&self, peer: PeerId) {
        self.disconnected.write().insert(peer);
    }

    pub fn mark_synthetic(&self, peer: PeerId) {
        self.synthetic.write().insert(peer);
    }

    pub fn set_queues(&self, peer: PeerId, low: u64, high: u64) {
        self.queues.write().insert(peer, QueueLengths { low, high });
    }

    /// Make every following write fail with `error`.
    pub fn fail_with(&self, error: TransportError) {
        *self.failure.lock() = Some(error);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<(PeerId, Packet)> {
        self.writes.lock().clone()
    }

    pub fn processed(&self) -> Vec<(PeerId, Packet)> {
        self.processed.lock().clone()
    }

    pub fn silent_calls(&self) -> Vec<(PeerId, Packet, SilentSendCall)> {
        self.silent.lock().clone()
    }

    /// Forget every recorded write.
    pub fn clear_records(&self) {
        self.writes.lock().clear();
        self.processed.lock().clear();
        self.silent.lock().clear();
    }

    fn outcome(&self) -> Result<(), TransportError> {
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl PacketTransport for FakeTransport {
    type Packet = Packet;

    fn name(&self) -> &str {
        "fake"
    }

    fn supports_inbound_type(&self, id: MessageTypeId) -> bool {
        self.inbound.read().contains(&id)
    }

    fn supports_outbound_type(&self, id: MessageTypeId) -> bool {
        self.outbound.read().contains(&id)
    }

    fn resolve_type_id(&self, packet: &Packet) -> Option<MessageTypeId> {
        packet.type_id.map(MessageTypeId)
    }

    fn is_connected(&self, peer: &PeerId) -> bool {
        !self.disconnected.read().contains(peer)
    }

    fn is_legitimate_peer(&self, peer: &PeerId) -> bool {
        !self.synthetic.read().contains(peer)
    }

    fn write(&self, peer: &PeerId, packet: Packet) -> Result<(), TransportError> {
        self.outcome()?;
        self.writes.lock().push((*peer, packet));
        Ok(())
    }

    fn process_inbound(&self, peer: &PeerId, packet: Packet) -> Result<(), TransportError> {
        self.outcome()?;
        self.processed.lock().push((*peer, packet));
        Ok(())
    }

    fn send_capabilities(&self) -> SendCapabilities {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.capabilities
    }

    fn write_silent(&self, peer: &PeerId, packet: Packet, call: SilentSendCall) -> Result<(), TransportError> {
        self.outcome()?;
        self.silent.lock().push((*peer, packet, call));
        Ok(())
    }

    fn outbound_queue_lengths(&self, peer: &PeerId) -> Option<QueueLengths> {
        self.queues.read().get(peer).copied()
    }
}

// =============================================================================
// RECORDING OBSERVERS
// =============================================================================

/// One observer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub observer: String,
    pub direction: Direction,
    pub type_id: Option<u32>,
    pub cancelled: bool,
}

/// Invocation log shared by every observer of one test.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, observer: &str, direction: Direction, packet: &Packet, cancelled: bool) {
        self.0.lock().push(Call {
            observer: observer.to_string(),
            direction,
            type_id: packet.type_id,
            cancelled,
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    /// Observer names in invocation order.
    pub fn order(&self) -> Vec<String> {
        self.0.lock().iter().map(|call| call.observer.clone()).collect()
    }

    pub fn count(&self, observer: &str) -> usize {
        self.0.lock().iter().filter(|call| call.observer == observer).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// What a recording listener does after logging the call.
#[derive(Debug, Clone)]
pub enum ListenerAction {
    Observe,
    Cancel,
    Uncancel,
    Fail,
    Rewrite(Vec<u8>),
}

/// Listener that logs every call, then applies its action.
///
/// The logged cancelled flag is the one the listener was handed.
pub struct RecordingListener {
    name: String,
    log: CallLog,
    action: ListenerAction,
}

impl RecordingListener {
    pub fn new(name: &str, log: &CallLog, action: ListenerAction) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            action,
        })
    }

    pub fn observing(name: &str, log: &CallLog) -> Arc<dyn PacketListener<Packet>> {
        Self::new(name, log, ListenerAction::Observe)
    }

    fn apply(&self, packet: &mut Packet, cancelled: &mut bool) -> Result<(), CallbackError> {
        match &self.action {
            ListenerAction::Observe => {}
            ListenerAction::Cancel => *cancelled = true,
            ListenerAction::Uncancel => *cancelled = false,
            ListenerAction::Fail => return Err(anyhow::anyhow!("{} refused the packet", self.name).into()),
            ListenerAction::Rewrite(payload) => packet.payload = payload.clone(),
        }
        Ok(())
    }
}

impl PacketListener<Packet> for RecordingListener {
    fn on_packet_receive(&self, event: &mut PacketReceiveEvent<'_, Packet>) -> Result<(), CallbackError> {
        let mut cancelled = event.is_cancelled();
        self.log.record(&self.name, Direction::Inbound, event.packet(), cancelled);
        self.apply(event.packet_mut(), &mut cancelled)?;
        event.set_cancelled(cancelled);
        Ok(())
    }

    fn on_packet_send(&self, event: &mut PacketSendEvent<'_, Packet>) -> Result<(), CallbackError> {
        let mut cancelled = event.is_cancelled();
        self.log.record(&self.name, Direction::Outbound, event.packet(), cancelled);
        self.apply(event.packet_mut(), &mut cancelled)?;
        event.set_cancelled(cancelled);
        Ok(())
    }
}

/// Monitor that logs every call and the cancelled flag it saw.
pub struct RecordingMonitor {
    name: String,
    log: CallLog,
}

impl RecordingMonitor {
    pub fn new(name: &str, log: &CallLog) -> Arc<dyn PacketMonitor<Packet>> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
        })
    }
}

impl RecordingMonitor {
    fn seen(&self, event: &MonitorEvent<'_, Packet>, direction: Direction) {
        let type_id = event
            .packet()
            .type_id
            .map(MessageTypeId)
            .unwrap_or(MessageTypeId::UNKNOWN);
        log_packet_event!(
            debug,
            event.peer(),
            type_id,
            "Monitor observed packet",
            monitor = %self.name,
            %direction,
            cancelled = event.is_cancelled()
        );
        self.log.record(&self.name, direction, event.packet(), event.is_cancelled());
    }
}

impl PacketMonitor<Packet> for RecordingMonitor {
    fn on_monitor_packet_receive(&self, event: &MonitorEvent<'_, Packet>) -> Result<(), CallbackError> {
        self.seen(event, Direction::Inbound);
        Ok(())
    }

    fn on_monitor_packet_send(&self, event: &MonitorEvent<'_, Packet>) -> Result<(), CallbackError> {
        self.seen(event, Direction::Outbound);
        Ok(())
    }
}
