//! Diagnostic counters for dispatch and delivery.
//!
//! Every counter is a relaxed atomic; a [`MetricsSnapshot`] is a best-effort
//! point-in-time read, not a consistent cut across counters.

use shared_types::Direction;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by a router and the gateway in front of it.
#[derive(Debug, Default)]
pub struct RouterMetrics {
    inbound_dispatched: AtomicU64,
    outbound_dispatched: AtomicU64,
    cancelled: AtomicU64,
    silent_sends: AtomicU64,
    guard_drops: AtomicU64,
    /// Inbound deliveries swallowed because the peer logged out mid-call.
    peer_gone_inbound: AtomicU64,
    /// Outbound deliveries swallowed because the peer logged out mid-call.
    peer_gone_outbound: AtomicU64,
    observer_failures: AtomicU64,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed dispatch.
    pub fn record_dispatch(&self, direction: Direction, cancelled: bool) {
        match direction {
            Direction::Inbound => self.inbound_dispatched.fetch_add(1, Ordering::Relaxed),
            Direction::Outbound => self.outbound_dispatched.fetch_add(1, Ordering::Relaxed),
        };
        if cancelled {
            self.cancelled.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_silent_send(&self) {
        self.silent_sends.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a delivery dropped by the peer guards.
    pub fn record_guard_drop(&self) {
        self.guard_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a swallowed "peer already gone" transport result.
    pub fn record_peer_gone(&self, direction: Direction) {
        match direction {
            Direction::Inbound => self.peer_gone_inbound.fetch_add(1, Ordering::Relaxed),
            Direction::Outbound => self.peer_gone_outbound.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record an observer failure that was isolated instead of propagated.
    pub fn record_observer_failure(&self) {
        self.observer_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inbound_dispatched: self.inbound_dispatched.load(Ordering::Relaxed),
            outbound_dispatched: self.outbound_dispatched.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            silent_sends: self.silent_sends.load(Ordering::Relaxed),
            guard_drops: self.guard_drops.load(Ordering::Relaxed),
            peer_gone_inbound: self.peer_gone_inbound.load(Ordering::Relaxed),
            peer_gone_outbound: self.peer_gone_outbound.load(Ordering::Relaxed),
            observer_failures: self.observer_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub inbound_dispatched: u64,
    pub outbound_dispatched: u64,
    pub cancelled: u64,
    pub silent_sends: u64,
    pub guard_drops: u64,
    pub peer_gone_inbound: u64,
    pub peer_gone_outbound: u64,
    pub observer_failures: u64,
}

impl MetricsSnapshot {
    /// Total swallowed logout races across both directions.
    pub fn peer_gone_total(&self) -> u64 {
        self.peer_gone_inbound + self.peer_gone_outbound
    }
}
