//! # Concurrency
//!
//! Dispatches racing registration changes on a multi-threaded runtime.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use packet_router::{
        BridgeConfig, CallbackError, ObserverRegistry, PacketListener, PacketRouter, PacketSendEvent, Registrant,
    };
    use parking_lot::Mutex;
    use shared_types::{Direction, PeerId};

    use crate::fixtures::{ids, CallLog, FakeTransport, Packet, RecordingListener, RecordingMonitor};

    /// Appends one byte to every outbound payload it sees.
    struct Stamp;

    impl PacketListener<Packet> for Stamp {
        fn on_packet_send(&self, event: &mut PacketSendEvent<'_, Packet>) -> Result<(), CallbackError> {
            event.packet_mut().payload.push(1);
            Ok(())
        }
    }

    fn router() -> Arc<PacketRouter<FakeTransport>> {
        Arc::new(PacketRouter::new(FakeTransport::new(&[1, 2]).into_arc(), BridgeConfig::default()))
    }

    // =========================================================================
    // REMOVE ALL IS ATOMIC WITH RESPECT TO DISPATCH SNAPSHOTS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_remove_all_is_all_or_nothing() {
        const STAMPS: usize = 8;
        let router = router();
        let victim = Registrant::new("victim");
        for _ in 0..STAMPS {
            router.add_listener(victim.clone(), Arc::new(Stamp), &ids(&[1]));
        }

        let mut dispatchers = Vec::new();
        for worker in 0..4u128 {
            let router = Arc::clone(&router);
            dispatchers.push(tokio::spawn(async move {
                let mut observed = Vec::new();
                for _ in 0..500 {
                    let outcome = router
                        .dispatch(&PeerId::from_u128(worker), Packet::new(1), Direction::Outbound)
                        .unwrap();
                    observed.push(outcome.packet.payload.len());
                    tokio::task::yield_now().await;
                }
                observed
            }));
        }

        let remover = {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                router.remove_all(&victim);
            })
        };

        remover.await.unwrap();
        for handle in dispatchers {
            for stamps in handle.await.unwrap() {
                assert!(stamps == 0 || stamps == STAMPS, "partial snapshot with {stamps} stamps");
            }
        }
        assert!(router.registrations().is_empty());
    }

    // =========================================================================
    // REGISTRATION DURING DISPATCH APPLIES TO THE NEXT DISPATCH
    // =========================================================================

    /// Registers a new listener from inside its own callback, once.
    struct Recruiter {
        router: Mutex<Option<Arc<PacketRouter<FakeTransport>>>>,
        log: CallLog,
        done: AtomicBool,
    }

    impl PacketListener<Packet> for Recruiter {
        fn on_packet_send(&self, _: &mut PacketSendEvent<'_, Packet>) -> Result<(), CallbackError> {
            if !self.done.swap(true, Ordering::SeqCst) {
                if let Some(router) = self.router.lock().take() {
                    router.add_listener(Registrant::new("late"), RecordingListener::observing("late", &self.log), &ids(&[2]));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_registration_inside_callback_is_deferred() {
        let router = router();
        let log = CallLog::new();
        let recruiter = Arc::new(Recruiter {
            router: Mutex::new(Some(Arc::clone(&router))),
            log: log.clone(),
            done: AtomicBool::new(false),
        });
        router.add_listener(Registrant::new("recruiter"), recruiter, &ids(&[2]));

        router.dispatch(&PeerId::from_u128(1), Packet::new(2), Direction::Outbound).unwrap();
        assert!(log.calls().is_empty(), "in-flight dispatch must use its snapshot");

        router.dispatch(&PeerId::from_u128(1), Packet::new(2), Direction::Outbound).unwrap();
        assert_eq!(log.order(), vec!["late"]);
    }

    // =========================================================================
    // CONCURRENT REGISTRATION AND DISPATCH
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_and_dispatch() {
        let router = router();
        let log = CallLog::new();
        router.add_monitor(Registrant::new("audit"), RecordingMonitor::new("audit", &log), &ids(&[1]));

        let mut tasks = Vec::new();
        for n in 0..8u128 {
            let router = Arc::clone(&router);
            let log = log.clone();
            tasks.push(tokio::spawn(async move {
                let owner = Registrant::new(format!("plugin-{n}"));
                for round in 0..50 {
                    router.add_listener(owner.clone(), RecordingListener::observing("L", &log), &ids(&[1]));
                    router
                        .dispatch(&PeerId::from_u128(n), Packet::new(1), Direction::Inbound)
                        .unwrap();
                    if round % 10 == 9 {
                        router.remove_all(&owner);
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(log.count("audit"), 8 * 50);
        assert_eq!(router.registrations().len(), 1);
        assert_eq!(router.metrics().snapshot().inbound_dispatched, 8 * 50);
    }
}
