//! Service layer: dispatch engine and injection gateway.

mod gateway;
mod observer;
mod router;

pub use gateway::InjectionGateway;
pub use observer::{ObserverAdapter, ObserverKind};
pub use router::PacketRouter;
