//! Silent-send compatibility shim.
//!
//! Older backends take `(peer, packet, filtered)`; newer ones take
//! `(peer, packet, marker, filtered)`. The capability surface is probed once
//! and the result is fixed for the shim's lifetime.

use serde::{Deserialize, Serialize};
use shared_types::{PeerId, TransportError};
use std::fmt;
use tracing::info;

use crate::domain::SilentSendMode;
use crate::error::BridgeError;
use crate::ports::{PacketTransport, SilentSendCall};

/// Call convention used for every silent send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SilentSendConvention {
    /// 3-argument form.
    Legacy,
    /// 4-argument form with a marker and a filtering flag.
    Marked,
}

impl fmt::Display for SilentSendConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SilentSendConvention::Legacy => f.write_str("legacy"),
            SilentSendConvention::Marked => f.write_str("marked"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatibilityShim {
    convention: SilentSendConvention,
}

impl CompatibilityShim {
    /// Pick the convention for `transport`.
    ///
    /// `Auto` chooses the marked form only when both the marker type and the
    /// 4-argument send exist. A forced `Marked` mode is rejected if the
    /// transport lacks either.
    pub fn detect<T: PacketTransport>(transport: &T, mode: SilentSendMode) -> Result<Self, BridgeError> {
        let capabilities = transport.send_capabilities();
        let marked_available = capabilities.network_marker && capabilities.marked_silent_send;

        let convention = match mode {
            SilentSendMode::Auto if marked_available => SilentSendConvention::Marked,
            SilentSendMode::Auto | SilentSendMode::Legacy => SilentSendConvention::Legacy,
            SilentSendMode::Marked if marked_available => SilentSendConvention::Marked,
            SilentSendMode::Marked => {
                return Err(BridgeError::InvalidConfig(format!(
                    "backend '{}' has no marked silent send",
                    transport.name()
                )))
            }
        };

        info!(
            backend = transport.name(),
            ?mode,
            %convention,
            "Selected silent send convention"
        );
        Ok(Self { convention })
    }

    pub fn convention(&self) -> SilentSendConvention {
        self.convention
    }

    /// Write `packet` through the transport's silent path.
    pub fn send_silent<T: PacketTransport>(
        &self,
        transport: &T,
        peer: &PeerId,
        packet: T::Packet,
    ) -> Result<(), TransportError> {
        let call = match self.convention {
            SilentSendConvention::Legacy => SilentSendCall::Legacy { filtered: false },
            SilentSendConvention::Marked => SilentSendCall::Marked {
                marker: None,
                filtered: false,
            },
        };
        transport.write_silent(peer, packet, call)
    }
}
