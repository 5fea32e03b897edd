//! Logging helper with the bridge's standard packet fields.

/// Log a packet-related event with peer and message type fields.
///
/// # Example
///
/// ```rust,ignore
/// use bridge_telemetry::log_packet_event;
///
/// log_packet_event!(debug, peer, type_id, "Packet cancelled", registrant = "chat-filter");
/// ```
#[macro_export]
macro_rules! log_packet_event {
    ($level:ident, $peer:expr, $type_id:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            peer = %$peer,
            type_id = %$type_id,
            $($($field)*,)?
            $msg
        )
    };
}
