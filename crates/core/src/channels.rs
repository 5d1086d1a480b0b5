//! Notification channel name constants.
//!
//! A rule lists the channels it wants breaches announced on. Only the
//! webhook channel is delivered by the engine; `websocket` is accepted so
//! that rules written for the realtime fan-out stay valid.

/// Realtime push to connected dashboard clients.
pub const CHANNEL_WEBSOCKET: &str = "websocket";

/// HTTP POST to the rule's webhook endpoint.
pub const CHANNEL_WEBHOOK: &str = "webhook";

/// All channel names a rule may reference.
pub const KNOWN_CHANNELS: &[&str] = &[CHANNEL_WEBSOCKET, CHANNEL_WEBHOOK];

/// Whether `name` is a recognised channel.
pub fn is_known_channel(name: &str) -> bool {
    KNOWN_CHANNELS.contains(&name)
}
