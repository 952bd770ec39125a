//! Transport abstraction for a single room connection.
//!
//! The chat protocol client lives outside this crate. It delivers
//! [`RoomEvent`](super::RoomEvent)s to the room's channel and implements
//! [`RoomTransport`] for the outbound side. Tests use
//! [`MockTransport`](super::MockTransport).

use async_trait::async_trait;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport failures. All of them are transient from the bot's point of view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection closed")]
    Disconnected,

    #[error("request timed out")]
    Timeout,

    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Outbound half of a room connection.
#[async_trait]
pub trait RoomTransport: Send + Sync {
    /// Change the bot's nick. No acknowledgement is awaited beyond the
    /// request being sent.
    async fn set_nick(&self, nick: &str) -> TransportResult<()>;

    /// Ask for the complete roster. The reply is delivered later as a
    /// `PresenceEvent::Roster` on the room's event channel.
    async fn request_roster(&self) -> TransportResult<()>;

    /// Send `text` as a reply to message `reply_to`.
    async fn send(&self, text: &str, reply_to: &str) -> TransportResult<()>;

    /// Leave the room and stop delivering events.
    async fn leave(&self) -> TransportResult<()>;

    /// Drop the connection and connect again. The transport delivers a
    /// fresh `Connected` and `Snapshot` once it is back.
    async fn reconnect(&self) -> TransportResult<()>;
}
