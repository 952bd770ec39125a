//! Transport that only logs.
//!
//! Used by the binary when no protocol client is attached. Every outbound
//! call is logged and succeeds; no events are ever delivered back, so rooms
//! stay disconnected.

use async_trait::async_trait;
use tracing::info;

use super::transport::{RoomTransport, TransportResult};
use crate::config::RoomSettings;

/// Logs outbound calls for one room instead of sending them.
#[derive(Debug, Clone)]
pub struct DryRunTransport {
    room: String,
}

impl DryRunTransport {
    /// Create a transport for the room described by `settings`.
    pub fn new(settings: &RoomSettings) -> Self {
        info!(
            room = %settings.name,
            password = settings.password.is_some(),
            cookie_file = settings.cookie_file.as_deref().unwrap_or("-"),
            "dry run: would connect"
        );
        Self {
            room: settings.name.clone(),
        }
    }

    /// Room this transport stands in for.
    pub fn room(&self) -> &str {
        &self.room
    }
}

#[async_trait]
impl RoomTransport for DryRunTransport {
    async fn set_nick(&self, nick: &str) -> TransportResult<()> {
        info!(room = %self.room, "dry run: nick {:?}", nick);
        Ok(())
    }

    async fn request_roster(&self) -> TransportResult<()> {
        info!(room = %self.room, "dry run: who");
        Ok(())
    }

    async fn send(&self, text: &str, reply_to: &str) -> TransportResult<()> {
        info!(room = %self.room, reply_to, "dry run: send {:?}", text);
        Ok(())
    }

    async fn leave(&self) -> TransportResult<()> {
        info!(room = %self.room, "dry run: leave");
        Ok(())
    }

    async fn reconnect(&self) -> TransportResult<()> {
        info!(room = %self.room, "dry run: reconnect");
        Ok(())
    }
}
