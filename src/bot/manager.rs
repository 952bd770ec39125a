//! Room manager.
//!
//! Owns one worker task per joined room. Rooms share nothing but the
//! configured nick and the process start time.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::room::{RoomBot, RoomEvent};
use super::transport::RoomTransport;
use super::worker::RoomWorker;
use crate::config::{Config, RoomSettings};
use crate::error::{InfobotError, Result};
use crate::presence::BOT_NAME;

/// Sending half of a room's event channel.
pub type RoomSender = mpsc::UnboundedSender<RoomEvent>;

struct RoomHandle {
    events: RoomSender,
    task: JoinHandle<RoomBot>,
}

/// Manager for the rooms the bot is in.
pub struct BotManager {
    rooms: RwLock<HashMap<String, RoomHandle>>,
    nick: String,
    started_at: DateTime<Utc>,
}

impl BotManager {
    /// Create a manager whose rooms start out under `nick`.
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            nick: nick.into(),
            started_at: Utc::now(),
        }
    }

    /// Create a manager from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bot.nick.clone())
    }

    /// Nick rooms start out under.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Start a worker for `name` on `transport`.
    ///
    /// Returns the sender the transport delivers events to, or None if the
    /// room is already joined.
    pub async fn join_room<T>(&self, name: &str, transport: T) -> Option<RoomSender>
    where
        T: RoomTransport + 'static,
    {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(name) {
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let bot = RoomBot::new(name, self.nick.as_str(), self.started_at);
        let task = tokio::spawn(RoomWorker::new(bot, transport, rx).run());
        rooms.insert(
            name.to_string(),
            RoomHandle {
                events: tx.clone(),
                task,
            },
        );

        info!(room = %name, "joined room");
        Some(tx)
    }

    /// Join every room in `config`, building each room's transport with
    /// `connect`. Returns the senders of the rooms joined, sorted by name.
    pub async fn join_configured<T, F>(
        &self,
        config: &Config,
        mut connect: F,
    ) -> Vec<(String, RoomSender)>
    where
        T: RoomTransport + 'static,
        F: FnMut(&RoomSettings) -> T,
    {
        let mut joined = Vec::new();
        for settings in config.room_settings() {
            let transport = connect(&settings);
            match self.join_room(&settings.name, transport).await {
                Some(events) => joined.push((settings.name, events)),
                None => warn!(room = %settings.name, "room already joined"),
            }
        }
        joined
    }

    /// Sender for a joined room.
    pub async fn sender(&self, name: &str) -> Option<RoomSender> {
        self.rooms
            .read()
            .await
            .get(name)
            .map(|room| room.events.clone())
    }

    /// Names of joined rooms, sorted.
    pub async fn room_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rooms.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of joined rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Stop tracking `name` and wait for its worker to finish.
    ///
    /// The worker stops once every sender for the room is dropped, so the
    /// transport must release its own sender too.
    pub async fn leave_room(&self, name: &str) -> Result<RoomBot> {
        let room = self
            .rooms
            .write()
            .await
            .remove(name)
            .ok_or_else(|| InfobotError::NotFound(format!("room {name}")))?;

        drop(room.events);
        let bot = room
            .task
            .await
            .map_err(|e| InfobotError::Task(e.to_string()))?;

        info!(room = %name, "left room");
        Ok(bot)
    }

    /// Leave every room. Returns the final state of each room that stopped
    /// cleanly, sorted by room name.
    pub async fn shutdown(&self) -> Vec<RoomBot> {
        let names = self.room_names().await;
        let mut bots = Vec::with_capacity(names.len());
        for name in names {
            match self.leave_room(&name).await {
                Ok(bot) => bots.push(bot),
                Err(e) => warn!(room = %name, "room did not stop cleanly: {}", e),
            }
        }
        bots
    }
}

impl Default for BotManager {
    fn default() -> Self {
        Self::new(BOT_NAME)
    }
}
