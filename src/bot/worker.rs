//! Sequential event loop for one room.
//!
//! Events are taken off the room's channel one at a time. Each event's
//! actions run to completion, in order, before the next event is looked
//! at. Events that arrive while an action is awaiting the transport wait in
//! the channel, so the bot always decides from the roster as it is when the
//! event is handled.

use std::collections::VecDeque;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::room::{Action, RoomBot, RoomEvent};
use super::transport::RoomTransport;
use crate::presence::PresenceEvent;

/// Whether the loop keeps going after a batch of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Drives a [`RoomBot`] from its event channel against a transport.
pub struct RoomWorker<T> {
    bot: RoomBot,
    transport: T,
    events: mpsc::UnboundedReceiver<RoomEvent>,
}

impl<T: RoomTransport> RoomWorker<T> {
    /// Create a worker.
    pub fn new(bot: RoomBot, transport: T, events: mpsc::UnboundedReceiver<RoomEvent>) -> Self {
        Self {
            bot,
            transport,
            events,
        }
    }

    /// Run until the channel closes or the bot leaves the room. Returns the
    /// bot in its final state.
    pub async fn run(mut self) -> RoomBot {
        info!(room = %self.bot.name(), "room worker started");

        while let Some(event) = self.events.recv().await {
            let actions = self.bot.handle(event);
            if self.execute(actions).await == Flow::Stop {
                break;
            }
        }

        info!(room = %self.bot.name(), "room worker stopped");
        self.bot
    }

    async fn execute(&mut self, actions: Vec<Action>) -> Flow {
        let mut queue: VecDeque<Action> = actions.into();

        while let Some(action) = queue.pop_front() {
            match action {
                Action::Rename(nick) => {
                    if let Err(e) = self.transport.set_nick(&nick).await {
                        warn!(room = %self.bot.name(), "rename to {:?} failed: {}", nick, e);
                        self.bot.publish_failed();
                    }
                }
                Action::RequestRoster => {
                    if let Err(e) = self.transport.request_roster().await {
                        warn!(room = %self.bot.name(), "roster request failed: {}", e);
                        queue.extend(self.bot.resync_failed());
                    }
                }
                Action::Send { text, reply_to } => {
                    if let Err(e) = self.transport.send(&text, &reply_to).await {
                        warn!(room = %self.bot.name(), "reply to {} failed: {}", reply_to, e);
                    }
                }
                Action::Leave => {
                    if let Err(e) = self.transport.leave().await {
                        warn!(room = %self.bot.name(), "leave failed: {}", e);
                    }
                    self.bot.handle(PresenceEvent::Disconnected.into());
                    return Flow::Stop;
                }
                Action::Reconnect => {
                    if let Err(e) = self.transport.reconnect().await {
                        warn!(room = %self.bot.name(), "reconnect failed: {}", e);
                    }
                    queue.extend(self.bot.handle(PresenceEvent::Disconnected.into()));
                }
            }
        }

        Flow::Continue
    }
}
