//! One room's bot: presence tracking plus command handling.
//!
//! Every event for a room goes through [`RoomBot::handle`], which returns
//! the actions to perform in order. The bot never awaits anything itself;
//! the room worker executes the actions and reports failures back.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::command::parse_message;
use super::engine::{CommandEngine, Response, RECOUNT_ACK};
use crate::presence::{
    Counts, PresenceAction, PresenceEvent, PresenceReconciler, PresenceState, RosterStore,
};

/// Reply sent before leaving for good.
pub const KILL_REPLY: &str = "/me dies";
/// Reply sent before reconnecting.
pub const RESTART_REPLY: &str = "/me restarts";

/// A chat message delivered to the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message id, used to thread replies.
    pub id: String,
    /// Session that sent the message.
    pub sender_id: String,
    /// Sender's nick at the time of sending.
    pub sender_nick: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message.
    pub fn new(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        sender_nick: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender_id: sender_id.into(),
            sender_nick: sender_nick.into(),
            content: content.into(),
        }
    }
}

/// Everything a room can be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// Lifecycle and roster events.
    Presence(PresenceEvent),
    /// A chat message.
    Message(ChatMessage),
}

impl From<PresenceEvent> for RoomEvent {
    fn from(event: PresenceEvent) -> Self {
        RoomEvent::Presence(event)
    }
}

impl From<ChatMessage> for RoomEvent {
    fn from(message: ChatMessage) -> Self {
        RoomEvent::Message(message)
    }
}

/// Work for the transport, in the order it must happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Change the bot's nick.
    Rename(String),
    /// Ask for the full roster; the reply arrives as a `Roster` event.
    RequestRoster,
    /// Send a reply to a message.
    Send {
        /// Reply text.
        text: String,
        /// Message being replied to.
        reply_to: String,
    },
    /// Leave the room for good.
    Leave,
    /// Drop the connection and connect again.
    Reconnect,
}

impl From<PresenceAction> for Action {
    fn from(action: PresenceAction) -> Self {
        match action {
            PresenceAction::Rename(name) => Action::Rename(name),
            PresenceAction::RequestRoster => Action::RequestRoster,
        }
    }
}

/// The bot's state for one room.
#[derive(Debug)]
pub struct RoomBot {
    name: String,
    reconciler: PresenceReconciler,
    engine: CommandEngine,
    /// Roster requests sent since connecting.
    requested: u64,
    /// Roster requests answered or failed since connecting. Replies arrive
    /// in request order.
    settled: u64,
    /// `!recount` messages waiting for their own roster request, keyed by
    /// that request's sequence number.
    pending_acks: Vec<(u64, String)>,
}

impl RoomBot {
    /// Create the bot for `name`, starting disconnected.
    pub fn new(
        name: impl Into<String>,
        initial_nick: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            reconciler: PresenceReconciler::new(initial_nick),
            engine: CommandEngine::new(started_at),
            requested: 0,
            settled: 0,
            pending_acks: Vec::new(),
        }
    }

    /// Room name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connection state.
    pub fn state(&self) -> PresenceState {
        self.reconciler.state()
    }

    /// Current roster.
    pub fn roster(&self) -> &RosterStore {
        self.reconciler.roster()
    }

    /// Current category counts.
    pub fn counts(&self) -> Counts {
        self.reconciler.counts()
    }

    /// Nick the bot believes it holds.
    pub fn own_nick(&self) -> &str {
        self.reconciler.own_nick()
    }

    /// Handle one event.
    pub fn handle(&mut self, event: RoomEvent) -> Vec<Action> {
        match event {
            RoomEvent::Presence(event) => self.on_presence(event),
            RoomEvent::Message(message) => self.on_message(message),
        }
    }

    /// The oldest outstanding roster request failed. Keep the current state
    /// and release the `!recount` ack waiting on that request, if any.
    pub fn resync_failed(&mut self) -> Vec<Action> {
        let published = self.reconciler.resync_failed();
        let mut actions = self.track(published);
        actions.extend(self.settle_one());
        actions
    }

    /// A rename failed; the next recompute will try again.
    pub fn publish_failed(&mut self) {
        self.reconciler.publish_failed();
    }

    fn on_presence(&mut self, event: PresenceEvent) -> Vec<Action> {
        let completes_resync = matches!(event, PresenceEvent::Roster(_));
        match &event {
            PresenceEvent::Connected { own } => {
                info!(room = %self.name, session_id = %own.session_id, "connected");
                self.reset_requests();
            }
            PresenceEvent::Disconnected => self.reset_requests(),
            _ => {}
        }

        let reconciled = self.reconciler.handle(event);
        let mut actions = self.track(reconciled);
        if completes_resync {
            actions.extend(self.settle_one());
        }
        actions
    }

    fn on_message(&mut self, message: ChatMessage) -> Vec<Action> {
        if self.reconciler.own_session_id() == Some(message.sender_id.as_str()) {
            return Vec::new();
        }
        let Some(invocation) = parse_message(&message.content) else {
            return Vec::new();
        };

        let responses = self.engine.dispatch(
            &invocation,
            self.reconciler.roster(),
            self.reconciler.own_nick(),
        );
        if !responses.is_empty() {
            debug!(
                room = %self.name,
                command = %invocation.command,
                sender = %message.sender_nick,
                "command"
            );
        }

        let mut actions = Vec::new();
        for response in responses {
            match response {
                Response::Say(text) => actions.push(reply(text, &message.id)),
                Response::Recount => {
                    let resync = self.reconciler.request_resync();
                    if resync.is_empty() {
                        actions.push(reply(RECOUNT_ACK, &message.id));
                    } else {
                        let resync = self.track(resync);
                        actions.extend(resync);
                        self.pending_acks.push((self.requested, message.id.clone()));
                    }
                }
                Response::Kill => {
                    info!(room = %self.name, by = %message.sender_nick, "killed");
                    actions.push(reply(KILL_REPLY, &message.id));
                    actions.push(Action::Leave);
                }
                Response::Restart => {
                    info!(room = %self.name, by = %message.sender_nick, "restarting");
                    actions.push(reply(RESTART_REPLY, &message.id));
                    actions.push(Action::Reconnect);
                }
            }
        }
        actions
    }

    /// Convert reconciler actions, numbering every roster request.
    fn track(&mut self, actions: Vec<PresenceAction>) -> Vec<Action> {
        actions
            .into_iter()
            .inspect(|action| {
                if *action == PresenceAction::RequestRoster {
                    self.requested += 1;
                }
            })
            .map(Action::from)
            .collect()
    }

    /// Mark the oldest outstanding roster request done and release the
    /// acks that were waiting on it.
    fn settle_one(&mut self) -> Vec<Action> {
        if self.settled >= self.requested {
            return Vec::new();
        }
        self.settled += 1;

        let settled = self.settled;
        let (ready, waiting): (Vec<_>, Vec<_>) = self
            .pending_acks
            .drain(..)
            .partition(|(seq, _)| *seq <= settled);
        self.pending_acks = waiting;
        ready
            .into_iter()
            .map(|(_, id)| reply(RECOUNT_ACK, &id))
            .collect()
    }

    /// Forget in-flight roster requests; their replies belong to a dead
    /// connection.
    fn reset_requests(&mut self) {
        if !self.pending_acks.is_empty() {
            debug!(room = %self.name, "dropping pending recount acks");
            self.pending_acks.clear();
        }
        self.requested = 0;
        self.settled = 0;
    }
}

fn reply(text: impl Into<String>, reply_to: &str) -> Action {
    Action::Send {
        text: text.into(),
        reply_to: reply_to.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::Session;

    fn person(sid: &str, nick: &str) -> Session {
        Session::new(sid, format!("account:{sid}"), nick)
    }

    fn own() -> Session {
        Session::new("self", "bot:self", "InfoBot")
    }

    fn message(id: &str, content: &str) -> RoomEvent {
        ChatMessage::new(id, "a", "Alice", content).into()
    }

    fn synced() -> RoomBot {
        let mut bot = RoomBot::new("xkcd", "InfoBot", Utc::now());
        bot.handle(PresenceEvent::Connected { own: own() }.into());
        bot.handle(PresenceEvent::Snapshot(vec![person("a", "Alice")]).into());
        bot
    }

    fn send(text: &str, reply_to: &str) -> Action {
        Action::Send {
            text: text.to_string(),
            reply_to: reply_to.to_string(),
        }
    }

    #[test]
    fn test_snapshot_publishes() {
        let mut bot = RoomBot::new("xkcd", "InfoBot", Utc::now());
        assert!(bot
            .handle(PresenceEvent::Connected { own: own() }.into())
            .is_empty());
        let actions = bot.handle(PresenceEvent::Snapshot(vec![person("a", "Alice")]).into());
        assert_eq!(actions, vec![Action::Rename("\u{1}(1P)".to_string())]);
        assert_eq!(bot.state(), PresenceState::Synced);
        assert_eq!(bot.name(), "xkcd");
    }

    #[test]
    fn test_ping() {
        let mut bot = synced();
        assert_eq!(bot.handle(message("m1", "!ping")), vec![send("Pong!", "m1")]);
    }

    #[test]
    fn test_plain_chat_ignored() {
        let mut bot = synced();
        assert!(bot.handle(message("m1", "hello there")).is_empty());
    }

    #[test]
    fn test_own_messages_ignored() {
        let mut bot = synced();
        let event = ChatMessage::new("m1", "self", "InfoBot", "!ping").into();
        assert!(bot.handle(event).is_empty());
    }

    #[test]
    fn test_recount_acks_after_resync() {
        let mut bot = synced();

        let actions = bot.handle(message("m1", "!recount @InfoBot"));
        assert_eq!(actions, vec![Action::RequestRoster]);

        let actions = bot.handle(
            PresenceEvent::Roster(vec![person("a", "Alice"), person("b", "Bob")]).into(),
        );
        assert_eq!(
            actions,
            vec![
                Action::Rename("\u{1}(2P)".to_string()),
                send(RECOUNT_ACK, "m1"),
            ]
        );
    }

    #[test]
    fn test_recount_ack_waits_for_its_own_resync() {
        let mut bot = synced();
        assert_eq!(
            bot.handle(PresenceEvent::Join(person("b", "Bob")).into()),
            vec![Action::Rename("\u{1}(2P)".to_string()), Action::RequestRoster]
        );
        assert_eq!(
            bot.handle(message("m1", "!recount @InfoBot")),
            vec![Action::RequestRoster]
        );

        // Reply to the join's request: no ack yet.
        let actions = bot.handle(
            PresenceEvent::Roster(vec![person("a", "Alice"), person("b", "Bob")]).into(),
        );
        assert!(actions.is_empty());

        // Reply to the recount's request: new tally first, then the ack.
        let actions = bot.handle(
            PresenceEvent::Roster(vec![
                person("a", "Alice"),
                person("b", "Bob"),
                person("c", "Carl"),
            ])
            .into(),
        );
        assert_eq!(
            actions,
            vec![
                Action::Rename("\u{1}(3P)".to_string()),
                send(RECOUNT_ACK, "m1"),
            ]
        );
    }

    #[test]
    fn test_failed_join_resync_keeps_recount_waiting() {
        let mut bot = synced();
        bot.handle(PresenceEvent::Join(person("b", "Bob")).into());
        bot.handle(message("m1", "!recount @InfoBot"));

        assert!(bot.resync_failed().is_empty());
        assert_eq!(bot.resync_failed(), vec![send(RECOUNT_ACK, "m1")]);
    }

    #[test]
    fn test_stale_roster_after_reconnect_does_not_ack() {
        let mut bot = synced();
        bot.handle(message("m1", "!recount @InfoBot"));
        bot.handle(PresenceEvent::Disconnected.into());
        assert!(bot
            .handle(PresenceEvent::Roster(vec![person("a", "Alice")]).into())
            .is_empty());
        bot.handle(PresenceEvent::Connected { own: own() }.into());
        bot.handle(PresenceEvent::Snapshot(vec![person("a", "Alice")]).into());

        bot.handle(message("m2", "!recount @InfoBot"));
        let actions = bot.handle(PresenceEvent::Roster(vec![person("a", "Alice")]).into());
        assert_eq!(actions, vec![send(RECOUNT_ACK, "m2")]);
    }

    #[test]
    fn test_recount_acks_after_failed_resync() {
        let mut bot = synced();
        bot.handle(message("m1", "!recount @InfoBot"));
        assert_eq!(bot.resync_failed(), vec![send(RECOUNT_ACK, "m1")]);
        assert!(bot.resync_failed().is_empty());
    }

    #[test]
    fn test_recount_acks_dropped_on_disconnect() {
        let mut bot = synced();
        bot.handle(message("m1", "!recount @InfoBot"));
        bot.handle(PresenceEvent::Disconnected.into());
        assert!(bot.resync_failed().is_empty());
    }

    #[test]
    fn test_kill() {
        let mut bot = synced();
        assert_eq!(
            bot.handle(message("m1", "!kill @InfoBot")),
            vec![send(KILL_REPLY, "m1"), Action::Leave]
        );
    }

    #[test]
    fn test_restart() {
        let mut bot = synced();
        assert_eq!(
            bot.handle(message("m1", "!restart @PBL")),
            vec![send(RESTART_REPLY, "m1"), Action::Reconnect]
        );
    }

    #[test]
    fn test_answers_to_tally_nick() {
        let mut bot = synced();
        assert_eq!(bot.own_nick(), "\u{1}(1P)");
        let text = format!("!ping @{}", bot.own_nick());
        assert_eq!(bot.handle(message("m1", &text)), vec![send("Pong!", "m1")]);
    }

    #[test]
    fn test_help_topics_reply_separately() {
        let mut bot = synced();
        let actions = bot.handle(message("m1", "!help @InfoBot count lurkers nope"));
        assert_eq!(actions.len(), 3);
        assert!(actions
            .iter()
            .all(|a| matches!(a, Action::Send { reply_to, .. } if reply_to == "m1")));
    }

    #[test]
    fn test_publish_failed_retries_on_next_event() {
        let mut bot = synced();
        bot.publish_failed();
        let actions = bot.handle(PresenceEvent::Roster(vec![person("a", "Alice")]).into());
        assert_eq!(actions, vec![Action::Rename("\u{1}(1P)".to_string())]);
    }

    #[test]
    fn test_counts() {
        let bot = synced();
        assert_eq!(bot.counts().people, 1);
        assert_eq!(bot.roster().len(), 1);
    }
}
