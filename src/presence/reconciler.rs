//! Keeps a room's roster in step with the server and decides when the tally
//! nick has to be republished.
//!
//! The reconciler does no I/O. Each event is applied to the roster and
//! answered with the [`PresenceAction`]s the caller must carry out, in
//! order. Values inside an action are computed when the event is handled,
//! so whoever executes them never has to read the roster across an await.
//!
//! Incremental events (join, part, nick) are not trusted to carry complete
//! session metadata. Each one republishes right away from what it says and
//! then asks for a full roster. When the roster arrives it replaces the
//! store and the tally is published again, which corrects anything the
//! incremental event got wrong.

use tracing::debug;

use super::roster::{Counts, RosterStore};
use super::session::Session;

/// Connection state of one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    /// Not connected; the roster is empty.
    Disconnected,
    /// Connected, waiting for the initial snapshot.
    Connected,
    /// Snapshot applied; the roster tracks the room.
    Synced,
}

/// Room lifecycle events, as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    /// The bot's own session is established.
    Connected {
        /// The bot's own session.
        own: Session,
    },
    /// Initial roster sent as part of connection setup.
    Snapshot(Vec<Session>),
    /// A session joined.
    Join(Session),
    /// A session left.
    Part(Session),
    /// A session changed its nick.
    Nick {
        /// Session that changed nick.
        session_id: String,
        /// Previous nick.
        from: String,
        /// New nick.
        to: String,
    },
    /// Reply to a full roster request.
    Roster(Vec<Session>),
    /// The connection to the room is gone.
    Disconnected,
}

/// Work the caller must perform on behalf of the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceAction {
    /// Change the bot's nick to the given tally.
    Rename(String),
    /// Ask the room for its complete roster.
    RequestRoster,
}

/// Presence state machine for a single room.
#[derive(Debug)]
pub struct PresenceReconciler {
    state: PresenceState,
    roster: RosterStore,
    own_session_id: Option<String>,
    /// Nick the bot is believed to hold.
    own_nick: String,
    /// False when a rename failed and the real nick is unknown.
    nick_known: bool,
}

impl PresenceReconciler {
    /// Create a disconnected reconciler. `initial_nick` is what the bot
    /// answers to until its own session is known.
    pub fn new(initial_nick: impl Into<String>) -> Self {
        Self {
            state: PresenceState::Disconnected,
            roster: RosterStore::new(),
            own_session_id: None,
            own_nick: initial_nick.into(),
            nick_known: false,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> PresenceState {
        self.state
    }

    /// The roster as currently believed.
    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    /// Nick the bot currently holds, as far as it knows.
    pub fn own_nick(&self) -> &str {
        &self.own_nick
    }

    /// The bot's own session id, once connected.
    pub fn own_session_id(&self) -> Option<&str> {
        self.own_session_id.as_deref()
    }

    /// Current category counts.
    pub fn counts(&self) -> Counts {
        self.roster.counts()
    }

    /// Apply one lifecycle event.
    pub fn handle(&mut self, event: PresenceEvent) -> Vec<PresenceAction> {
        match event {
            PresenceEvent::Connected { own } => self.on_connected(own),
            PresenceEvent::Snapshot(sessions) => self.on_full_roster(sessions),
            PresenceEvent::Join(session) => self.on_join(session),
            PresenceEvent::Part(session) => self.on_part(&session.session_id),
            PresenceEvent::Nick { session_id, from, to } => {
                self.on_nick(&session_id, &from, &to)
            }
            PresenceEvent::Roster(sessions) => self.on_full_roster(sessions),
            PresenceEvent::Disconnected => self.on_disconnected(),
        }
    }

    /// Ask for a full roster, as `!recount` does. Nothing happens unless
    /// connected.
    pub fn request_resync(&self) -> Vec<PresenceAction> {
        match self.state {
            PresenceState::Disconnected => Vec::new(),
            _ => vec![PresenceAction::RequestRoster],
        }
    }

    /// A roster request failed. The incremental state is kept as is and
    /// republished in case it has not been yet.
    pub fn resync_failed(&mut self) -> Vec<PresenceAction> {
        debug!("roster request failed, keeping incremental state");
        self.publish().into_iter().collect()
    }

    /// A rename failed. Forget the cached nick so the next recompute sends
    /// the tally again.
    pub fn publish_failed(&mut self) {
        self.nick_known = false;
    }

    /// Recompute the tally and return a rename if it differs from the nick
    /// the bot holds.
    pub fn publish(&mut self) -> Option<PresenceAction> {
        if self.state != PresenceState::Synced {
            return None;
        }

        let name = self.roster.counts().derived_name();
        if self.nick_known && name == self.own_nick {
            return None;
        }

        debug!(nick = ?name, "publishing tally");
        self.own_nick = name.clone();
        self.nick_known = true;
        Some(PresenceAction::Rename(name))
    }

    fn is_own(&self, session_id: &str) -> bool {
        self.own_session_id.as_deref() == Some(session_id)
    }

    fn on_connected(&mut self, own: Session) -> Vec<PresenceAction> {
        debug!(session_id = %own.session_id, "connected, awaiting snapshot");
        self.state = PresenceState::Connected;
        self.roster = RosterStore::new();
        self.own_session_id = Some(own.session_id);
        self.own_nick = own.nick;
        self.nick_known = true;
        Vec::new()
    }

    fn on_full_roster(&mut self, sessions: Vec<Session>) -> Vec<PresenceAction> {
        if self.state == PresenceState::Disconnected {
            debug!("ignoring roster while disconnected");
            return Vec::new();
        }

        let own = self.own_session_id.clone();
        self.roster.replace_all(
            sessions
                .into_iter()
                .filter(|s| own.as_deref() != Some(s.session_id.as_str())),
        );
        self.state = PresenceState::Synced;
        debug!(sessions = self.roster.len(), "roster replaced");

        self.publish().into_iter().collect()
    }

    fn on_join(&mut self, session: Session) -> Vec<PresenceAction> {
        if self.state == PresenceState::Disconnected || self.is_own(&session.session_id) {
            return Vec::new();
        }
        debug!(session_id = %session.session_id, nick = %session.nick, "join");
        self.roster.upsert(session);
        self.resync_cascade()
    }

    fn on_part(&mut self, session_id: &str) -> Vec<PresenceAction> {
        if self.state == PresenceState::Disconnected || self.is_own(session_id) {
            return Vec::new();
        }
        debug!(session_id, "part");
        self.roster.remove(session_id);
        self.resync_cascade()
    }

    fn on_nick(&mut self, session_id: &str, from: &str, to: &str) -> Vec<PresenceAction> {
        if self.state == PresenceState::Disconnected {
            return Vec::new();
        }

        // Our own rename echoing back must not start another round.
        if self.is_own(session_id) {
            self.own_nick = to.to_string();
            self.nick_known = true;
            return Vec::new();
        }

        debug!(session_id, from, to, "nick change");
        self.roster.update_nick(session_id, to);
        self.resync_cascade()
    }

    /// Publish what the incremental event told us, then confirm it with a
    /// full roster. Before the snapshot arrives there is nothing to confirm.
    fn resync_cascade(&mut self) -> Vec<PresenceAction> {
        if self.state != PresenceState::Synced {
            return Vec::new();
        }
        let mut actions: Vec<PresenceAction> = self.publish().into_iter().collect();
        actions.push(PresenceAction::RequestRoster);
        actions
    }

    fn on_disconnected(&mut self) -> Vec<PresenceAction> {
        debug!("disconnected, dropping roster");
        self.state = PresenceState::Disconnected;
        self.roster = RosterStore::new();
        self.own_session_id = None;
        self.nick_known = false;
        Vec::new()
    }
}
