//! Per-room roster of live sessions.
//!
//! The store is owned by exactly one room and mutated through `&mut self`,
//! so a snapshot replacement is never observable half-applied.

use super::session::{AccountKind, Session};

/// Selects sessions out of a roster.
#[derive(Debug, Clone, Default)]
pub struct RosterFilter {
    kinds: Option<Vec<AccountKind>>,
    lurker: Option<bool>,
    sort_by_session_id: bool,
}

impl RosterFilter {
    /// A filter matching every session, in insertion order.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only sessions whose account kind is in `kinds`.
    pub fn kinds(mut self, kinds: &[AccountKind]) -> Self {
        self.kinds = Some(kinds.to_vec());
        self
    }

    /// Only lurkers (`true`) or only sessions with a nick (`false`).
    pub fn lurker(mut self, lurker: bool) -> Self {
        self.lurker = Some(lurker);
        self
    }

    /// Return matches sorted by session id instead of insertion order.
    pub fn sorted_by_session_id(mut self) -> Self {
        self.sort_by_session_id = true;
        self
    }

    fn matches(&self, session: &Session) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&session.account_kind) {
                return false;
            }
        }
        match self.lurker {
            Some(lurker) => session.is_lurker() == lurker,
            None => true,
        }
    }
}

/// Session counts for the four disjoint categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// People with a nick.
    pub people: usize,
    /// Bots with a nick.
    pub bots: usize,
    /// People without a nick.
    pub lurking_people: usize,
    /// Bots without a nick.
    pub lurking_bots: usize,
}

impl Counts {
    /// Sum of all categories.
    pub fn total(&self) -> usize {
        self.people + self.bots + self.lurking_people + self.lurking_bots
    }

    /// Render the tally nick, e.g. `"\u{1}(3P 1B 2L)"`.
    ///
    /// Empty categories are left out. The leading U+0001 keeps the tally
    /// from ever colliding with a nick a person would pick.
    pub fn derived_name(&self) -> String {
        let tokens: Vec<String> = [
            (self.people, 'P'),
            (self.bots, 'B'),
            (self.lurking_people, 'L'),
            (self.lurking_bots, 'N'),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, tag)| format!("{count}{tag}"))
        .collect();

        format!("\u{1}({})", tokens.join(" "))
    }
}

/// Sessions believed present in one room, keyed by session id.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    sessions: Vec<Session>,
}

impl RosterStore {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from a snapshot.
    pub fn from_sessions(sessions: impl IntoIterator<Item = Session>) -> Self {
        let mut roster = Self::new();
        roster.replace_all(sessions);
        roster
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Look up a session by id.
    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    /// Replace the whole roster with a snapshot.
    ///
    /// Duplicate ids in the snapshot collapse into one entry, the last one
    /// winning.
    pub fn replace_all(&mut self, sessions: impl IntoIterator<Item = Session>) {
        let mut next = Vec::new();
        for session in sessions {
            upsert_into(&mut next, session);
        }
        self.sessions = next;
    }

    /// Insert a session, or overwrite the one with the same id in place.
    pub fn upsert(&mut self, session: Session) {
        upsert_into(&mut self.sessions, session);
    }

    /// Remove a session. Returns the removed entry, if there was one.
    pub fn remove(&mut self, session_id: &str) -> Option<Session> {
        let pos = self
            .sessions
            .iter()
            .position(|s| s.session_id == session_id)?;
        Some(self.sessions.remove(pos))
    }

    /// Change a session's nick. Returns false if the session is unknown.
    pub fn update_nick(&mut self, session_id: &str, nick: impl Into<String>) -> bool {
        match self.sessions.iter_mut().find(|s| s.session_id == session_id) {
            Some(session) => {
                session.nick = nick.into();
                true
            }
            None => false,
        }
    }

    /// Sessions matching `filter`.
    pub fn get(&self, filter: &RosterFilter) -> Vec<&Session> {
        let mut matches: Vec<&Session> =
            self.sessions.iter().filter(|s| filter.matches(s)).collect();
        if filter.sort_by_session_id {
            matches.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        }
        matches
    }

    /// Count sessions per category.
    pub fn counts(&self) -> Counts {
        let count = |kind: AccountKind, lurker: bool| {
            self.get(&RosterFilter::all().kinds(&[kind]).lurker(lurker))
                .len()
        };
        Counts {
            people: count(AccountKind::Person, false),
            bots: count(AccountKind::Bot, false),
            lurking_people: count(AccountKind::Person, true),
            lurking_bots: count(AccountKind::Bot, true),
        }
    }
}

fn upsert_into(sessions: &mut Vec<Session>, session: Session) {
    match sessions
        .iter_mut()
        .find(|s| s.session_id == session.session_id)
    {
        Some(existing) => *existing = session,
        None => sessions.push(session),
    }
}
