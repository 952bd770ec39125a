//! Mock transport for tests.
//!
//! Records every outbound call and can answer roster requests by pushing a
//! `Roster` event back into the room, the way a real server would.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use tokio::sync::mpsc::WeakUnboundedSender;

use super::manager::RoomSender;
use super::room::RoomEvent;
use super::transport::{RoomTransport, TransportError, TransportResult};
use crate::presence::{PresenceEvent, Session};

/// An outbound call seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `set_nick` with the requested nick.
    SetNick(String),
    /// `request_roster`.
    RequestRoster,
    /// `send` of a reply.
    Send {
        /// Reply text.
        text: String,
        /// Message replied to.
        reply_to: String,
    },
    /// `leave`.
    Leave,
    /// `reconnect`.
    Reconnect,
}

/// Mock room transport.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<TransportCall>,
    fail_roster: bool,
    fail_rename: bool,
    /// Where roster replies go, and what they contain. The sender is weak so
    /// the room's channel still closes when its owner drops it.
    room: Option<(WeakUnboundedSender<RoomEvent>, Vec<Session>)>,
}

impl MockTransport {
    /// Create a mock that records calls and answers nothing.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Answer roster requests by sending `sessions` to `events`.
    pub fn answer_roster_with(&self, events: &RoomSender, sessions: Vec<Session>) {
        self.state().room = Some((events.downgrade(), sessions));
    }

    /// Make roster requests fail.
    pub fn set_fail_roster(&self, fail: bool) {
        self.state().fail_roster = fail;
    }

    /// Make nick changes fail.
    pub fn set_fail_rename(&self, fail: bool) {
        self.state().fail_rename = fail;
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.state().calls.clone()
    }

    /// Nicks requested so far, in order.
    pub fn renames(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::SetNick(nick) => Some(nick.clone()),
                _ => None,
            })
            .collect()
    }

    /// Reply texts sent so far, in order.
    pub fn replies(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::Send { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of roster requests made.
    pub fn roster_requests(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, TransportCall::RequestRoster))
            .count()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.state().calls.clear();
    }
}

#[async_trait]
impl RoomTransport for MockTransport {
    async fn set_nick(&self, nick: &str) -> TransportResult<()> {
        let mut state = self.state();
        state.calls.push(TransportCall::SetNick(nick.to_string()));
        if state.fail_rename {
            return Err(TransportError::Rejected("nick change refused".to_string()));
        }
        Ok(())
    }

    async fn request_roster(&self) -> TransportResult<()> {
        let mut state = self.state();
        state.calls.push(TransportCall::RequestRoster);
        if state.fail_roster {
            return Err(TransportError::Timeout);
        }
        if let Some((events, sessions)) = &state.room {
            let reply = RoomEvent::Presence(PresenceEvent::Roster(sessions.clone()));
            events
                .upgrade()
                .ok_or(TransportError::Disconnected)?
                .send(reply)
                .map_err(|_| TransportError::Disconnected)?;
        }
        Ok(())
    }

    async fn send(&self, text: &str, reply_to: &str) -> TransportResult<()> {
        self.state().calls.push(TransportCall::Send {
            text: text.to_string(),
            reply_to: reply_to.to_string(),
        });
        Ok(())
    }

    async fn leave(&self) -> TransportResult<()> {
        self.state().calls.push(TransportCall::Leave);
        Ok(())
    }

    async fn reconnect(&self) -> TransportResult<()> {
        self.state().calls.push(TransportCall::Reconnect);
        Ok(())
    }
}
