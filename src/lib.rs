//! InfoBot - room presence counter
//!
//! A chat bot that keeps a live roster of every room it is in and publishes
//! a tally of people, bots, and lurkers as its own nick.

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod presence;

pub use bot::{
    Action, BotManager, ChatMessage, DryRunTransport, MockTransport, RoomBot, RoomEvent,
    RoomSender, RoomTransport, RoomWorker, TransportError,
};
pub use config::{Config, RoomSettings};
pub use error::{InfobotError, Result};
pub use presence::{
    AccountKind, Counts, PresenceEvent, PresenceReconciler, PresenceState, RosterFilter,
    RosterStore, Session,
};
