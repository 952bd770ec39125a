//! The bot itself.
//!
//! This module provides:
//! - Command parsing and the command engine
//! - The per-room bot combining presence and commands
//! - The transport seam, a dry-run transport and a mock transport for tests
//! - The room worker and the multi-room manager

mod command;
mod dry_run;
mod engine;
mod help;
mod manager;
mod mock;
mod room;
mod transport;
mod worker;

pub use command::{parse_message, Command, CommandInvocation, ParsedArgs};
pub use dry_run::DryRunTransport;
pub use engine::{
    detail, help_replies, host_nicks, hosts, uptime, CommandEngine, Response, DETAIL_EMPTY,
    DETAIL_NOT_FOUND, NO_HOSTS, PONG, RECOUNT_ACK,
};
pub use help::{GENERAL_HELP, TOPICS};
pub use manager::{BotManager, RoomSender};
pub use mock::{MockTransport, TransportCall};
pub use room::{Action, ChatMessage, RoomBot, RoomEvent, KILL_REPLY, RESTART_REPLY};
pub use transport::{RoomTransport, TransportError, TransportResult};
pub use worker::RoomWorker;
