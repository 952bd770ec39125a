//! Presence tracking for a single room.
//!
//! This module provides:
//! - The session model and account kinds
//! - Nick normalization and fuzzy matching
//! - The per-room roster and its category counts
//! - The reconciler that keeps the roster in step with the server

pub mod nick;
mod reconciler;
mod roster;
mod session;

pub use nick::{is_self_mention, mention, normalize, similar, BOT_NAME};
pub use reconciler::{PresenceAction, PresenceEvent, PresenceReconciler, PresenceState};
pub use roster::{Counts, RosterFilter, RosterStore};
pub use session::{AccountKind, Session};
