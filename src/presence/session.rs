//! Session model shared by the roster and the command handlers.

/// Kind of account behind a session, which decides its counting bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// A human, logged in or not.
    Person,
    /// An automated client.
    Bot,
}

impl AccountKind {
    /// Derive the kind from a user id.
    ///
    /// Ids are namespaced (`account:…`, `agent:…`, `bot:…`); only the
    /// `bot:` namespace counts as a bot.
    pub fn from_user_id(user_id: &str) -> Self {
        if user_id.starts_with("bot:") {
            AccountKind::Bot
        } else {
            AccountKind::Person
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Person => "person",
            AccountKind::Bot => "bot",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One live connection to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Unique per connection.
    pub session_id: String,
    /// Shared by all sessions of one account.
    pub user_id: String,
    /// Current nick; empty while lurking.
    pub nick: String,
    /// Staff flag, fixed for the session's lifetime.
    pub is_staff: bool,
    /// Host flag, fixed for the session's lifetime.
    pub is_manager: bool,
    /// Counting bucket.
    pub account_kind: AccountKind,
}

impl Session {
    /// Create a session with no privileges, deriving the kind from `user_id`.
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        nick: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();
        Self {
            session_id: session_id.into(),
            account_kind: AccountKind::from_user_id(&user_id),
            user_id,
            nick: nick.into(),
            is_staff: false,
            is_manager: false,
        }
    }

    /// Set the staff flag.
    pub fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    /// Set the host flag.
    pub fn with_manager(mut self, is_manager: bool) -> Self {
        self.is_manager = is_manager;
        self
    }

    /// Whether the session has not chosen a nick.
    pub fn is_lurker(&self) -> bool {
        self.nick.is_empty()
    }

    /// Render the one-line summary used by `!detail`.
    pub fn detail_line(&self) -> String {
        format!(
            "SID: {}\t| UID: {}\t| staff: {}\t| host: {}\t| nick: {:?}",
            self.session_id,
            self.user_id,
            yes_no(self.is_staff),
            yes_no(self.is_manager),
            self.nick
        )
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_kind_from_user_id() {
        assert_eq!(AccountKind::from_user_id("bot:abc"), AccountKind::Bot);
        assert_eq!(AccountKind::from_user_id("account:abc"), AccountKind::Person);
        assert_eq!(AccountKind::from_user_id("agent:abc"), AccountKind::Person);
        assert_eq!(AccountKind::from_user_id(""), AccountKind::Person);
        assert_eq!(AccountKind::from_user_id("robot:abc"), AccountKind::Person);
    }

    #[test]
    fn test_session_new() {
        let session = Session::new("s1", "bot:xyz", "Heimdall");
        assert_eq!(session.session_id, "s1");
        assert_eq!(session.account_kind, AccountKind::Bot);
        assert!(!session.is_staff);
        assert!(!session.is_manager);
        assert!(!session.is_lurker());
    }

    #[test]
    fn test_session_lurker() {
        assert!(Session::new("s1", "agent:1", "").is_lurker());
    }

    #[test]
    fn test_detail_line() {
        let session = Session::new("s1", "account:7", "Alice")
            .with_staff(true)
            .with_manager(false);
        assert_eq!(
            session.detail_line(),
            "SID: s1\t| UID: account:7\t| staff: yes\t| host: no\t| nick: \"Alice\""
        );
    }

    #[test]
    fn test_detail_line_lurker() {
        let line = Session::new("s2", "agent:8", "").detail_line();
        assert!(line.ends_with("nick: \"\""));
    }
}
