//! Bot command parsing.
//!
//! Commands follow the usual chat-bot convention: `!verb` addresses every
//! bot in the room, `!verb @nick` addresses one bot, and anything after that
//! is the argument string.

use std::collections::BTreeMap;

/// A recognized command verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness check.
    Ping,
    /// Report how long the bot has been running.
    Uptime,
    /// Leave the room for good.
    Kill,
    /// Reconnect to the room.
    Restart,
    /// Force a full roster resync.
    Recount,
    /// Show help text.
    Help,
    /// List sessions in detail.
    Detail,
    /// List hosts present in the room.
    Hosts,
    /// Anything else.
    Unknown(String),
}

impl Command {
    /// Map a verb to a command. Verbs are case-insensitive.
    pub fn from_verb(verb: &str) -> Self {
        match verb.to_lowercase().as_str() {
            "ping" => Command::Ping,
            "uptime" => Command::Uptime,
            "kill" => Command::Kill,
            "restart" => Command::Restart,
            "recount" => Command::Recount,
            "help" => Command::Help,
            "detail" => Command::Detail,
            "hosts" => Command::Hosts,
            _ => Command::Unknown(verb.to_string()),
        }
    }

    /// Get the command name.
    pub fn name(&self) -> &str {
        match self {
            Command::Ping => "ping",
            Command::Uptime => "uptime",
            Command::Kill => "kill",
            Command::Restart => "restart",
            Command::Recount => "recount",
            Command::Help => "help",
            Command::Detail => "detail",
            Command::Hosts => "hosts",
            Command::Unknown(verb) => verb,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "!{}", self.name())
    }
}

/// A command found in a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// The command verb.
    pub command: Command,
    /// Nick the command is addressed to, without the `@`.
    pub target: Option<String>,
    /// Everything after the verb and target.
    pub args: String,
}

impl CommandInvocation {
    /// Whether this is a general command, addressed to every bot.
    pub fn is_general(&self) -> bool {
        self.target.is_none()
    }
}

/// Parse a chat message. Returns `None` for anything that is not a command.
pub fn parse_message(text: &str) -> Option<CommandInvocation> {
    let without_bang = text.trim().strip_prefix('!')?;
    let (verb, rest) = split_first_word(without_bang);
    if verb.is_empty() {
        return None;
    }

    let (target, args) = match rest.strip_prefix('@') {
        Some(addressed) => {
            let (nick, args) = split_first_word(addressed);
            if nick.is_empty() {
                (None, rest)
            } else {
                (Some(nick.to_string()), args)
            }
        }
        None => (None, rest),
    };

    Some(CommandInvocation {
        command: Command::from_verb(verb),
        target,
        args: args.to_string(),
    })
}

fn split_first_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim()),
        None => (s, ""),
    }
}

/// An argument string split into positional arguments and flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Positional arguments, in order.
    pub positional: Vec<String>,
    /// `--name` and `--name=value` arguments.
    pub flags: BTreeMap<String, Option<String>>,
}

impl ParsedArgs {
    /// Split on whitespace. Tokens of the form `--name` or `--name=value`
    /// are flags; everything else is positional.
    pub fn parse(argstr: &str) -> Self {
        let mut parsed = Self::default();
        for token in argstr.split_whitespace() {
            match parse_flag(token) {
                Some((name, value)) => {
                    parsed.flags.insert(name, value);
                }
                None => parsed.positional.push(token.to_string()),
            }
        }
        parsed
    }

    /// Whether a flag was given, with or without a value.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }
}

fn parse_flag(token: &str) -> Option<(String, Option<String>)> {
    let body = token.strip_prefix("--")?;
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value.to_string())),
        None => (body, None),
    };
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value))
}
