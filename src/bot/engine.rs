//! Command routing and reply formatting.
//!
//! The engine only reads the roster. Anything that has to touch the
//! connection (resyncs, leaving, reconnecting) comes back as a
//! [`Response`] for the room to carry out.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::command::{Command, CommandInvocation, ParsedArgs};
use super::help;
use crate::presence::{is_self_mention, mention, normalize, similar, RosterFilter, RosterStore};

/// Reply to `!ping`.
pub const PONG: &str = "Pong!";
/// Acknowledgement sent once a `!recount` resync is done.
pub const RECOUNT_ACK: &str = "Recalibrated.";
/// Reply to `!detail` when no argument matched.
pub const DETAIL_NOT_FOUND: &str = "No sessions found that match any of the nicks.";
/// Reply to `!detail` in an empty room.
pub const DETAIL_EMPTY: &str = "No sessions in this room.";
/// Reply to `!hosts` when no host is present.
pub const NO_HOSTS: &str = "No hosts currently in this room.";

/// What the room should do in answer to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Reply with this text.
    Say(String),
    /// Resync the roster, republish, then acknowledge.
    Recount,
    /// Say goodbye and leave the room.
    Kill,
    /// Say goodbye and reconnect.
    Restart,
}

/// Routes command invocations to their handlers.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    started_at: DateTime<Utc>,
}

impl CommandEngine {
    /// Create an engine that reports uptime from `started_at`.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    /// Handle one invocation. Specific commands addressed to someone else,
    /// and verbs the bot does not know, produce no responses.
    pub fn dispatch(
        &self,
        invocation: &CommandInvocation,
        roster: &RosterStore,
        own_nick: &str,
    ) -> Vec<Response> {
        let bare = invocation.args.is_empty();

        match &invocation.target {
            None => match invocation.command {
                Command::Ping if bare => vec![Response::Say(PONG.to_string())],
                Command::Help if bare => vec![Response::Say(help::GENERAL_HELP.to_string())],
                Command::Hosts => vec![Response::Say(hosts(roster, &invocation.args))],
                _ => Vec::new(),
            },
            Some(target) => {
                if !is_self_mention(target, own_nick) {
                    return Vec::new();
                }
                match invocation.command {
                    Command::Ping if bare => vec![Response::Say(PONG.to_string())],
                    Command::Uptime if bare => {
                        vec![Response::Say(uptime(self.started_at, Utc::now()))]
                    }
                    Command::Kill if bare => vec![Response::Kill],
                    Command::Restart if bare => vec![Response::Restart],
                    Command::Recount if bare => vec![Response::Recount],
                    Command::Help => help_replies(&invocation.args, own_nick)
                        .into_iter()
                        .map(Response::Say)
                        .collect(),
                    Command::Detail => vec![Response::Say(detail(roster, &invocation.args))],
                    _ => Vec::new(),
                }
            }
        }
    }
}

/// One reply per requested topic, or the overview when none are given.
pub fn help_replies(argstr: &str, own_nick: &str) -> Vec<String> {
    let args = ParsedArgs::parse(argstr);
    if args.positional.is_empty() {
        return vec![help::overview(own_nick)];
    }
    args.positional
        .iter()
        .map(|t| help::topic(t, own_nick))
        .collect()
}

/// Detail lines for the whole room, or for the sessions matching each nick.
pub fn detail(roster: &RosterStore, argstr: &str) -> String {
    let args = ParsedArgs::parse(argstr);

    if args.positional.is_empty() {
        let sessions = roster.get(&RosterFilter::all().sorted_by_session_id());
        if sessions.is_empty() {
            return DETAIL_EMPTY.to_string();
        }
        return sessions
            .iter()
            .map(|s| s.detail_line())
            .collect::<Vec<_>>()
            .join("\n");
    }

    let sessions = roster.get(&RosterFilter::all());
    let mut lines = Vec::new();
    for arg in &args.positional {
        let nick = match arg.strip_prefix('@') {
            Some(rest) if !rest.is_empty() => rest,
            _ => arg.as_str(),
        };
        lines.extend(
            sessions
                .iter()
                .filter(|s| similar(&s.nick, nick))
                .map(|s| s.detail_line()),
        );
    }

    if lines.is_empty() {
        DETAIL_NOT_FOUND.to_string()
    } else {
        lines.join("\n")
    }
}

/// Nicks of the hosts present, sorted, one per normalized nick.
pub fn host_nicks(roster: &RosterStore) -> Vec<String> {
    let mut nicks: Vec<&str> = roster
        .get(&RosterFilter::all())
        .into_iter()
        .filter(|s| s.is_manager && !s.is_lurker())
        .map(|s| s.nick.as_str())
        .collect();
    nicks.sort_unstable();

    let mut seen = HashSet::new();
    nicks
        .into_iter()
        .filter(|nick| seen.insert(normalize(nick)))
        .map(str::to_string)
        .collect()
}

/// Reply to `!hosts`. `--ping` (or `--mention`) renders each host as a
/// mention.
pub fn hosts(roster: &RosterStore, argstr: &str) -> String {
    let args = ParsedArgs::parse(argstr);
    let ping = args.has_flag("ping") || args.has_flag("mention");

    let nicks = host_nicks(roster);
    if nicks.is_empty() {
        return NO_HOSTS.to_string();
    }

    let lines: Vec<String> = if ping {
        nicks.iter().map(|n| mention(n)).collect()
    } else {
        nicks
    };
    format!("Hosts that are currently in this room:\n{}", lines.join("\n"))
}

/// Reply to `!uptime`.
pub fn uptime(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - started_at).num_seconds().max(0);
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    format!(
        "/me has been up since {} ({days}d {hours}h {minutes}m {seconds}s)",
        started_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::command::parse_message;
    use crate::presence::Session;
    use chrono::{Duration, TimeZone};

    const OWN: &str = "\u{1}(3P)";

    fn person(sid: &str, nick: &str) -> Session {
        Session::new(sid, format!("account:{sid}"), nick)
    }

    fn roster() -> RosterStore {
        RosterStore::from_sessions([
            person("c", "Carl").with_manager(true),
            person("a", "alice").with_staff(true),
            person("b", "Alice!"),
            person("d", ""),
        ])
    }

    fn engine() -> CommandEngine {
        CommandEngine::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
    }

    fn run(text: &str) -> Vec<Response> {
        let invocation = parse_message(text).unwrap();
        engine().dispatch(&invocation, &roster(), OWN)
    }

    fn say(text: &str) -> Vec<Response> {
        vec![Response::Say(text.to_string())]
    }

    #[test]
    fn test_detail_all_sorted_by_session_id() {
        let text = detail(&roster(), "");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("SID: a\t"));
        assert!(lines[1].starts_with("SID: b\t"));
        assert!(lines[2].starts_with("SID: c\t"));
        assert!(lines[3].starts_with("SID: d\t"));
    }

    #[test]
    fn test_detail_empty_room() {
        assert_eq!(detail(&RosterStore::new(), ""), DETAIL_EMPTY);
    }

    #[test]
    fn test_detail_by_nick_keeps_roster_order() {
        let text = detail(&roster(), "@ALICE");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("SID: a\t"));
        assert!(lines[0].contains("staff: yes"));
        assert!(lines[1].starts_with("SID: b\t"));
    }

    #[test]
    fn test_detail_multiple_args_in_argument_order() {
        let text = detail(&roster(), "carl @alice nobody");
        let sids: Vec<&str> = text.lines().map(|l| &l[5..6]).collect();
        assert_eq!(sids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_detail_not_found() {
        let roster = RosterStore::from_sessions([person("b", "Bob")]);
        assert_eq!(detail(&roster, "@alice"), DETAIL_NOT_FOUND);
    }

    #[test]
    fn test_detail_punctuation_finds_lurkers() {
        let text = detail(&roster(), "!");
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("SID: d\t"));
    }

    #[test]
    fn test_detail_bare_at_is_literal() {
        assert_eq!(detail(&roster(), "@"), DETAIL_NOT_FOUND);
    }

    #[test]
    fn test_hosts_plain() {
        assert_eq!(
            hosts(&roster(), ""),
            "Hosts that are currently in this room:\nCarl"
        );
    }

    #[test]
    fn test_hosts_none() {
        let roster = RosterStore::from_sessions([person("a", "Alice")]);
        assert_eq!(hosts(&roster, "--ping"), NO_HOSTS);
    }

    #[test]
    fn test_hosts_ping_dedupes_normalized() {
        let roster = RosterStore::from_sessions([
            person("1", "carl").with_manager(true),
            person("2", "Carl").with_manager(true),
            person("3", "Mr. Bean").with_manager(true),
            person("4", "").with_manager(true),
        ]);
        assert_eq!(
            hosts(&roster, "--ping"),
            "Hosts that are currently in this room:\n@Carl\n@MrBean"
        );
        assert_eq!(hosts(&roster, "--mention"), hosts(&roster, "--ping"));
    }

    #[test]
    fn test_uptime() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = start + Duration::seconds(90_061);
        assert_eq!(
            uptime(start, now),
            "/me has been up since 2026-01-01 00:00:00 UTC (1d 1h 1m 1s)"
        );
    }

    #[test]
    fn test_help_replies() {
        assert_eq!(help_replies("", OWN).len(), 1);
        let replies = help_replies("count nope", OWN);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1], "Topic \"nope\" does not exist.");
    }

    #[test]
    fn test_general_commands() {
        assert_eq!(run("!ping"), say(PONG));
        assert_eq!(run("!help"), say(help::GENERAL_HELP));
        assert!(run("!ping now").is_empty());
        assert!(run("!recount").is_empty());
        assert!(run("!detail").is_empty());
        assert_eq!(run("!hosts").len(), 1);
    }

    #[test]
    fn test_specific_commands_for_us() {
        assert_eq!(run("!ping @InfoBot"), say(PONG));
        assert_eq!(run("!recount @PBL"), vec![Response::Recount]);
        assert_eq!(run("!kill @(PBL)"), vec![Response::Kill]);
        assert_eq!(run("!restart @infobot"), vec![Response::Restart]);
        assert_eq!(run("!help @InfoBot lurkers count").len(), 2);
        assert_eq!(run("!detail @InfoBot").len(), 1);
    }

    #[test]
    fn test_specific_command_by_current_nick() {
        let invocation = parse_message("!recount @Counter").unwrap();
        let responses = engine().dispatch(&invocation, &roster(), "Counter");
        assert_eq!(responses, vec![Response::Recount]);
    }

    #[test]
    fn test_specific_commands_for_someone_else() {
        assert!(run("!ping @Heimdall").is_empty());
        assert!(run("!detail @Heimdall").is_empty());
    }

    #[test]
    fn test_specific_commands_with_args_ignored() {
        assert!(run("!recount @InfoBot now").is_empty());
        assert!(run("!kill @InfoBot please").is_empty());
    }

    #[test]
    fn test_specific_uptime() {
        let responses = run("!uptime @InfoBot");
        assert_eq!(responses.len(), 1);
        match &responses[0] {
            Response::Say(text) => assert!(text.starts_with("/me has been up since 2026-01-01")),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_verb() {
        assert!(run("!dance").is_empty());
        assert!(run("!dance @InfoBot").is_empty());
    }
}
