//! Static help texts.

use crate::presence::mention;

/// Reply to a general `!help`.
pub const GENERAL_HELP: &str = "I count the types of clients in my nick";

/// Topics accepted by `!help @nick <topic>`.
pub const TOPICS: &[&str] = &["count", "lurkers", "detail", "changelog"];

/// Reply to `!help @nick` without topics.
pub fn overview(own_nick: &str) -> String {
    let nick = mention(own_nick);
    format!(
        "I show the clients connected to this room in my nick: \
         (<people>P <bots>B <lurkers>L <bot-lurkers>N)\n\
         You can also address me as @InfoBot, @PBL or @(PBL).\n\
         \n\
         !recount {nick} - recount the clients in this room\n\
         !detail {nick} - list every client in this room\n\
         !detail {nick} @person - show the clients using @person's nick\n\
         !hosts [--ping] - list the hosts in this room\n\
         \n\
         For more, try \"!help {nick} <topic>\". Topics: {topics}",
        topics = TOPICS.join(", ")
    )
}

/// Reply to `!help @nick <topic>`.
pub fn topic(topic: &str, own_nick: &str) -> String {
    match topic {
        "count" => format!(
            "Every connection to the room is counted, so a room open in two tabs \
             counts twice. Chat clients usually merge the connections of one \
             account under a single nick, which makes my count as high as or \
             higher than the nick list.\n\
             \n\
             If the count looks wrong, try !recount {}.",
            mention(own_nick)
        ),
        "lurkers" => "Clients that are connected but have not chosen a nick are \
                      lurkers and do not show up in the nick list. I count people (L) \
                      and bots (N) who are lurking separately."
            .to_string(),
        "detail" => "Detail lines show the session id, the user id, whether the \
                     session belongs to staff, whether it is a host, and its nick. \
                     Nicks are matched ignoring case, whitespace and punctuation, so \
                     looking up a nick made only of punctuation lists the lurkers."
            .to_string(),
        "changelog" => "- confirm every join, part and nick change with a full recount\n\
                        - acknowledge !recount only after the new count is shown\n\
                        - add !detail and !hosts\n\
                        - add !recount"
            .to_string(),
        other => format!("Topic {other:?} does not exist."),
    }
}
