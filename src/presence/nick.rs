//! Nick normalization and fuzzy matching.
//!
//! Chat clients strip a handful of punctuation characters and all whitespace
//! when turning a nick into an `@mention`, so two nicks are treated as the
//! same identity when their mention forms agree case-insensitively.

/// Name the bot always answers to, whatever its current tally nick is.
pub const BOT_NAME: &str = "InfoBot";

/// Characters the client drops when rendering a mention.
const DECORATION: &[char] = &[',', '.', '!', '?', ';', '&', '<', '\'', '"'];

fn is_decoration(c: char) -> bool {
    c.is_whitespace() || DECORATION.contains(&c)
}

/// Strip decoration characters and whitespace, keeping case.
fn strip_decoration(nick: &str) -> String {
    nick.chars().filter(|c| !is_decoration(*c)).collect()
}

/// Normalized form used for every comparison.
pub fn normalize(nick: &str) -> String {
    strip_decoration(nick).to_lowercase()
}

/// Whether two nicks denote the same identity.
pub fn similar(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Render a nick as a mention token that pings its owner.
pub fn mention(nick: &str) -> String {
    format!("@{}", strip_decoration(nick))
}

/// Whether a normalized nick is the terse `PBL` alias, or `(PBL)`.
///
/// Letters other than the `b` may be missing, so `bl`, `pb` and `b` all
/// count. Equivalent to the pattern `p?bl?n?|\(p?bl?n?\)`.
fn is_terse_alias(normalized: &str) -> bool {
    let inner = match normalized.strip_prefix('(') {
        Some(rest) => match rest.strip_suffix(')') {
            Some(inner) => inner,
            None => return false,
        },
        None => normalized,
    };

    let rest = inner.strip_prefix('p').unwrap_or(inner);
    let Some(rest) = rest.strip_prefix('b') else {
        return false;
    };
    let rest = rest.strip_prefix('l').unwrap_or(rest);
    let rest = rest.strip_prefix('n').unwrap_or(rest);
    rest.is_empty()
}

/// Whether a command addressed to `target` is meant for this bot.
pub fn is_self_mention(target: &str, own_nick: &str) -> bool {
    similar(target, own_nick) || similar(target, BOT_NAME) || is_terse_alias(&normalize(target))
}
