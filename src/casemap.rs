//! IRC case-mapping and name classification helpers.
//!
//! IRC uses a special case-insensitive comparison where some characters
//! are considered equivalent (e.g., `[` and `{`). This implements the
//! `rfc1459` case mapping which is the most common. Channel and member
//! registries key their entries by the folded form.

/// Characters that mark a token as a channel name.
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

#[inline]
fn fold(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `[` → `{`
/// - `]` → `}`
/// - `\` → `|`
/// - `~` → `^`
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().zip(b.chars()).all(|(ca, cb)| fold(ca) == fold(cb))
}

/// Whether `name` starts with a channel-prefix character.
pub fn is_channel_name(name: &str) -> bool {
    name.starts_with(CHANNEL_PREFIXES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irc_to_lower() {
        assert_eq!(irc_to_lower("Nick[Away]"), "nick{away}");
        assert_eq!(irc_to_lower("A\\B~"), "a|b^");
    }

    #[test]
    fn test_irc_eq() {
        assert!(irc_eq("#Rust", "#rust"));
        assert!(irc_eq("foo[1]", "FOO{1}"));
        assert!(!irc_eq("foo", "food"));
    }

    #[test]
    fn test_is_channel_name() {
        assert!(is_channel_name("#chan"));
        assert!(is_channel_name("&local"));
        assert!(!is_channel_name("nick"));
        assert!(!is_channel_name(""));
    }
}
