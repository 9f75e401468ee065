//! CTCP framing inside PRIVMSG/NOTICE text.
//!
//! Only single-message CTCP is handled: `\x01COMMAND body\x01`.

/// CTCP delimiter byte.
pub const DELIM: char = '\x01';

/// A CTCP request or reply embedded in message text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// Upper-case CTCP command, e.g. `PING` or `ACTION`.
    pub command: &'a str,
    /// Everything after the command, if present.
    pub body: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Parse message text as CTCP. The closing delimiter is optional.
    pub fn parse(text: &'a str) -> Option<Ctcp<'a>> {
        let inner = text.strip_prefix(DELIM)?;
        let inner = inner.strip_suffix(DELIM).unwrap_or(inner);
        if inner.is_empty() {
            return None;
        }

        let (command, body) = match inner.split_once(' ') {
            Some((command, body)) => (command, Some(body)),
            None => (inner, None),
        };
        Some(Ctcp { command, body })
    }

    /// Whether this is a `PING` request.
    pub fn is_ping(&self) -> bool {
        self.command.eq_ignore_ascii_case("PING")
    }
}

/// Frame `command` and optional `body` as CTCP text.
pub fn frame(command: &str, body: Option<&str>) -> String {
    match body {
        Some(body) => format!("{DELIM}{command} {body}{DELIM}"),
        None => format!("{DELIM}{command}{DELIM}"),
    }
}
