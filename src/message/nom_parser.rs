//! Low-level record splitting.
//!
//! The prefix and action tokens are recognised with nom combinators; the
//! boundary between the parameter list and the trailing text is found by
//! scanning for the first ` :` so colons inside ordinary arguments are
//! left alone.

use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::all_consuming,
    error::{context, VerboseError},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::MessageParseError;
use crate::event::Source;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse a `nick!ident@host` prefix (without the leading `:`).
fn parse_user_prefix(input: &str) -> ParseResult<&str, (&str, &str, &str)> {
    context(
        "parsing user prefix",
        all_consuming(tuple((
            take_while1(|c| c != '!' && c != '@' && c != ' '),
            preceded(char('!'), take_while1(|c| c != '@' && c != ' ')),
            preceded(char('@'), take_while1(|c| c != ' ')),
        ))),
    )(input)
}

/// Parse the action token: letters for commands, digits for numerics.
fn parse_action(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing action",
        all_consuming(take_while1(|c: char| c.is_ascii_alphanumeric())),
    )(input)
}

/// Classify a prefix as a user (`nick!ident@host`) or a bare host.
pub fn parse_source(prefix: &str) -> Source {
    match parse_user_prefix(prefix) {
        Ok((_, (nick, ident, host))) => Source::User {
            nick: nick.to_string(),
            ident: ident.to_string(),
            host: host.to_string(),
        },
        Err(_) => Source::Server(prefix.to_string()),
    }
}

/// A record split into its parts, borrowing from the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// The record with any line terminator removed.
    pub line: &'a str,
    /// Prefix without the leading `:`.
    pub prefix: Option<&'a str>,
    /// The action token as received.
    pub action: &'a str,
    /// Space-separated arguments between the action and the trailing text.
    pub args: Vec<&'a str>,
    /// Everything after the first ` :`.
    pub message: Option<&'a str>,
}

impl<'a> RawRecord<'a> {
    /// Split a record into prefix, action, arguments and trailing text.
    pub fn split(record: &'a str) -> Result<Self, MessageParseError> {
        let line = record.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let (prefix, rest) = match line.strip_prefix(':') {
            Some(after_marker) => {
                let (prefix, rest) = after_marker
                    .split_once(' ')
                    .ok_or_else(|| MessageParseError::MissingCommand(line.to_string()))?;
                if prefix.is_empty() {
                    return Err(MessageParseError::InvalidPrefix(line.to_string()));
                }
                (Some(prefix), rest)
            }
            None => (None, line),
        };

        let (list, message) = match rest.find(" :") {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 2..])),
            None => (rest, None),
        };

        let mut tokens = list.split(' ').filter(|t| !t.is_empty());
        let action = tokens
            .next()
            .filter(|token| parse_action(token).is_ok())
            .ok_or_else(|| MessageParseError::MissingCommand(line.to_string()))?;

        Ok(RawRecord {
            line,
            prefix,
            action,
            args: tokens.collect(),
            message,
        })
    }
}
