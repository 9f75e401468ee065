//! Parsed events.
//!
//! Every complete record becomes exactly one [`Event`]. The struct has a
//! fixed shape; which of the optional target fields are filled depends on
//! the [`Action`]:
//!
//! | action            | fields set                                              |
//! |-------------------|---------------------------------------------------------|
//! | `PRIVMSG`/`NOTICE`| `channel_name` + `channel` when addressed to a channel, otherwise `channel` is a direct-message target |
//! | `JOIN`/`PART`/`TOPIC` | `channel_name`, `channel`                           |
//! | `KICK`            | `channel_name`, `channel`, `target_user`                |
//! | `INVITE`          | `channel_name`, `channel`, `target_user`                |
//! | `NICK`            | `new_nick`, `channels` (multi-channel)                  |
//! | `QUIT`            | `channels` (multi-channel)                              |
//! | `MODE`            | `channel_name`, `channel`, `mode_changes`, `target_users` |
//! | numerics          | per [`TargetLayout`](crate::response::TargetLayout)     |
//!
//! `user` starts as the sender's nick (or the nick a numeric names) and is
//! upgraded to a [`Member`] snapshot by the JOIN tracker.

use std::fmt;

use crate::response::Response;
use crate::state::Member;

/// The origin of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// `nick!ident@host`
    User {
        /// Nickname.
        nick: String,
        /// Ident (username).
        ident: String,
        /// Hostname.
        host: String,
    },
    /// A bare host or server name.
    Server(String),
}

impl Source {
    /// The sender's nick, if the record came from a user.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Source::User { nick, .. } => Some(nick),
            Source::Server(_) => None,
        }
    }

    /// The host part of the prefix.
    pub fn host(&self) -> &str {
        match self {
            Source::User { host, .. } => host,
            Source::Server(host) => host,
        }
    }
}

/// The command or numeric a record carries.
///
/// Listeners are registered per action; every numeric is its own bucket
/// keyed by code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Action {
    /// `PRIVMSG`
    Privmsg,
    /// `NOTICE`
    Notice,
    /// `JOIN`
    Join,
    /// `PART`
    Part,
    /// `KICK`
    Kick,
    /// `NICK`
    Nick,
    /// `MODE`
    Mode,
    /// `QUIT`
    Quit,
    /// `TOPIC`
    Topic,
    /// `INVITE`
    Invite,
    /// `PING`
    Ping,
    /// `PONG`
    Pong,
    /// `ERROR`
    Error,
    /// Three-digit numeric reply.
    Numeric(u16),
    /// Any other command, upper-cased.
    Other(String),
}

impl Action {
    /// Classify an action token. Three-digit tokens become numerics.
    pub fn from_token(token: &str) -> Action {
        if token.len() == 3 && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(code) = token.parse() {
                return Action::Numeric(code);
            }
        }

        match token.to_ascii_uppercase().as_str() {
            "PRIVMSG" => Action::Privmsg,
            "NOTICE" => Action::Notice,
            "JOIN" => Action::Join,
            "PART" => Action::Part,
            "KICK" => Action::Kick,
            "NICK" => Action::Nick,
            "MODE" => Action::Mode,
            "QUIT" => Action::Quit,
            "TOPIC" => Action::Topic,
            "INVITE" => Action::Invite,
            "PING" => Action::Ping,
            "PONG" => Action::Pong,
            "ERROR" => Action::Error,
            other => Action::Other(other.to_string()),
        }
    }

    /// Whether the event concerns every channel the sender shares with us.
    pub fn is_multi_channel(&self) -> bool {
        matches!(self, Action::Nick | Action::Quit)
    }

    /// The numeric code, if this is a numeric reply.
    pub fn code(&self) -> Option<u16> {
        match self {
            Action::Numeric(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Privmsg => "PRIVMSG",
            Action::Notice => "NOTICE",
            Action::Join => "JOIN",
            Action::Part => "PART",
            Action::Kick => "KICK",
            Action::Nick => "NICK",
            Action::Mode => "MODE",
            Action::Quit => "QUIT",
            Action::Topic => "TOPIC",
            Action::Invite => "INVITE",
            Action::Ping => "PING",
            Action::Pong => "PONG",
            Action::Error => "ERROR",
            Action::Numeric(code) => return write!(f, "{:03}", code),
            Action::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// Anything an event can be addressed to and replied through.
pub trait NamedTarget {
    /// Name to address replies to.
    fn display_name(&self) -> &str;
}

/// An ephemeral direct-message target.
///
/// Never stored in the channel registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectMessageTarget {
    name: String,
}

impl DirectMessageTarget {
    /// Create a target addressed to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl NamedTarget for DirectMessageTarget {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Where a single-channel event resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelRef {
    /// A channel present in this connection's registry, by name.
    Tracked(String),
    /// A direct message, or a channel the registry does not track.
    Direct(DirectMessageTarget),
}

impl ChannelRef {
    /// Whether the target is a tracked channel.
    pub fn is_tracked(&self) -> bool {
        matches!(self, ChannelRef::Tracked(_))
    }
}

impl NamedTarget for ChannelRef {
    fn display_name(&self) -> &str {
        match self {
            ChannelRef::Tracked(name) => name,
            ChannelRef::Direct(target) => target.display_name(),
        }
    }
}

/// The user an event is about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserRef {
    /// A bare nick.
    Name(String),
    /// A registry entry snapshot.
    Member(Member),
}

impl UserRef {
    /// The user's nick.
    pub fn name(&self) -> &str {
        match self {
            UserRef::Name(name) => name,
            UserRef::Member(member) => &member.name,
        }
    }

    /// The member snapshot, if the tracker supplied one.
    pub fn member(&self) -> Option<&Member> {
        match self {
            UserRef::Member(member) => Some(member),
            UserRef::Name(_) => None,
        }
    }
}

/// One parsed record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Name of the connection the record arrived on.
    pub server: String,
    /// The record as received, terminator stripped.
    pub raw: String,
    /// Parsed prefix, if the record had one.
    pub source: Option<Source>,
    /// Command or numeric.
    pub action: Action,
    /// Positional arguments, action excluded, trailing text excluded.
    pub args: Vec<String>,
    /// Trailing free text after ` :`.
    pub message: Option<String>,
    /// `message` split on spaces; empty when there is no message.
    pub params: Vec<String>,
    /// Raw channel argument for single-channel events.
    pub channel_name: Option<String>,
    /// Resolved single-channel target.
    pub channel: Option<ChannelRef>,
    /// Every tracked channel a multi-channel event applies to.
    pub channels: Vec<String>,
    /// The user the event is about.
    pub user: Option<UserRef>,
    /// KICK and INVITE: the affected nick.
    pub target_user: Option<String>,
    /// NICK: the new nick.
    pub new_nick: Option<String>,
    /// MODE: the raw mode string.
    pub mode_changes: Option<String>,
    /// MODE: arguments after the mode string.
    pub target_users: Vec<String>,
}

impl Event {
    /// An event with only the action set.
    pub fn new(server: impl Into<String>, action: Action) -> Self {
        Self {
            server: server.into(),
            raw: String::new(),
            source: None,
            action,
            args: Vec::new(),
            message: None,
            params: Vec::new(),
            channel_name: None,
            channel: None,
            channels: Vec::new(),
            user: None,
            target_user: None,
            new_nick: None,
            mode_changes: None,
            target_users: Vec::new(),
        }
    }

    /// The sender's nick.
    pub fn nick(&self) -> Option<&str> {
        self.source.as_ref().and_then(Source::nick)
    }

    /// The user field's nick.
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(UserRef::name)
    }

    /// Where a reply to this event should go.
    pub fn reply_target(&self) -> Option<&str> {
        self.channel.as_ref().map(NamedTarget::display_name)
    }

    /// Whether the event came from a user rather than a server.
    pub fn is_from_user(&self) -> bool {
        self.nick().is_some()
    }

    /// Whether this is a multi-channel event.
    pub fn is_multi_channel(&self) -> bool {
        self.action.is_multi_channel()
    }

    /// The catalogued numeric reply, if the action is one.
    pub fn response(&self) -> Option<Response> {
        self.action.code().and_then(Response::from_code)
    }

    /// Whether the server answered with a known error numeric.
    pub fn is_error_reply(&self) -> bool {
        self.response().is_some_and(|r| r.is_error())
    }
}
