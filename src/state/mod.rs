//! Per-connection mutable state.
//!
//! Each connection owns exactly one [`ConnectionState`]: the bot's current
//! nick on that server and the registry of channels it is in. Nothing is
//! shared between connections, so no locking is involved.

mod channel;

pub use self::channel::{Channel, ChannelRegistry, Member};

use crate::casemap::irc_eq;

/// State owned by one server connection.
#[derive(Clone, Debug)]
pub struct ConnectionState {
    /// Connection name events are tagged with.
    pub server: String,
    /// The bot's own nick as the server knows it.
    pub nick: String,
    /// Channels the bot is in.
    pub channels: ChannelRegistry,
    /// Set once the registration-complete reply has been seen.
    pub welcomed: bool,
}

impl ConnectionState {
    /// Fresh state for a connection about to register as `nick`.
    pub fn new(server: impl Into<String>, nick: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            nick: nick.into(),
            channels: ChannelRegistry::new(),
            welcomed: false,
        }
    }

    /// Whether `nick` is the bot itself.
    pub fn is_me(&self, nick: &str) -> bool {
        irc_eq(&self.nick, nick)
    }

    /// Forget everything learned from the server, keeping the identity.
    pub fn reset(&mut self) {
        self.channels.clear();
        self.welcomed = false;
    }
}
