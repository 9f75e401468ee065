//! Outbound records.
//!
//! A record is built by joining a verb and its arguments with single
//! spaces; the codec appends the terminator. Free-text arguments are
//! prefixed with `:` by the helpers here, never by [`build`] itself.
//!
//! [`Outbound`] gives every sink the same command surface. [`Outbox`]
//! collects records produced while one event is dispatched; the connection
//! writes them once dispatch is complete.

use crate::ctcp;

/// Join `verb` and `args` with single spaces.
pub fn build(verb: &str, args: &[&str]) -> String {
    let mut line = String::with_capacity(verb.len() + args.iter().map(|a| a.len() + 1).sum::<usize>());
    line.push_str(verb);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

fn trailing(text: &str) -> String {
    format!(":{text}")
}

/// `PRIVMSG target :text`
pub fn privmsg(target: &str, text: &str) -> String {
    build("PRIVMSG", &[target, &trailing(text)])
}

/// `PRIVMSG target :\x01ACTION text\x01`
pub fn action(target: &str, text: &str) -> String {
    privmsg(target, &ctcp::frame("ACTION", Some(text)))
}

/// `NOTICE target :text`
pub fn notice(target: &str, text: &str) -> String {
    build("NOTICE", &[target, &trailing(text)])
}

/// `JOIN channel [key]`
pub fn join(channel: &str, key: Option<&str>) -> String {
    match key {
        Some(key) => build("JOIN", &[channel, key]),
        None => build("JOIN", &[channel]),
    }
}

/// `PART channel [:reason]`
pub fn part(channel: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => build("PART", &[channel, &trailing(reason)]),
        None => build("PART", &[channel]),
    }
}

/// `MODE target modes [args...]`
pub fn mode(target: &str, modes: &str, args: &[&str]) -> String {
    let mut all = Vec::with_capacity(args.len() + 2);
    all.push(target);
    all.push(modes);
    all.extend_from_slice(args);
    build("MODE", &all)
}

/// `NICK nick`
pub fn nick(nick: &str) -> String {
    build("NICK", &[nick])
}

/// `USER username 0 * :realname`
pub fn user(username: &str, realname: &str) -> String {
    build("USER", &[username, "0", "*", &trailing(realname)])
}

/// `PASS password`
pub fn pass(password: &str) -> String {
    build("PASS", &[password])
}

/// `PONG :token`
pub fn pong(token: &str) -> String {
    build("PONG", &[&trailing(token)])
}

/// `QUIT [:reason]`
pub fn quit(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => build("QUIT", &[&trailing(reason)]),
        None => build("QUIT", &[]),
    }
}

/// `TOPIC channel :topic`
pub fn topic(channel: &str, topic: &str) -> String {
    build("TOPIC", &[channel, &trailing(topic)])
}

/// `KICK channel nick [:reason]`
pub fn kick(channel: &str, nick: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => build("KICK", &[channel, nick, &trailing(reason)]),
        None => build("KICK", &[channel, nick]),
    }
}

/// Anything outbound records can be handed to.
///
/// Implementors supply [`send_raw`](Outbound::send_raw); every other method
/// builds exactly one record and passes it on.
pub trait Outbound {
    /// Queue a fully built record (no terminator).
    fn send_raw(&mut self, line: String);

    /// Send a message to a channel or nick.
    fn say(&mut self, target: &str, text: &str) {
        self.send_raw(privmsg(target, text));
    }

    /// Send an action-framed message (`/me`).
    fn action(&mut self, target: &str, text: &str) {
        self.send_raw(action(target, text));
    }

    /// Send a notice.
    fn notice(&mut self, target: &str, text: &str) {
        self.send_raw(notice(target, text));
    }

    /// Join a channel.
    fn join(&mut self, channel: &str, key: Option<&str>) {
        self.send_raw(join(channel, key));
    }

    /// Leave a channel.
    fn part(&mut self, channel: &str, reason: Option<&str>) {
        self.send_raw(part(channel, reason));
    }

    /// Set modes on a channel or on ourselves.
    fn mode(&mut self, target: &str, modes: &str, args: &[&str]) {
        self.send_raw(mode(target, modes, args));
    }

    /// Change our own nick.
    fn nick(&mut self, new_nick: &str) {
        self.send_raw(crate::command::nick(new_nick));
    }

    /// Set a channel topic.
    fn topic(&mut self, channel: &str, text: &str) {
        self.send_raw(topic(channel, text));
    }

    /// Kick a member from a channel.
    fn kick(&mut self, channel: &str, nick: &str, reason: Option<&str>) {
        self.send_raw(kick(channel, nick, reason));
    }

    /// Answer a server PING.
    fn pong(&mut self, token: &str) {
        self.send_raw(pong(token));
    }

    /// Disconnect from the server.
    fn quit(&mut self, reason: Option<&str>) {
        self.send_raw(quit(reason));
    }

    /// Send a CTCP reply.
    fn ctcp_reply(&mut self, target: &str, command: &str, body: Option<&str>) {
        self.send_raw(notice(target, &ctcp::frame(command, body)));
    }
}

/// Records queued while dispatching one event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outbox {
    lines: Vec<String>,
}

impl Outbox {
    /// An empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records queued so far, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Take every queued record, leaving the outbox empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Outbound for Outbox {
    fn send_raw(&mut self, line: String) {
        self.lines.push(line);
    }
}
