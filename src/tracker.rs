//! Built-in listeners that keep the channel registry in sync.
//!
//! [`install`] registers them under [`TRACKER_TAG`]; they must be installed
//! before any application listener so that later listeners observe the
//! updated registry and the upgraded [`UserRef::Member`].

use tracing::{debug, trace};

use crate::command::Outbound;
use crate::ctcp::Ctcp;
use crate::dispatch::{Context, Listeners};
use crate::event::{Action, ChannelRef, UserRef};
use crate::mode::{member_changes, MemberFlag};
use crate::response::Response;
use crate::state::{ConnectionState, Member};

/// Tag the built-in listeners are registered under.
pub const TRACKER_TAG: &str = "tracker";

/// Role prefixes that may precede a nick in a NAMES reply.
pub const ROLE_PREFIXES: [char; 5] = ['~', '&', '@', '%', '+'];

/// Register every built-in listener.
pub fn install(listeners: &mut Listeners) {
    listeners.on([Action::Join], TRACKER_TAG, on_join);
    listeners.on([Action::Part], TRACKER_TAG, on_part);
    listeners.on([Action::Kick], TRACKER_TAG, on_kick);
    listeners.on([Action::Quit], TRACKER_TAG, on_quit);
    listeners.on([Action::Nick], TRACKER_TAG, on_nick);
    listeners.on([Action::Mode], TRACKER_TAG, on_mode);
    listeners.on(
        [Action::Numeric(Response::RPL_NAMREPLY.code())],
        TRACKER_TAG,
        on_names,
    );
    listeners.on(
        [Action::Numeric(Response::RPL_WELCOME.code())],
        TRACKER_TAG,
        on_welcome,
    );
    listeners.on(
        [Action::Numeric(Response::ERR_NICKNAMEINUSE.code())],
        TRACKER_TAG,
        on_nick_in_use,
    );
    listeners.on([Action::Ping], TRACKER_TAG, on_ping);
    listeners.on([Action::Privmsg], TRACKER_TAG, on_ctcp_ping);
}

fn on_join(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let Some(channel) = ctx.event.channel_name.clone() else {
        return Ok(());
    };
    let joiner = ctx.event.nick().map(str::to_string);
    let is_me = joiner.as_deref().is_some_and(|nick| ctx.state.is_me(nick));

    let entry = ctx.state.channels.ensure(&channel);
    if let (Some(nick), false) = (joiner, is_me) {
        let member = entry.upsert(Member::new(nick)).clone();
        ctx.event.user = Some(UserRef::Member(member));
    } else {
        debug!(channel = %channel, server = %ctx.state.server, "joined channel");
    }
    ctx.event.channel = Some(ChannelRef::Tracked(entry.name().to_string()));
    Ok(())
}

fn depart(state: &mut ConnectionState, channel: &str, nick: &str) {
    if state.is_me(nick) {
        if state.channels.remove(channel).is_some() {
            debug!(channel = %channel, server = %state.server, "left channel");
        }
    } else if let Some(entry) = state.channels.get_mut(channel) {
        entry.remove(nick);
    }
}

fn on_part(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    if let (Some(channel), Some(nick)) = (ctx.event.channel_name.as_deref(), ctx.event.nick()) {
        depart(ctx.state, channel, nick);
    }
    Ok(())
}

fn on_kick(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    if let (Some(channel), Some(nick)) = (
        ctx.event.channel_name.as_deref(),
        ctx.event.target_user.as_deref(),
    ) {
        depart(ctx.state, channel, nick);
    }
    Ok(())
}

fn on_quit(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    if let Some(nick) = ctx.event.nick() {
        ctx.state.channels.remove_member_everywhere(nick);
    }
    Ok(())
}

fn on_nick(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let (Some(old), Some(new)) = (ctx.event.nick(), ctx.event.new_nick.as_deref()) else {
        return Ok(());
    };

    if ctx.state.is_me(old) {
        debug!(old = %old, new = %new, server = %ctx.state.server, "own nick changed");
        ctx.state.nick = new.to_string();
    }
    ctx.state.channels.rename_member_everywhere(old, new);
    Ok(())
}

fn on_mode(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let (Some(channel), Some(modes)) = (
        ctx.event.channel_name.as_deref(),
        ctx.event.mode_changes.as_deref(),
    ) else {
        return Ok(());
    };
    let Some(entry) = ctx.state.channels.get_mut(channel) else {
        return Ok(());
    };

    let changes = match member_changes(modes, &ctx.event.target_users) {
        Ok(changes) => changes,
        Err(err) => {
            debug!(channel = %channel, modes = %modes, "mode change not applied: {}", err);
            return Ok(());
        }
    };

    for change in changes {
        let Some(member) = entry.member_mut(&change.target) else {
            trace!(channel = %channel, nick = %change.target, "mode target is not a member");
            continue;
        };
        match change.flag {
            MemberFlag::Op => member.op = change.enabled,
            MemberFlag::Voice => member.voice = change.enabled,
        }
    }
    Ok(())
}

/// Split a NAMES token into its nick and flags.
pub fn parse_names_entry(token: &str) -> Option<Member> {
    let nick = token.trim_start_matches(ROLE_PREFIXES);
    if nick.is_empty() {
        return None;
    }
    let roles = &token[..token.len() - nick.len()];
    Some(Member {
        name: nick.to_string(),
        op: roles.contains('@'),
        voice: roles.contains('+'),
    })
}

fn on_names(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let Some(channel) = ctx.event.channel_name.as_deref() else {
        return Ok(());
    };

    let entry = ctx.state.channels.ensure(channel);
    for member in ctx.event.params.iter().filter_map(|t| parse_names_entry(t)) {
        entry.upsert(member);
    }
    ctx.event.channel = Some(ChannelRef::Tracked(entry.name().to_string()));
    Ok(())
}

fn on_welcome(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    if let Some(nick) = ctx.event.args.first() {
        if !ctx.state.is_me(nick) {
            debug!(nick = %nick, server = %ctx.state.server, "server assigned nick");
        }
        ctx.state.nick = nick.clone();
    }
    Ok(())
}

fn on_nick_in_use(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    if ctx.state.welcomed {
        return Ok(());
    }
    let fallback = format!("{}_", ctx.state.nick);
    debug!(nick = %fallback, server = %ctx.state.server, "nick in use, retrying");
    ctx.state.nick = fallback.clone();
    ctx.outbox.nick(&fallback);
    Ok(())
}

fn on_ping(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let token = ctx
        .event
        .message
        .clone()
        .or_else(|| ctx.event.args.first().cloned())
        .unwrap_or_default();
    ctx.outbox.pong(&token);
    Ok(())
}

fn on_ctcp_ping(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    if ctx.event.channel_name.is_some() {
        return Ok(());
    }
    let (Some(sender), Some(text)) = (ctx.event.nick(), ctx.event.message.as_deref()) else {
        return Ok(());
    };
    if let Some(ctcp) = Ctcp::parse(text).filter(Ctcp::is_ping) {
        ctx.outbox.ctcp_reply(sender, "PING", ctcp.body);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::command::Outbox;
    use crate::dispatch::{Dispatcher, IgnoreTable};
    use crate::message::parse_event;

    struct Harness {
        dispatcher: Dispatcher,
        state: ConnectionState,
    }

    impl Harness {
        fn new() -> Self {
            let mut listeners = Listeners::new();
            install(&mut listeners);
            Self {
                dispatcher: Dispatcher::new(listeners, Arc::new(IgnoreTable::new())),
                state: ConnectionState::new("net", "bot"),
            }
        }

        fn feed(&mut self, line: &str) -> (crate::event::Event, Vec<String>) {
            let mut event = parse_event(line, &self.state).unwrap();
            let mut outbox = Outbox::new();
            self.dispatcher
                .emit(&mut Context::new(&mut event, &mut self.state, &mut outbox));
            (event, outbox.drain())
        }

        fn member(&self, channel: &str, nick: &str) -> Option<Member> {
            self.state.channels.get(channel)?.member(nick).cloned()
        }
    }

    #[test]
    fn test_names_entry() {
        let member = parse_names_entry("@op").unwrap();
        assert!(member.op && !member.voice);
        let member = parse_names_entry("@+both").unwrap();
        assert!(member.op && member.voice);
        let member = parse_names_entry("~owner").unwrap();
        assert!(!member.op && !member.voice);
        assert_eq!(member.name, "owner");
        assert!(parse_names_entry("@").is_none());
    }

    #[test]
    fn test_join_upgrades_user() {
        let mut h = Harness::new();
        h.feed(":bot!b@h JOIN #chan");
        assert!(h.state.channels.contains("#chan"));
        assert!(h.member("#chan", "bot").is_none());

        let (event, _) = h.feed(":alice!a@h JOIN :#chan");
        assert_eq!(
            event.user,
            Some(UserRef::Member(Member::new("alice")))
        );
        assert_eq!(event.channel, Some(ChannelRef::Tracked("#chan".into())));
        assert_eq!(h.member("#chan", "alice"), Some(Member::new("alice")));
    }

    #[test]
    fn test_names_replace_entries() {
        let mut h = Harness::new();
        h.feed(":server 353 bot = #chan :@op1 +voice1 plain1");
        assert!(h.member("#chan", "op1").unwrap().op);
        assert!(h.member("#chan", "voice1").unwrap().voice);
        let plain = h.member("#chan", "plain1").unwrap();
        assert!(!plain.op && !plain.voice);

        h.feed(":server 353 bot = #chan :op1");
        assert!(!h.member("#chan", "op1").unwrap().op);
    }

    #[test]
    fn test_mode_application() {
        let mut h = Harness::new();
        h.feed(":server 353 bot = #chan :alice +bob");
        h.feed(":x MODE #chan +o-v alice bob");
        assert!(h.member("#chan", "alice").unwrap().op);
        assert!(!h.member("#chan", "bob").unwrap().voice);
    }

    #[test]
    fn test_mode_mismatch_is_rejected() {
        let mut h = Harness::new();
        h.feed(":server 353 bot = #chan :alice bob");
        let (event, _) = h.feed(":x MODE #chan +o-v alice");
        assert_eq!(event.mode_changes.as_deref(), Some("+o-v"));
        assert!(!h.member("#chan", "alice").unwrap().op);
        assert!(!h.member("#chan", "bob").unwrap().voice);
    }

    #[test]
    fn test_nick_preserves_flags() {
        let mut h = Harness::new();
        h.feed(":server 353 bot = #chan :@alice");
        h.feed(":server 353 bot = #other :alice");
        h.feed(":alice!a@h NICK :alicia");
        assert!(h.member("#chan", "alice").is_none());
        assert!(h.member("#chan", "alicia").unwrap().op);
        assert!(h.member("#other", "alicia").is_some());
    }

    #[test]
    fn test_own_nick_change() {
        let mut h = Harness::new();
        h.feed(":bot!b@h NICK newbot");
        assert_eq!(h.state.nick, "newbot");
        assert!(h.state.is_me("NEWBOT"));
    }

    #[test]
    fn test_self_departure() {
        let mut h = Harness::new();
        h.feed(":server 353 bot = #chan :bot alice bob");
        h.feed(":alice!a@h PART #chan :bye");
        assert!(h.state.channels.contains("#chan"));
        assert!(h.member("#chan", "alice").is_none());

        h.feed(":op!o@h KICK #chan bob :out");
        assert!(h.state.channels.contains("#chan"));
        assert!(h.member("#chan", "bob").is_none());

        h.feed(":op!o@h KICK #chan bot :you too");
        assert!(!h.state.channels.contains("#chan"));

        h.feed(":server 353 bot = #two :bot");
        h.feed(":bot!b@h PART #two");
        assert!(h.state.channels.is_empty());
    }

    #[test]
    fn test_quit_removes_everywhere() {
        let mut h = Harness::new();
        h.feed(":server 353 bot = #a :carol dave");
        h.feed(":server 353 bot = #b :carol");
        let (event, _) = h.feed(":carol!c@h QUIT :gone");
        let mut channels = event.channels;
        channels.sort();
        assert_eq!(channels, vec!["#a", "#b"]);
        assert!(h.state.channels.channels_with("carol").is_empty());
        assert!(h.member("#a", "dave").is_some());
    }

    #[test]
    fn test_ping_reply() {
        let mut h = Harness::new();
        let (_, out) = h.feed("PING :irc.example.net");
        assert_eq!(out, vec!["PONG :irc.example.net"]);
    }

    #[test]
    fn test_ctcp_ping_reply() {
        let mut h = Harness::new();
        let (_, out) = h.feed(":alice!a@h PRIVMSG bot :\x01PING 1234\x01");
        assert_eq!(out, vec!["NOTICE alice :\x01PING 1234\x01"]);

        let (_, out) = h.feed(":alice!a@h PRIVMSG #chan :\x01PING 1234\x01");
        assert!(out.is_empty());
    }

    #[test]
    fn test_welcome_and_nick_collision() {
        let mut h = Harness::new();
        let (_, out) = h.feed(":srv 433 * bot :Nickname is already in use");
        assert_eq!(out, vec!["NICK bot_"]);
        h.feed(":srv 001 bot_ :Welcome");
        assert_eq!(h.state.nick, "bot_");

        h.state.welcomed = true;
        let (_, out) = h.feed(":srv 433 bot_ taken :Nickname is already in use");
        assert!(out.is_empty());
    }
}
