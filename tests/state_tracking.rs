//! Integration tests for registry maintenance driven by parsed events.
//!
//! Each test feeds raw records through the parser and the built-in
//! listeners, exactly as a live session would, and inspects the resulting
//! channel registry.

use std::sync::Arc;

use slirc_bot::{
    parse_event, tracker, ChannelRef, ConnectionState, Context, Dispatcher, Event, IgnoreTable,
    Listeners, Member, Outbox, UserRef,
};

struct Session {
    dispatcher: Dispatcher,
    state: ConnectionState,
}

impl Session {
    fn new(nick: &str) -> Self {
        let mut listeners = Listeners::new();
        tracker::install(&mut listeners);
        Self {
            dispatcher: Dispatcher::new(listeners, Arc::new(IgnoreTable::new())),
            state: ConnectionState::new("testnet", nick),
        }
    }

    fn feed(&mut self, line: &str) -> Event {
        let mut event = parse_event(line, &self.state).expect("well-formed record");
        let mut outbox = Outbox::new();
        self.dispatcher
            .emit(&mut Context::new(&mut event, &mut self.state, &mut outbox));
        event
    }

    fn member(&self, channel: &str, nick: &str) -> Option<&Member> {
        self.state.channels.get(channel)?.member(nick)
    }
}

#[test]
fn test_names_then_flags() {
    let mut s = Session::new("bot");
    s.feed(":server 353 bot = #chan :@op1 +voice1 plain1");

    assert!(s.member("#chan", "op1").unwrap().op);
    assert!(s.member("#chan", "voice1").unwrap().voice);
    let plain = s.member("#chan", "plain1").unwrap();
    assert!(!plain.op);
    assert!(!plain.voice);
}

#[test]
fn test_mode_application() {
    let mut s = Session::new("bot");
    s.feed(":server 353 bot = #chan :alice +bob");
    s.feed(":x MODE #chan +o-v alice bob");

    assert!(s.member("#chan", "alice").unwrap().op);
    assert!(!s.member("#chan", "bob").unwrap().voice);
}

#[test]
fn test_mode_run_applies_all_flags_to_its_target() {
    let mut s = Session::new("bot");
    s.feed(":server 353 bot = #chan :alice");
    s.feed(":x MODE #chan +ov alice");

    let alice = s.member("#chan", "alice").unwrap();
    assert!(alice.op && alice.voice);
}

#[test]
fn test_nick_preserves_flags() {
    let mut s = Session::new("bot");
    s.feed(":server 353 bot = #chan :@alice");
    s.feed(":alice!a@host NICK :alicia");

    assert!(s.member("#chan", "alice").is_none());
    let renamed = s.member("#chan", "alicia").unwrap();
    assert!(renamed.op);
    assert_eq!(renamed.name, "alicia");
}

#[test]
fn test_self_departure_semantics() {
    let mut s = Session::new("bot");
    s.feed(":server 353 bot = #chan :bot alice bob");

    s.feed(":alice!a@h PART #chan");
    assert!(s.state.channels.contains("#chan"));
    assert!(s.member("#chan", "alice").is_none());
    assert!(s.member("#chan", "bob").is_some());

    s.feed(":op!o@h KICK #chan bob :bye");
    assert!(s.state.channels.contains("#chan"));
    assert!(s.member("#chan", "bob").is_none());

    s.feed(":bot!b@h PART #chan :leaving");
    assert!(!s.state.channels.contains("#chan"));

    s.feed(":bot!b@h JOIN #chan");
    s.feed(":op!o@h KICK #chan bot :out");
    assert!(!s.state.channels.contains("#chan"));
}

#[test]
fn test_trailing_form_departures_and_modes() {
    let mut s = Session::new("bot");
    s.feed(":server 353 bot = #chan :bot alice bob carol");

    s.feed(":op!o@h MODE #chan +o :alice");
    assert!(s.member("#chan", "alice").unwrap().op);

    s.feed(":bob!b@h PART :#chan");
    assert!(s.member("#chan", "bob").is_none());

    s.feed(":op!o@h KICK #chan :carol");
    assert!(s.member("#chan", "carol").is_none());

    s.feed(":bot!b@h PART :#chan");
    assert!(!s.state.channels.contains("#chan"));
}

#[test]
fn test_join_upgrades_user_for_later_listeners() {
    let mut s = Session::new("bot");
    s.feed(":bot!b@h JOIN #chan");
    let event = s.feed(":carol!c@h JOIN #chan");

    match event.user {
        Some(UserRef::Member(member)) => assert_eq!(member, Member::new("carol")),
        other => panic!("expected member, got {other:?}"),
    }
    assert_eq!(event.channel, Some(ChannelRef::Tracked("#chan".into())));
}

#[test]
fn test_quit_delivers_to_shared_channels() {
    let mut s = Session::new("bot");
    s.feed(":server 353 bot = #a :bot dave");
    s.feed(":server 353 bot = #b :bot dave");
    s.feed(":server 353 bot = #c :bot");

    let event = s.feed(":dave!d@h QUIT :Ping timeout");
    let mut channels = event.channels;
    channels.sort();
    assert_eq!(channels, vec!["#a", "#b"]);
    assert!(s.state.channels.channels_with("dave").is_empty());
}

#[test]
fn test_channel_lookup_ignores_case() {
    let mut s = Session::new("bot");
    s.feed(":server 353 bot = #Rust :Ferris");
    let event = s.feed(":ferris!f@h PRIVMSG #rust :hi");

    assert_eq!(event.channel, Some(ChannelRef::Tracked("#Rust".into())));
    assert!(s.member("#RUST", "FERRIS").is_some());
}

#[test]
fn test_own_rename_is_tracked() {
    let mut s = Session::new("bot");
    s.feed(":bot!b@h NICK :robot");
    assert_eq!(s.state.nick, "robot");

    let event = s.feed(":alice!a@h PRIVMSG robot :hey");
    assert_eq!(event.reply_target(), Some("alice"));
}
