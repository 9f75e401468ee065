//! Record to event classification.

use crate::casemap::is_channel_name;
use crate::error::MessageParseError;
use crate::event::{Action, ChannelRef, DirectMessageTarget, Event, UserRef};
use crate::response::{Response, TargetLayout};
use crate::state::ConnectionState;

use super::nom_parser::{parse_source, RawRecord};

/// Split trailing text into space-separated params, skipping empty tokens.
pub fn split_params(message: &str) -> Vec<String> {
    message
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse one complete record into an event.
///
/// `state` is only read: it supplies the server name, the bot's own nick
/// and the registry used to resolve channels.
pub fn parse_event(record: &str, state: &ConnectionState) -> Result<Event, MessageParseError> {
    let raw = RawRecord::split(record)?;

    let mut event = Event::new(state.server.clone(), Action::from_token(raw.action));
    event.raw = raw.line.to_string();
    event.source = raw.prefix.map(parse_source);
    event.args = raw.args.iter().map(|s| s.to_string()).collect();
    event.message = raw.message.map(str::to_string);
    event.params = raw.message.map(split_params).unwrap_or_default();
    event.user = event.nick().map(|nick| UserRef::Name(nick.to_string()));

    match event.action.code() {
        Some(code) => classify_numeric(&mut event, code),
        None => classify_command(&mut event),
    }

    resolve_channels(&mut event, state);
    Ok(event)
}

fn classify_command(event: &mut Event) {
    let arg = |i: usize| event.args.get(i).cloned();
    let arg_or_message = |i: usize| arg(i).or_else(|| event.message.clone());

    match event.action {
        Action::Privmsg | Action::Notice => {
            event.channel_name = arg(0).filter(|target| is_channel_name(target));
        }
        Action::Join | Action::Part => {
            event.channel_name = arg_or_message(0);
        }
        Action::Topic => {
            event.channel_name = arg(0);
        }
        Action::Kick => {
            event.channel_name = arg(0);
            event.target_user = arg_or_message(1);
        }
        Action::Invite => {
            event.target_user = arg(0);
            event.channel_name = arg_or_message(1);
        }
        // `args` never holds the action, so the new nick is argument 0.
        Action::Nick => {
            event.new_nick = arg_or_message(0);
        }
        Action::Mode => {
            event.channel_name = arg(0);
            event.mode_changes = arg_or_message(1);
            let mut targets: Vec<String> = event.args.iter().skip(2).cloned().collect();
            if event.args.len() >= 2 {
                targets.extend(event.message.clone());
            }
            event.target_users = targets;
        }
        _ => {}
    }
}

fn classify_numeric(event: &mut Event, code: u16) {
    let Some(response) = Response::from_code(code) else {
        return;
    };

    let arg = |i: usize| event.args.get(i).cloned();
    let (channel, nick) = match response.layout() {
        TargetLayout::Nick(i) => (None, arg(i)),
        TargetLayout::Channel(i) => (arg(i), None),
        TargetLayout::Both { channel, nick } => (arg(channel), arg(nick)),
        TargetLayout::Ambiguous(i) => match arg(i) {
            Some(target) if is_channel_name(&target) => (Some(target), None),
            other => (None, other),
        },
    };

    if channel.is_some() {
        event.channel_name = channel;
    }
    if let Some(nick) = nick {
        event.user = Some(UserRef::Name(nick));
    }
}

fn resolve_channels(event: &mut Event, state: &ConnectionState) {
    if event.action.is_multi_channel() {
        if let Some(nick) = event.nick() {
            event.channels = state.channels.channels_with(nick);
        }
        return;
    }

    let sender = event.nick().map(str::to_string);
    event.channel = match &event.channel_name {
        Some(name) if state.is_me(name) => Some(ChannelRef::Direct(DirectMessageTarget::new(
            sender.unwrap_or_else(|| name.clone()),
        ))),
        Some(name) => Some(match state.channels.get(name) {
            Some(channel) => ChannelRef::Tracked(channel.name().to_string()),
            None => ChannelRef::Direct(DirectMessageTarget::new(name.clone())),
        }),
        None if matches!(event.action, Action::Privmsg | Action::Notice) => sender
            .map(|nick| ChannelRef::Direct(DirectMessageTarget::new(nick))),
        None => None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{NamedTarget, Source};
    use crate::state::Member;

    fn state() -> ConnectionState {
        let mut state = ConnectionState::new("testnet", "bot");
        let chan = state.channels.ensure("#chan");
        chan.upsert(Member::new("alice"));
        chan.upsert(Member::new("bob"));
        state.channels.ensure("#other").upsert(Member::new("alice"));
        state
    }

    #[test]
    fn test_channel_privmsg() {
        let event = parse_event(":nick!user@host PRIVMSG #chan :hello world", &state()).unwrap();
        assert_eq!(event.action, Action::Privmsg);
        assert_eq!(event.server, "testnet");
        assert_eq!(event.nick(), Some("nick"));
        assert_eq!(event.channel_name.as_deref(), Some("#chan"));
        assert_eq!(event.channel, Some(ChannelRef::Tracked("#chan".into())));
        assert_eq!(event.message.as_deref(), Some("hello world"));
        assert_eq!(event.params, vec!["hello", "world"]);
        assert_eq!(event.user_name(), Some("nick"));
    }

    #[test]
    fn test_direct_privmsg() {
        let event = parse_event(":alice!a@h PRIVMSG bot :psst", &state()).unwrap();
        assert_eq!(event.channel_name, None);
        assert_eq!(
            event.channel,
            Some(ChannelRef::Direct(DirectMessageTarget::new("alice")))
        );
        assert_eq!(event.reply_target(), Some("alice"));
    }

    #[test]
    fn test_untracked_channel_is_ephemeral() {
        let state = state();
        let event = parse_event(":x!y@z PRIVMSG #elsewhere :hi", &state).unwrap();
        let target = event.channel.unwrap();
        assert!(!target.is_tracked());
        assert_eq!(target.display_name(), "#elsewhere");
        assert!(!state.channels.contains("#elsewhere"));
    }

    #[test]
    fn test_server_prefix() {
        let event = parse_event(":irc.example.net NOTICE * :Looking up host", &state()).unwrap();
        assert_eq!(event.source, Some(Source::Server("irc.example.net".into())));
        assert_eq!(event.user, None);
        assert_eq!(event.channel, None);
    }

    #[test]
    fn test_kick() {
        let event = parse_event(":op!o@h KICK #chan bob :bye", &state()).unwrap();
        assert_eq!(event.channel_name.as_deref(), Some("#chan"));
        assert_eq!(event.target_user.as_deref(), Some("bob"));
    }

    #[test]
    fn test_join_trailing_form() {
        let event = parse_event(":carol!c@h JOIN :#chan", &state()).unwrap();
        assert_eq!(event.channel_name.as_deref(), Some("#chan"));
    }

    #[test]
    fn test_part_and_kick_trailing_forms() {
        let part = parse_event(":bob!b@h PART :#chan", &state()).unwrap();
        assert_eq!(part.channel_name.as_deref(), Some("#chan"));
        assert_eq!(part.channel, Some(ChannelRef::Tracked("#chan".into())));

        let with_reason = parse_event(":bob!b@h PART #chan :later", &state()).unwrap();
        assert_eq!(with_reason.channel_name.as_deref(), Some("#chan"));

        let kick = parse_event(":op!o@h KICK #chan :bob", &state()).unwrap();
        assert_eq!(kick.target_user.as_deref(), Some("bob"));
    }

    #[test]
    fn test_mode_trailing_target() {
        let event = parse_event(":op!o@h MODE #chan +o :alice", &state()).unwrap();
        assert_eq!(event.mode_changes.as_deref(), Some("+o"));
        assert_eq!(event.target_users, vec!["alice"]);

        let user_mode = parse_event(":bot MODE bot :+i", &state()).unwrap();
        assert_eq!(user_mode.mode_changes.as_deref(), Some("+i"));
        assert!(user_mode.target_users.is_empty());
    }

    #[test]
    fn test_nick_new_name_is_first_argument() {
        let event = parse_event(":alice!a@h NICK alicia", &state()).unwrap();
        assert_eq!(event.new_nick.as_deref(), Some("alicia"));
    }

    #[test]
    fn test_nick_is_multi_channel() {
        let event = parse_event(":alice!a@h NICK :alicia", &state()).unwrap();
        assert_eq!(event.new_nick.as_deref(), Some("alicia"));
        let mut channels = event.channels.clone();
        channels.sort();
        assert_eq!(channels, vec!["#chan", "#other"]);
        assert_eq!(event.channel, None);
    }

    #[test]
    fn test_quit_is_multi_channel() {
        let event = parse_event(":bob!b@h QUIT :gone", &state()).unwrap();
        assert_eq!(event.channels, vec!["#chan"]);
    }

    #[test]
    fn test_mode_fields() {
        let event = parse_event(":x MODE #chan +o-v alice bob", &state()).unwrap();
        assert_eq!(event.channel_name.as_deref(), Some("#chan"));
        assert_eq!(event.mode_changes.as_deref(), Some("+o-v"));
        assert_eq!(event.target_users, vec!["alice", "bob"]);
        assert_eq!(event.source, Some(Source::Server("x".into())));
    }

    #[test]
    fn test_names_reply() {
        let event =
            parse_event(":server 353 bot = #chan :@op1 +voice1 plain1", &state()).unwrap();
        assert_eq!(event.action, Action::Numeric(353));
        assert_eq!(event.channel_name.as_deref(), Some("#chan"));
        assert_eq!(event.user_name(), Some("bot"));
        assert_eq!(event.params, vec!["@op1", "+voice1", "plain1"]);
    }

    #[test]
    fn test_topic_who_time() {
        let event = parse_event(":srv 333 bot #chan alice 1700000000", &state()).unwrap();
        assert_eq!(event.channel_name.as_deref(), Some("#chan"));
        assert_eq!(event.user_name(), Some("alice"));
    }

    #[test]
    fn test_ambiguous_numeric() {
        let chan = parse_event(":srv 401 bot #nowhere :No such nick/channel", &state()).unwrap();
        assert_eq!(chan.channel_name.as_deref(), Some("#nowhere"));
        assert_eq!(chan.user, None);

        let nick = parse_event(":srv 401 bot ghost :No such nick/channel", &state()).unwrap();
        assert_eq!(nick.channel_name, None);
        assert_eq!(nick.user_name(), Some("ghost"));
    }

    #[test]
    fn test_unclassified_numeric_keeps_prefix_data_only() {
        let event = parse_event(":nick!u@h 999 bot #chan :whatever", &state()).unwrap();
        assert_eq!(event.action, Action::Numeric(999));
        assert_eq!(event.channel_name, None);
        assert_eq!(event.channel, None);
        assert_eq!(event.user_name(), Some("nick"));
    }

    #[test]
    fn test_ping_without_prefix() {
        let event = parse_event("PING :irc.example.net", &state()).unwrap();
        assert_eq!(event.action, Action::Ping);
        assert_eq!(event.message.as_deref(), Some("irc.example.net"));
        assert!(event.params.len() == 1);
    }

    #[test]
    fn test_no_message_means_no_params() {
        let event = parse_event(":a!b@c JOIN #chan", &state()).unwrap();
        assert_eq!(event.message, None);
        assert!(event.params.is_empty());
    }

    #[test]
    fn test_malformed_record() {
        assert!(parse_event(":only-a-prefix", &state()).is_err());
        assert!(parse_event("", &state()).is_err());
    }
}
