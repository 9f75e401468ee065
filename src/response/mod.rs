//! IRC numeric reply codes and their argument layouts.
//!
//! Only the replies the engine knows how to classify are named here. Any
//! other three-digit code still produces an event; it just carries no
//! target fields beyond what the prefix supplied.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

/// Where a numeric reply keeps its nick and/or channel arguments.
///
/// Positions index the event's argument list (the action itself excluded).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetLayout {
    /// The argument at this position is always a nick.
    Nick(usize),
    /// The argument at this position is always a channel.
    Channel(usize),
    /// A channel and a nick at fixed positions.
    Both {
        /// Position of the channel argument.
        channel: usize,
        /// Position of the nick argument.
        nick: usize,
    },
    /// A nick or a channel, told apart by the channel-prefix character.
    Ambiguous(usize),
}

macro_rules! responses {
    ($($(#[$doc:meta])* $name:ident = $code:literal => $layout:expr,)*) => {
        /// IRC server response code.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        #[non_exhaustive]
        pub enum Response {
            $($(#[$doc])* $name = $code,)*
        }

        impl Response {
            /// Look up a known response by its numeric code.
            pub fn from_code(code: u16) -> Option<Response> {
                match code {
                    $($code => Some(Response::$name),)*
                    _ => None,
                }
            }

            /// Argument layout used to classify this reply's targets.
            pub fn layout(&self) -> TargetLayout {
                match self {
                    $(Response::$name => $layout,)*
                }
            }
        }
    };
}

use TargetLayout::{Ambiguous, Both, Channel, Nick};

responses! {
    // === Connection Registration (001-099) ===
    /// 001 - Welcome; registration is complete
    RPL_WELCOME = 1 => Nick(0),
    /// 002 - Your host is running version
    RPL_YOURHOST = 2 => Nick(0),
    /// 003 - Server creation date
    RPL_CREATED = 3 => Nick(0),
    /// 004 - Server info
    RPL_MYINFO = 4 => Nick(0),
    /// 005 - Server supported features
    RPL_ISUPPORT = 5 => Nick(0),

    // === Command Responses (200-399) ===
    /// 221 - User mode string
    RPL_UMODEIS = 221 => Nick(0),
    /// 301 - Target is away
    RPL_AWAY = 301 => Nick(1),
    /// 311 - WHOIS user info
    RPL_WHOISUSER = 311 => Nick(1),
    /// 312 - WHOIS server info
    RPL_WHOISSERVER = 312 => Nick(1),
    /// 313 - WHOIS operator status
    RPL_WHOISOPERATOR = 313 => Nick(1),
    /// 317 - WHOIS idle time
    RPL_WHOISIDLE = 317 => Nick(1),
    /// 318 - End of WHOIS
    RPL_ENDOFWHOIS = 318 => Nick(1),
    /// 319 - WHOIS channels
    RPL_WHOISCHANNELS = 319 => Nick(1),
    /// 324 - Channel mode
    RPL_CHANNELMODEIS = 324 => Channel(1),
    /// 329 - Channel creation time
    RPL_CREATIONTIME = 329 => Channel(1),
    /// 330 - WHOIS account name
    RPL_WHOISACCOUNT = 330 => Nick(1),
    /// 331 - No topic set
    RPL_NOTOPIC = 331 => Channel(1),
    /// 332 - Channel topic
    RPL_TOPIC = 332 => Channel(1),
    /// 333 - Topic set by nick at time
    RPL_TOPICWHOTIME = 333 => Both { channel: 1, nick: 2 },
    /// 341 - Invite sent
    RPL_INVITING = 341 => Both { channel: 2, nick: 1 },
    /// 353 - NAMES list
    RPL_NAMREPLY = 353 => Both { channel: 2, nick: 0 },
    /// 366 - End of NAMES list
    RPL_ENDOFNAMES = 366 => Channel(1),
    /// 367 - Ban list entry
    RPL_BANLIST = 367 => Channel(1),
    /// 368 - End of ban list
    RPL_ENDOFBANLIST = 368 => Channel(1),
    /// 372 - MOTD line
    RPL_MOTD = 372 => Nick(0),
    /// 375 - Start of MOTD
    RPL_MOTDSTART = 375 => Nick(0),
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376 => Nick(0),

    // === Error Replies (400-599) ===
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401 => Ambiguous(1),
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403 => Channel(1),
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404 => Channel(1),
    /// 405 - Too many channels
    ERR_TOOMANYCHANNELS = 405 => Channel(1),
    /// 422 - MOTD file missing
    ERR_NOMOTD = 422 => Nick(0),
    /// 432 - Erroneous nickname
    ERR_ERRONEUSNICKNAME = 432 => Nick(1),
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433 => Nick(1),
    /// 436 - Nickname collision
    ERR_NICKCOLLISION = 436 => Nick(1),
    /// 441 - User not in channel
    ERR_USERNOTINCHANNEL = 441 => Both { channel: 2, nick: 1 },
    /// 442 - Not on channel
    ERR_NOTONCHANNEL = 442 => Channel(1),
    /// 443 - User already on channel
    ERR_USERONCHANNEL = 443 => Both { channel: 2, nick: 1 },
    /// 471 - Channel is full
    ERR_CHANNELISFULL = 471 => Channel(1),
    /// 473 - Invite only
    ERR_INVITEONLYCHAN = 473 => Channel(1),
    /// 474 - Banned from channel
    ERR_BANNEDFROMCHAN = 474 => Channel(1),
    /// 475 - Bad channel key
    ERR_BADCHANNELKEY = 475 => Channel(1),
    /// 476 - Bad channel mask
    ERR_BADCHANMASK = 476 => Channel(1),
    /// 482 - Channel operator privileges needed
    ERR_CHANOPRIVSNEEDED = 482 => Channel(1),
}

impl Response {
    /// Get the numeric code for this response
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is an error response (400-599)
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}
