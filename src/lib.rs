//! # slirc-bot
//!
//! A protocol engine for writing IRC bots.
//!
//! ## Features
//!
//! - Incremental CRLF framing that survives arbitrary read boundaries
//! - Record parsing into fixed-shape events with per-numeric target layouts
//! - Per-connection channel and member tracking driven by the event stream
//! - Ordered dispatch: pre-emit hooks, then ignore-filtered listeners
//! - Optional Tokio integration: plain/TLS transports, sessions, bot façade

#![deny(clippy::all)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing records
//!
//! ```rust
//! use slirc_bot::{parse_event, Action, ConnectionState};
//!
//! let state = ConnectionState::new("libera", "mybot");
//! let event = parse_event(":nick!user@host PRIVMSG #chan :hello world", &state).unwrap();
//!
//! assert_eq!(event.action, Action::Privmsg);
//! assert_eq!(event.nick(), Some("nick"));
//! assert_eq!(event.channel_name.as_deref(), Some("#chan"));
//! assert_eq!(event.params, ["hello", "world"]);
//! ```
//!
//! ### Running a bot
//!
//! ```no_run
//! use slirc_bot::{Action, Bot, ConnectionConfig};
//!
//! # async fn run() -> Result<(), slirc_bot::ConnectionError> {
//! let bot = Bot::builder()
//!     .on([Action::Join], "greet", |ctx| {
//!         if let Some(nick) = ctx.event.nick() {
//!             let text = format!("hello, {nick}");
//!             ctx.reply(&text);
//!         }
//!         Ok(())
//!     })
//!     .build();
//!
//! bot.connect(ConnectionConfig::new("libera", "irc.libera.chat", "greeter").with_channels(["#bots"]))
//!     .await?;
//! bot.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod casemap;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod command;
pub mod config;
pub mod ctcp;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod message;
pub mod mode;
pub mod registration;
pub mod response;
pub mod state;
pub mod tokenizer;
pub mod tracker;

#[cfg(feature = "tokio")]
pub mod bot;
#[cfg(feature = "tokio")]
pub mod connection;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::command::{Outbound, Outbox};
pub use self::config::{ConnectionConfig, DispatchConfig, IdentifyConfig};
pub use self::ctcp::Ctcp;
pub use self::dispatch::{Context, Dispatcher, IgnoreTable, Listeners};
pub use self::error::{MessageParseError, ModeParseError, ProtocolError};
pub use self::event::{
    Action, ChannelRef, DirectMessageTarget, Event, NamedTarget, Source, UserRef,
};
pub use self::message::parse_event;
pub use self::response::Response;
pub use self::state::{Channel, ChannelRegistry, ConnectionState, Member};
pub use self::tokenizer::Tokenizer;

#[cfg(feature = "tokio")]
pub use self::bot::{Bot, BotBuilder};
#[cfg(feature = "tokio")]
pub use self::codec::LineCodec;
#[cfg(feature = "tokio")]
pub use self::connection::Sender;
#[cfg(feature = "tokio")]
pub use self::dispatch::Hook;
#[cfg(feature = "tokio")]
pub use self::error::ConnectionError;
#[cfg(feature = "tokio")]
pub use self::transport::{RecordTransport, Transport};
