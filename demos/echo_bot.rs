//! A minimal echo bot.
//!
//! ```text
//! IRC_HOST=irc.libera.chat IRC_CHANNELS=#mychan RUST_LOG=slirc_bot=debug \
//!     cargo run --example echo_bot
//! ```
//!
//! Plaintext only; set `IRC_PORT` for a non-default port.

use anyhow::Context as _;
use slirc_bot::{Action, Bot, ConnectionConfig, NamedTarget};
use tracing_subscriber::EnvFilter;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let host = env_or("IRC_HOST", "127.0.0.1");
    let port: u16 = env_or("IRC_PORT", "6667")
        .parse()
        .context("IRC_PORT is not a port number")?;
    let nick = env_or("IRC_NICK", "echobot");
    let channels = env_or("IRC_CHANNELS", "#echo");

    let config = ConnectionConfig::new("demo", host, nick)
        .with_port(port)
        .with_channels(channels.split(',').map(str::trim).filter(|c| !c.is_empty()));

    let bot = Bot::builder()
        .on([Action::Privmsg], "echo", |ctx| {
            let Some(text) = ctx.event.message.as_deref() else {
                return Ok(());
            };
            if let Some(rest) = text.strip_prefix("!echo ") {
                let rest = rest.to_string();
                ctx.reply(&rest);
            }
            Ok(())
        })
        .on([Action::Join], "greet", |ctx| {
            let (Some(nick), Some(channel)) = (ctx.event.user_name(), ctx.event.channel.as_ref())
            else {
                return Ok(());
            };
            tracing::info!(channel = channel.display_name(), nick, "member joined");
            Ok(())
        })
        .on_welcome(|ctx| {
            tracing::info!(nick = %ctx.state.nick, server = %ctx.state.server, "registered");
            Ok(())
        })
        .build();

    bot.connect(config).await?;

    for (name, result) in bot.wait().await {
        match result {
            Ok(()) => tracing::info!(server = %name, "session ended"),
            Err(err) => tracing::warn!(server = %name, "session failed: {}", err),
        }
    }
    Ok(())
}
