//! The bot façade.
//!
//! [`BotBuilder`] collects listeners, hooks and welcome callbacks; once
//! built, the listener set is fixed and shared by every connection.
//! [`Bot`] owns the connection registry: each connection runs as its own
//! task with its own state, and is addressed by its configured name.
//!
//! ```no_run
//! use slirc_bot::{Action, Bot, ConnectionConfig};
//!
//! # async fn run() -> Result<(), slirc_bot::ConnectionError> {
//! let bot = Bot::builder()
//!     .on([Action::Privmsg], "echo", |ctx| {
//!         if let Some(text) = ctx.event.message.clone() {
//!             ctx.reply(&text);
//!         }
//!         Ok(())
//!     })
//!     .build();
//!
//! bot.connect(ConnectionConfig::new("libera", "irc.libera.chat", "echobot")).await?;
//! for (name, result) in bot.wait().await {
//!     println!("{name}: {result:?}");
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;
use tokio_rustls::rustls::ClientConfig;
use tracing::debug;

use crate::command::Outbound;
use crate::config::{ConnectionConfig, DispatchConfig};
use crate::connection::{Sender, Session};
use crate::dispatch::{Context, Dispatcher, Handler, Hook, HookChain, IgnoreTable, Listeners};
use crate::error::ConnectionError;
use crate::event::Action;
use crate::tracker;
use crate::transport::{framed, RecordTransport, Transport};

/// Collects everything that must be in place before connections go live.
pub struct BotBuilder {
    listeners: Listeners,
    hooks: Vec<Arc<dyn Hook>>,
    welcome: Vec<Handler>,
    dispatch: DispatchConfig,
    tls: Option<Arc<ClientConfig>>,
    ignores: Arc<IgnoreTable>,
}

impl BotBuilder {
    /// A builder with the state tracker already installed.
    pub fn new() -> Self {
        let mut listeners = Listeners::new();
        tracker::install(&mut listeners);
        Self {
            listeners,
            hooks: Vec::new(),
            welcome: Vec::new(),
            dispatch: DispatchConfig::default(),
            tls: None,
            ignores: Arc::new(IgnoreTable::new()),
        }
    }

    /// Register a listener for one or more actions.
    pub fn on<I, F>(mut self, actions: I, tag: &str, f: F) -> Self
    where
        I: IntoIterator<Item = Action>,
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners.on(actions, tag, f);
        self
    }

    /// Append a pre-emit hook.
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Run `f` once per connection, after its first welcome reply.
    pub fn on_welcome<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.welcome.push(Arc::new(f));
        self
    }

    /// Dispatch pipeline settings.
    pub fn dispatch_config(mut self, config: DispatchConfig) -> Self {
        self.dispatch = config;
        self
    }

    /// Time limit for each pre-emit hook.
    pub fn hook_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch.hook_timeout = timeout;
        self
    }

    /// Client configuration for TLS connections.
    pub fn tls_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.tls = Some(config);
        self
    }

    /// Start with an ignore entry in place.
    pub fn ignore(self, subject: &str, tag: &str) -> Self {
        self.ignores.add(subject, tag);
        self
    }

    /// Freeze the listener set.
    pub fn build(self) -> Bot {
        let mut hooks = HookChain::new(self.dispatch.hook_timeout);
        for hook in self.hooks {
            hooks.push(hook);
        }
        let dispatcher = Dispatcher::new(self.listeners, self.ignores)
            .with_hooks(hooks)
            .with_welcome(self.welcome);

        Bot {
            dispatcher: Arc::new(dispatcher),
            tls: self.tls,
            connections: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Live {
    sender: Sender,
    task: JoinHandle<Result<(), ConnectionError>>,
}

/// A set of named server connections sharing one dispatcher.
pub struct Bot {
    dispatcher: Arc<Dispatcher>,
    tls: Option<Arc<ClientConfig>>,
    connections: Mutex<HashMap<String, Live>>,
}

impl Bot {
    /// Start building a bot.
    pub fn builder() -> BotBuilder {
        BotBuilder::new()
    }

    /// Open a socket per `config` and start its session.
    pub async fn connect(&self, config: ConnectionConfig) -> Result<Sender, ConnectionError> {
        if self.connections.lock().contains_key(&config.name) {
            return Err(ConnectionError::DuplicateConnection(config.name));
        }
        let transport = Transport::connect(&config, self.tls.clone()).await?;
        self.attach(config, transport)
    }

    /// Start a session over an already connected byte stream.
    pub fn attach_stream<S>(&self, config: ConnectionConfig, stream: S) -> Result<Sender, ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let max_line_len = config.max_line_len;
        self.attach(config, framed(stream, max_line_len))
    }

    /// Start a session over any record transport.
    pub fn attach<T>(&self, config: ConnectionConfig, transport: T) -> Result<Sender, ConnectionError>
    where
        T: RecordTransport + 'static,
    {
        let mut connections = self.connections.lock();
        if connections.contains_key(&config.name) {
            return Err(ConnectionError::DuplicateConnection(config.name));
        }

        let name = config.name.clone();
        let (session, sender) = Session::new(transport, Arc::new(config), Arc::clone(&self.dispatcher));
        let task = tokio::spawn(session.run());
        debug!(server = %name, "session started");

        connections.insert(
            name,
            Live {
                sender: sender.clone(),
                task,
            },
        );
        Ok(sender)
    }

    /// Outbound handle for a connection.
    pub fn sender(&self, server: &str) -> Result<Sender, ConnectionError> {
        self.connections
            .lock()
            .get(server)
            .map(|live| live.sender.clone())
            .ok_or_else(|| ConnectionError::UnknownConnection(server.to_string()))
    }

    /// Send a message on `server`.
    pub fn say(&self, server: &str, target: &str, text: &str) -> Result<(), ConnectionError> {
        self.sender(server)?.say(target, text);
        Ok(())
    }

    /// Send an action-framed message on `server`.
    pub fn action(&self, server: &str, target: &str, text: &str) -> Result<(), ConnectionError> {
        self.sender(server)?.action(target, text);
        Ok(())
    }

    /// Send a notice on `server`.
    pub fn notice(&self, server: &str, target: &str, text: &str) -> Result<(), ConnectionError> {
        self.sender(server)?.notice(target, text);
        Ok(())
    }

    /// Join a channel on `server`.
    pub fn join(&self, server: &str, channel: &str, key: Option<&str>) -> Result<(), ConnectionError> {
        self.sender(server)?.join(channel, key);
        Ok(())
    }

    /// Leave a channel on `server`.
    pub fn part(&self, server: &str, channel: &str, reason: Option<&str>) -> Result<(), ConnectionError> {
        self.sender(server)?.part(channel, reason);
        Ok(())
    }

    /// Set modes on `server`.
    pub fn mode(
        &self,
        server: &str,
        target: &str,
        modes: &str,
        args: &[&str],
    ) -> Result<(), ConnectionError> {
        self.sender(server)?.mode(target, modes, args);
        Ok(())
    }

    /// Change the bot's nick on `server`.
    pub fn nick(&self, server: &str, nick: &str) -> Result<(), ConnectionError> {
        self.sender(server)?.nick(nick);
        Ok(())
    }

    /// Send a prebuilt record on `server`.
    pub fn raw(&self, server: &str, line: impl Into<String>) -> Result<(), ConnectionError> {
        self.sender(server)?.send_raw(line.into());
        Ok(())
    }

    /// The shared ignore table.
    pub fn ignores(&self) -> &IgnoreTable {
        self.dispatcher.ignores()
    }

    /// Names of the registered connections, sorted.
    pub fn connection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connections.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Send `QUIT`, flush, and wait for the session to end.
    pub async fn disconnect(&self, server: &str, reason: Option<&str>) -> Result<(), ConnectionError> {
        let live = self
            .connections
            .lock()
            .remove(server)
            .ok_or_else(|| ConnectionError::UnknownConnection(server.to_string()))?;

        let mut sender = live.sender;
        sender.quit(reason);
        sender.close();
        join(live.task).await
    }

    /// Wait for every session to end, returning each outcome by name.
    pub async fn wait(&self) -> Vec<(String, Result<(), ConnectionError>)> {
        let live: Vec<(String, Live)> = self.connections.lock().drain().collect();
        let mut results = Vec::with_capacity(live.len());
        for (name, live) in live {
            results.push((name, join(live.task).await));
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }
}

async fn join(task: JoinHandle<Result<(), ConnectionError>>) -> Result<(), ConnectionError> {
    match task.await {
        Ok(result) => result,
        Err(err) => {
            debug!("session task ended abnormally: {}", err);
            Err(ConnectionError::Closed)
        }
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("dispatcher", &self.dispatcher)
            .field("connections", &self.connection_names())
            .finish()
    }
}
