//! One server session.
//!
//! A [`Session`] owns its transport and its [`ConnectionState`]; nothing
//! else ever touches either. Records are parsed and fully dispatched one at
//! a time in arrival order. Records queued by listeners, by the
//! registration sequence and by [`Sender`] handles are written by the same
//! loop, spaced out by the configured throttle.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::command::{Outbound, Outbox};
use crate::config::ConnectionConfig;
use crate::dispatch::{Context, Dispatcher};
use crate::error::ConnectionError;
use crate::event::Action;
use crate::message::parse_event;
use crate::registration;
use crate::state::ConnectionState;
use crate::transport::RecordTransport;

/// Messages from [`Sender`] handles to a session.
#[derive(Debug)]
pub(crate) enum Outgoing {
    Line(String),
    Close,
}

/// Cloneable handle for writing to one session.
#[derive(Clone, Debug)]
pub struct Sender {
    server: String,
    tx: mpsc::UnboundedSender<Outgoing>,
}

impl Sender {
    pub(crate) fn new(server: String, tx: mpsc::UnboundedSender<Outgoing>) -> Self {
        Self { server, tx }
    }

    /// Name of the connection this handle writes to.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Whether the session has ended.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Ask the session to flush its queue and stop.
    pub(crate) fn close(&self) {
        let _ = self.tx.send(Outgoing::Close);
    }
}

impl Outbound for Sender {
    fn send_raw(&mut self, line: String) {
        if self.tx.send(Outgoing::Line(line)).is_err() {
            debug!(server = %self.server, "dropping record for closed session");
        }
    }
}

/// What the session should do after one record.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// The server sent `ERROR`.
    ServerError(String),
}

/// Parse and dispatch one record.
///
/// Malformed records are logged and dropped. The first `001` seen marks the
/// state as welcomed, queues the post-welcome registration records and runs
/// the dispatcher's welcome callbacks, after every listener has seen it.
pub async fn handle_record(
    line: &str,
    state: &mut ConnectionState,
    dispatcher: &Dispatcher,
    config: &ConnectionConfig,
    outbox: &mut Outbox,
) -> Flow {
    let mut event = match parse_event(line, state) {
        Ok(event) => event,
        Err(err) => {
            debug!(server = %state.server, raw = %line, "dropping malformed record: {}", err);
            return Flow::Continue;
        }
    };

    if event.is_error_reply() {
        debug!(server = %state.server, reply = %event.action, raw = %line, "server refused a request");
    }

    let first_welcome = !state.welcomed && event.action == Action::Numeric(1);
    let server_error = (event.action == Action::Error)
        .then(|| event.message.clone().unwrap_or_default());

    let mut ctx = Context::new(&mut event, state, outbox);
    dispatcher.dispatch(&mut ctx).await;

    if first_welcome {
        debug!(server = %ctx.state.server, nick = %ctx.state.nick, "registration complete");
        ctx.state.welcomed = true;
        for line in registration::after_welcome(config) {
            ctx.outbox.send_raw(line);
        }
        dispatcher.welcome(&mut ctx);
    }

    match server_error {
        Some(reason) => Flow::ServerError(reason),
        None => Flow::Continue,
    }
}

/// A live connection: transport, state and outbound queue.
pub struct Session<T> {
    transport: T,
    state: ConnectionState,
    config: Arc<ConnectionConfig>,
    dispatcher: Arc<Dispatcher>,
    commands: mpsc::UnboundedReceiver<Outgoing>,
    queue: VecDeque<String>,
    quitting: bool,
}

impl<T: RecordTransport> Session<T> {
    /// Build a session and the handle used to write to it.
    pub fn new(
        transport: T,
        config: Arc<ConnectionConfig>,
        dispatcher: Arc<Dispatcher>,
    ) -> (Self, Sender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sender = Sender::new(config.name.clone(), tx);
        let session = Self {
            transport,
            state: ConnectionState::new(config.name.clone(), config.nickname.clone()),
            config,
            dispatcher,
            commands: rx,
            queue: VecDeque::new(),
            quitting: false,
        };
        (session, sender)
    }

    async fn write(&mut self, line: String) -> Result<(), ConnectionError> {
        if line.get(..4).is_some_and(|verb| verb.eq_ignore_ascii_case("QUIT")) {
            self.quitting = true;
        }
        self.transport.write_record(line).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ConnectionError> {
        while let Some(line) = self.queue.pop_front() {
            self.write(line).await?;
        }
        Ok(())
    }

    /// Register, then read and dispatch until the session ends.
    ///
    /// Ends with `Ok` when the peer closes the socket or a [`Sender`] asks
    /// for it, and with an error on transport failure, idle timeout, or a
    /// server `ERROR` that was not preceded by our own `QUIT`.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        self.queue.extend(registration::greeting(&self.config));

        let throttle = self.config.throttle.unwrap_or_default();
        let idle = self.config.idle_timeout;
        let mut next_write = Instant::now();
        let mut last_read = Instant::now();
        let mut commands_open = true;

        loop {
            let idle_deadline = idle.map(|timeout| last_read + timeout);

            tokio::select! {
                biased;

                _ = sleep_until(next_write), if !self.queue.is_empty() => {
                    if let Some(line) = self.queue.pop_front() {
                        self.write(line).await?;
                        next_write = Instant::now() + throttle;
                    }
                }

                read = self.transport.read_record() => {
                    let Some(line) = read? else {
                        debug!(server = %self.state.server, "connection closed by peer");
                        return Ok(());
                    };
                    last_read = Instant::now();

                    let mut outbox = Outbox::new();
                    let flow = handle_record(
                        &line,
                        &mut self.state,
                        &self.dispatcher,
                        &self.config,
                        &mut outbox,
                    )
                    .await;
                    self.queue.extend(outbox.drain());

                    if let Flow::ServerError(reason) = flow {
                        if self.quitting {
                            debug!(server = %self.state.server, "server closed link after quit");
                            return Ok(());
                        }
                        warn!(server = %self.state.server, "server error: {}", reason);
                        return Err(ConnectionError::ServerError(reason));
                    }
                }

                command = self.commands.recv(), if commands_open => match command {
                    Some(Outgoing::Line(line)) => self.queue.push_back(line),
                    Some(Outgoing::Close) => {
                        self.flush().await?;
                        debug!(server = %self.state.server, "session closed locally");
                        return Ok(());
                    }
                    None => commands_open = false,
                },

                _ = sleep_until(idle_deadline.unwrap_or(last_read)), if idle_deadline.is_some() => {
                    let timeout = idle.unwrap_or_default();
                    warn!(server = %self.state.server, "no data for {:?}, giving up", timeout);
                    return Err(ConnectionError::IdleTimeout(timeout));
                }
            }
        }
    }
}
