//! Event dispatch.
//!
//! Every parsed [`Event`] passes through the same pipeline: pre-emit hooks
//! in registration order (async, behind the `tokio` feature), then every
//! listener registered for the event's [`Action`], in registration order.
//!
//! A listener is skipped when the [`IgnoreTable`] suppresses its tag for the
//! sender's nick or for the resolved channel. A listener that returns an
//! error or panics is logged and dispatch moves on to the next one.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use slirc_bot::dispatch::{Context, Dispatcher, IgnoreTable, Listeners};
//! use slirc_bot::{parse_event, Action, ConnectionState, Outbound, Outbox};
//!
//! let mut listeners = Listeners::new();
//! listeners.on([Action::Privmsg], "echo", |ctx: &mut Context<'_>| {
//!     let text = ctx.event.message.clone().unwrap_or_default();
//!     ctx.reply(&text);
//!     Ok(())
//! });
//!
//! let dispatcher = Dispatcher::new(listeners, Arc::new(IgnoreTable::new()));
//! let mut state = ConnectionState::new("net", "bot");
//! let mut event = parse_event(":alice!a@h PRIVMSG bot :hi", &state).unwrap();
//! let mut outbox = Outbox::new();
//!
//! dispatcher.emit(&mut Context::new(&mut event, &mut state, &mut outbox));
//! assert_eq!(outbox.lines(), ["PRIVMSG alice :hi"]);
//! ```

#[cfg(feature = "tokio")]
mod hook;
mod ignore;

#[cfg(feature = "tokio")]
pub use self::hook::{Hook, HookChain};
pub use self::ignore::IgnoreTable;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug_span, trace, warn};

use crate::command::{Outbound, Outbox};
use crate::event::{Action, Event, NamedTarget};
use crate::state::ConnectionState;

/// Tag under which post-welcome callbacks are reported.
pub const WELCOME_TAG: &str = "welcome";

/// A listener callback.
pub type Handler = Arc<dyn Fn(&mut Context<'_>) -> anyhow::Result<()> + Send + Sync>;

/// What a listener sees while handling one event.
///
/// The event may be enriched in place for later listeners; the state is the
/// receiving connection's own registry; anything written through
/// [`Outbound`] is sent once dispatch of this event completes.
pub struct Context<'a> {
    /// The event being dispatched.
    pub event: &'a mut Event,
    /// The receiving connection's state.
    pub state: &'a mut ConnectionState,
    /// Records to send on the receiving connection.
    pub outbox: &'a mut Outbox,
}

impl<'a> Context<'a> {
    /// Bundle the pieces of one dispatch.
    pub fn new(
        event: &'a mut Event,
        state: &'a mut ConnectionState,
        outbox: &'a mut Outbox,
    ) -> Self {
        Self {
            event,
            state,
            outbox,
        }
    }

    /// Send `text` back to wherever the event came from.
    ///
    /// Returns `false` when the event has no reply target.
    pub fn reply(&mut self, text: &str) -> bool {
        match self.event.reply_target().map(str::to_string) {
            Some(target) => {
                self.outbox.say(&target, text);
                true
            }
            None => false,
        }
    }
}

impl Outbound for Context<'_> {
    fn send_raw(&mut self, line: String) {
        self.outbox.send_raw(line);
    }
}

/// One registered listener.
#[derive(Clone)]
pub struct Listener {
    tag: String,
    handler: Handler,
}

impl Listener {
    /// The tag ignore entries are matched against.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("tag", &self.tag).finish()
    }
}

/// Listeners keyed by action, each list in registration order.
#[derive(Clone, Debug, Default)]
pub struct Listeners {
    by_action: HashMap<Action, Vec<Listener>>,
}

impl Listeners {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `tag` for every action in `actions`.
    pub fn register<I>(&mut self, actions: I, tag: &str, handler: Handler)
    where
        I: IntoIterator<Item = Action>,
    {
        for action in actions {
            self.by_action.entry(action).or_default().push(Listener {
                tag: tag.to_string(),
                handler: Arc::clone(&handler),
            });
        }
    }

    /// Register a closure. See [`register`](Self::register).
    pub fn on<I, F>(&mut self, actions: I, tag: &str, f: F)
    where
        I: IntoIterator<Item = Action>,
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(actions, tag, Arc::new(f));
    }

    /// Listeners for `action`, in registration order.
    pub fn for_action(&self, action: &Action) -> &[Listener] {
        self.by_action.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.by_action.values().map(Vec::len).sum()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_action.is_empty()
    }
}

/// Outcome counts for one dispatched event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dispatched {
    /// Listeners that ran to completion.
    pub ran: usize,
    /// Listeners suppressed by the ignore table.
    pub skipped: usize,
    /// Listeners that returned an error or panicked.
    pub faulted: usize,
    /// Hooks that failed, panicked or timed out.
    pub hook_faults: usize,
}

/// A failed listener, hook or callback invocation.
#[derive(Debug)]
pub(crate) enum Fault {
    Error(anyhow::Error),
    Panic(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Error(err) => write!(f, "{err:#}"),
            Fault::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}

fn invoke(handler: &Handler, ctx: &mut Context<'_>) -> Result<(), Fault> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler(ctx))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Fault::Error(err)),
        Err(payload) => Err(Fault::Panic(panic_message(payload))),
    }
}

/// Names the ignore table is consulted with for `event`.
fn ignore_subjects(event: &Event) -> Vec<String> {
    let mut subjects = Vec::with_capacity(2);
    if let Some(nick) = event.nick() {
        subjects.push(nick.to_string());
    }
    if !event.is_multi_channel() {
        if let Some(channel) = &event.channel {
            subjects.push(channel.display_name().to_string());
        }
    }
    subjects
}

/// Runs hooks and listeners for each event.
///
/// Shared by every connection of a bot; the listener set is fixed at
/// construction.
pub struct Dispatcher {
    listeners: Listeners,
    welcome: Vec<Handler>,
    ignores: Arc<IgnoreTable>,
    #[cfg(feature = "tokio")]
    hooks: HookChain,
}

impl Dispatcher {
    /// A dispatcher with no hooks and no welcome callbacks.
    pub fn new(listeners: Listeners, ignores: Arc<IgnoreTable>) -> Self {
        Self {
            listeners,
            welcome: Vec::new(),
            ignores,
            #[cfg(feature = "tokio")]
            hooks: HookChain::default(),
        }
    }

    /// Callbacks run once per connection on the first welcome reply.
    pub fn with_welcome(mut self, welcome: Vec<Handler>) -> Self {
        self.welcome = welcome;
        self
    }

    /// Pre-emit hooks.
    #[cfg(feature = "tokio")]
    pub fn with_hooks(mut self, hooks: HookChain) -> Self {
        self.hooks = hooks;
        self
    }

    /// The shared ignore table.
    pub fn ignores(&self) -> &Arc<IgnoreTable> {
        &self.ignores
    }

    /// The listener registry.
    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Run every listener for the event in `ctx`, skipping ignored tags.
    pub fn emit(&self, ctx: &mut Context<'_>) -> Dispatched {
        let span = debug_span!(
            "dispatch",
            server = %ctx.event.server,
            action = %ctx.event.action,
        );
        let _enter = span.enter();

        let mut report = Dispatched::default();
        let listeners = self.listeners.for_action(&ctx.event.action);
        if listeners.is_empty() {
            return report;
        }

        let subjects = ignore_subjects(ctx.event);
        for listener in listeners {
            if self
                .ignores
                .any_ignored(subjects.iter().map(String::as_str), &listener.tag)
            {
                trace!(tag = %listener.tag, "listener suppressed by ignore");
                report.skipped += 1;
                continue;
            }

            match invoke(&listener.handler, ctx) {
                Ok(()) => report.ran += 1,
                Err(fault) => {
                    warn!(
                        tag = %listener.tag,
                        action = %ctx.event.action,
                        server = %ctx.event.server,
                        raw = %ctx.event.raw,
                        "listener failed: {}",
                        fault
                    );
                    report.faulted += 1;
                }
            }
        }
        report
    }

    /// Run the post-welcome callbacks. Faults are logged and skipped.
    pub fn welcome(&self, ctx: &mut Context<'_>) -> usize {
        let mut faulted = 0;
        for handler in &self.welcome {
            if let Err(fault) = invoke(handler, ctx) {
                warn!(
                    tag = WELCOME_TAG,
                    server = %ctx.event.server,
                    "welcome callback failed: {}",
                    fault
                );
                faulted += 1;
            }
        }
        faulted
    }

    /// Run the hook chain, then [`emit`](Self::emit).
    #[cfg(feature = "tokio")]
    pub async fn dispatch(&self, ctx: &mut Context<'_>) -> Dispatched {
        let hook_faults = self.hooks.run(ctx.event, ctx.state).await;
        let mut report = self.emit(ctx);
        report.hook_faults = hook_faults;
        report
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listeners.len())
            .field("welcome", &self.welcome.len())
            .finish_non_exhaustive()
    }
}
