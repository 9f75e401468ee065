//! Pre-emit hooks.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug_span, warn, Instrument};

use super::{panic_message, Fault};
use crate::config::DEFAULT_HOOK_TIMEOUT;
use crate::event::Event;
use crate::state::ConnectionState;

/// A step run for every event before any listener sees it.
///
/// Hooks run one at a time in registration order and may enrich the event.
/// A hook that fails, panics or overruns the chain's timeout is logged and
/// treated as completed.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Process one event.
    async fn run(&self, event: &mut Event, state: &ConnectionState) -> anyhow::Result<()>;
}

/// Ordered hooks sharing one per-hook timeout.
#[derive(Clone)]
pub struct HookChain {
    hooks: Vec<Arc<dyn Hook>>,
    timeout: Duration,
}

impl HookChain {
    /// An empty chain whose hooks may each run for at most `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            hooks: Vec::new(),
            timeout,
        }
    }

    /// Append a hook.
    pub fn push(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    /// Number of hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook in order. Returns how many faulted.
    pub async fn run(&self, event: &mut Event, state: &ConnectionState) -> usize {
        let mut faulted = 0;
        for hook in &self.hooks {
            let span = debug_span!("hook", hook = hook.name());
            let guarded = AssertUnwindSafe(hook.run(event, state)).catch_unwind();

            let fault = match tokio::time::timeout(self.timeout, guarded)
                .instrument(span)
                .await
            {
                Ok(Ok(Ok(()))) => continue,
                Ok(Ok(Err(err))) => Fault::Error(err),
                Ok(Err(payload)) => Fault::Panic(panic_message(payload)),
                Err(_) => Fault::Error(anyhow::anyhow!("timed out after {:?}", self.timeout)),
            };

            warn!(
                hook = hook.name(),
                action = %event.action,
                server = %event.server,
                raw = %event.raw,
                "hook failed: {}",
                fault
            );
            faulted += 1;
        }
        faulted
    }
}

impl Default for HookChain {
    fn default() -> Self {
        Self::new(DEFAULT_HOOK_TIMEOUT)
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.hooks.iter().map(|h| h.name()).collect();
        f.debug_struct("HookChain")
            .field("hooks", &names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::parse_event;
    use std::sync::Mutex;

    struct Tagging(&'static str, Arc<Mutex<Vec<&'static str>>>);

    #[async_trait]
    impl Hook for Tagging {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, event: &mut Event, _state: &ConnectionState) -> anyhow::Result<()> {
            self.1.lock().unwrap().push(self.0);
            event.params.push(self.0.to_string());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Hook for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn run(&self, _event: &mut Event, _state: &ConnectionState) -> anyhow::Result<()> {
            anyhow::bail!("hook error")
        }
    }

    struct Panicking;

    #[async_trait]
    impl Hook for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn run(&self, _event: &mut Event, _state: &ConnectionState) -> anyhow::Result<()> {
            panic!("hook panic")
        }
    }

    struct Stalling;

    #[async_trait]
    impl Hook for Stalling {
        fn name(&self) -> &str {
            "stalling"
        }

        async fn run(&self, _event: &mut Event, _state: &ConnectionState) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_hooks_run_in_order_and_faults_are_contained() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = HookChain::new(Duration::from_millis(50));
        chain.push(Arc::new(Tagging("one", Arc::clone(&log))));
        chain.push(Arc::new(Failing));
        chain.push(Arc::new(Panicking));
        chain.push(Arc::new(Stalling));
        chain.push(Arc::new(Tagging("two", Arc::clone(&log))));

        let state = ConnectionState::new("net", "bot");
        let mut event = parse_event("PING :x", &state).unwrap();
        let faulted = chain.run(&mut event, &state).await;

        assert_eq!(faulted, 3);
        assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
        assert_eq!(event.params, vec!["x", "one", "two"]);
    }
}
