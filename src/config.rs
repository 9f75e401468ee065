//! Connection and dispatch configuration.
//!
//! ```
//! use slirc_bot::config::{ConnectionConfig, IdentifyConfig};
//!
//! let config = ConnectionConfig::new("libera", "irc.libera.chat", "slircbot")
//!     .with_tls(true)
//!     .with_channels(["#slirc"])
//!     .with_identify(IdentifyConfig::new("hunter2"));
//!
//! assert_eq!(config.port, 6697);
//! assert_eq!(config.username, "slircbot");
//! ```

use std::time::Duration;

use crate::tokenizer::MAX_LINE_LEN;

/// Plaintext port used when none is given.
pub const DEFAULT_PORT: u16 = 6667;
/// TLS port used when none is given.
pub const DEFAULT_TLS_PORT: u16 = 6697;
/// Idle timeout used when none is given.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
/// Per-hook time limit used when none is given.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(5);
/// Service the identify command is sent to by default.
pub const DEFAULT_IDENTIFY_SERVICE: &str = "NickServ";

/// One server connection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionConfig {
    /// Name events from this connection are tagged with.
    pub name: String,
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Whether to wrap the socket in TLS.
    pub tls: bool,
    /// Desired nickname.
    pub nickname: String,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
    /// Server password, if required.
    pub password: Option<String>,
    /// Services identification, sent after the welcome reply.
    pub identify: Option<IdentifyConfig>,
    /// Channels joined after the welcome reply.
    pub channels: Vec<String>,
    /// Session ends when nothing is read for this long.
    pub idle_timeout: Option<Duration>,
    /// Enable TCP keepalive on the socket.
    pub keepalive: bool,
    /// Minimum spacing between written records.
    pub throttle: Option<Duration>,
    /// Longest accepted record, terminator included.
    pub max_line_len: usize,
}

impl ConnectionConfig {
    /// Plaintext configuration with defaults; username and realname
    /// follow the nickname.
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        let nickname = nickname.into();
        Self {
            name: name.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            tls: false,
            username: nickname.clone(),
            realname: nickname.clone(),
            nickname,
            password: None,
            identify: None,
            channels: Vec::new(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            keepalive: true,
            throttle: None,
            max_line_len: MAX_LINE_LEN,
        }
    }

    /// Toggle TLS. Switches between the default ports if the port was
    /// still a default.
    pub fn with_tls(mut self, tls: bool) -> Self {
        if self.port == DEFAULT_PORT || self.port == DEFAULT_TLS_PORT {
            self.port = if tls { DEFAULT_TLS_PORT } else { DEFAULT_PORT };
        }
        self.tls = tls;
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set username and realname.
    pub fn with_user(mut self, username: impl Into<String>, realname: impl Into<String>) -> Self {
        self.username = username.into();
        self.realname = realname.into();
        self
    }

    /// Set the server password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Identify to services after the welcome reply.
    pub fn with_identify(mut self, identify: IdentifyConfig) -> Self {
        self.identify = Some(identify);
        self
    }

    /// Channels to join after the welcome reply.
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    /// Set or disable the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Toggle TCP keepalive.
    pub fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = keepalive;
        self
    }

    /// Space outbound records at least `interval` apart.
    pub fn with_throttle(mut self, interval: Option<Duration>) -> Self {
        self.throttle = interval;
        self
    }

    /// Set the record length limit.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }
}

/// Services identification.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdentifyConfig {
    /// Nick the identify command is addressed to.
    pub service: String,
    /// Password sent with the identify command.
    pub password: String,
}

impl IdentifyConfig {
    /// Identify to `NickServ`.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            service: DEFAULT_IDENTIFY_SERVICE.to_string(),
            password: password.into(),
        }
    }

    /// Identify to another service nick.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }
}

/// Dispatch pipeline settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchConfig {
    /// Time limit for each pre-emit hook.
    pub hook_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            hook_timeout: DEFAULT_HOOK_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::new("net", "irc.example.net", "bot");
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.tls);
        assert_eq!(config.realname, "bot");
        assert_eq!(config.idle_timeout, Some(DEFAULT_IDLE_TIMEOUT));
        assert_eq!(config.max_line_len, MAX_LINE_LEN);
        assert_eq!(DispatchConfig::default().hook_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_tls_port_switch() {
        let config = ConnectionConfig::new("net", "h", "bot").with_tls(true);
        assert_eq!(config.port, DEFAULT_TLS_PORT);
        let config = ConnectionConfig::new("net", "h", "bot")
            .with_port(7000)
            .with_tls(true);
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn test_identify_service_default() {
        let identify = IdentifyConfig::new("secret");
        assert_eq!(identify.service, "NickServ");
        assert_eq!(identify.with_service("AuthServ").service, "AuthServ");
    }
}
