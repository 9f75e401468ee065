//! Identity registration sequencing.
//!
//! [`greeting`] is sent as soon as the socket is up; [`after_welcome`] is
//! sent once, on the first `001` a connection receives.

use crate::command;
use crate::config::ConnectionConfig;

/// `PASS`, `NICK` and `USER`, in that order.
pub fn greeting(config: &ConnectionConfig) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if let Some(password) = &config.password {
        lines.push(command::pass(password));
    }
    lines.push(command::nick(&config.nickname));
    lines.push(command::user(&config.username, &config.realname));
    lines
}

/// Identify to services, then join every configured channel.
pub fn after_welcome(config: &ConnectionConfig) -> Vec<String> {
    let mut lines = Vec::with_capacity(config.channels.len() + 1);
    if let Some(identify) = &config.identify {
        lines.push(command::privmsg(
            &identify.service,
            &format!("IDENTIFY {}", identify.password),
        ));
    }
    lines.extend(config.channels.iter().map(|c| command::join(c, None)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentifyConfig;

    #[test]
    fn test_greeting() {
        let config = ConnectionConfig::new("net", "h", "bot").with_user("ident", "The Bot");
        assert_eq!(
            greeting(&config),
            vec!["NICK bot", "USER ident 0 * :The Bot"]
        );

        let config = config.with_password("sekrit");
        assert_eq!(greeting(&config)[0], "PASS sekrit");
    }

    #[test]
    fn test_after_welcome() {
        let config = ConnectionConfig::new("net", "h", "bot")
            .with_identify(IdentifyConfig::new("pw"))
            .with_channels(["#a", "#b"]);
        assert_eq!(
            after_welcome(&config),
            vec!["PRIVMSG NickServ :IDENTIFY pw", "JOIN #a", "JOIN #b"]
        );
        assert!(after_welcome(&ConnectionConfig::new("net", "h", "bot")).is_empty());
    }
}
