//! Channels, their members, and the per-connection registry.

use std::collections::HashMap;

use crate::casemap::irc_to_lower;
use crate::event::NamedTarget;

/// A member entry within one channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    /// Current nick.
    pub name: String,
    /// Channel operator.
    pub op: bool,
    /// Voiced.
    pub voice: bool,
}

impl Member {
    /// A member with no flags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: false,
            voice: false,
        }
    }
}

/// A tracked channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    name: String,
    members: HashMap<String, Member>,
}

impl Channel {
    /// An empty channel.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: HashMap::new(),
        }
    }

    /// Channel name as first seen.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a member by nick.
    pub fn member(&self, nick: &str) -> Option<&Member> {
        self.members.get(&irc_to_lower(nick))
    }

    /// Look up a member by nick for mutation.
    pub fn member_mut(&mut self, nick: &str) -> Option<&mut Member> {
        self.members.get_mut(&irc_to_lower(nick))
    }

    /// Whether `nick` is a member.
    pub fn contains(&self, nick: &str) -> bool {
        self.members.contains_key(&irc_to_lower(nick))
    }

    /// Insert or wholesale replace a member entry.
    pub fn upsert(&mut self, member: Member) -> &Member {
        let key = irc_to_lower(&member.name);
        self.members.insert(key.clone(), member);
        &self.members[&key]
    }

    /// Remove a member, returning its entry.
    pub fn remove(&mut self, nick: &str) -> Option<Member> {
        self.members.remove(&irc_to_lower(nick))
    }

    /// Re-key a member under a new nick, keeping its flags.
    ///
    /// Returns `false` when `old` is not a member.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        match self.members.remove(&irc_to_lower(old)) {
            Some(mut member) => {
                member.name = new.to_string();
                self.members.insert(irc_to_lower(new), member);
                true
            }
            None => false,
        }
    }

    /// Iterate over members in no particular order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the channel has no tracked members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl NamedTarget for Channel {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// All channels tracked on one connection.
#[derive(Clone, Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, Channel>,
}

impl ChannelRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a channel by name.
    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&irc_to_lower(name))
    }

    /// Look up a channel by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&irc_to_lower(name))
    }

    /// Whether `name` is tracked.
    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(&irc_to_lower(name))
    }

    /// Return the channel, creating it if it is not tracked yet.
    pub fn ensure(&mut self, name: &str) -> &mut Channel {
        self.channels
            .entry(irc_to_lower(name))
            .or_insert_with(|| Channel::new(name))
    }

    /// Stop tracking a channel.
    pub fn remove(&mut self, name: &str) -> Option<Channel> {
        self.channels.remove(&irc_to_lower(name))
    }

    /// Names of every channel `nick` is a member of.
    pub fn channels_with(&self, nick: &str) -> Vec<String> {
        let key = irc_to_lower(nick);
        self.channels
            .values()
            .filter(|c| c.members.contains_key(&key))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Remove `nick` from every channel. Returns the affected channel names.
    pub fn remove_member_everywhere(&mut self, nick: &str) -> Vec<String> {
        let key = irc_to_lower(nick);
        self.channels
            .values_mut()
            .filter_map(|c| c.members.remove(&key).map(|_| c.name.clone()))
            .collect()
    }

    /// Rename `old` to `new` in every channel. Returns the affected channel names.
    pub fn rename_member_everywhere(&mut self, old: &str, new: &str) -> Vec<String> {
        self.channels
            .values_mut()
            .filter_map(|c| c.rename(old, new).then(|| c.name.clone()))
            .collect()
    }

    /// Iterate over tracked channels.
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Number of tracked channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel is tracked.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Forget every channel.
    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
