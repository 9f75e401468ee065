//! Subject to tag ignore table.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::casemap::irc_to_lower;

/// Maps a subject (nick or channel name) to the listener tags suppressed
/// for it.
///
/// Shared by every connection of a bot. Subjects are compared with IRC
/// case mapping; tags are compared exactly.
#[derive(Debug, Default)]
pub struct IgnoreTable {
    entries: RwLock<HashMap<String, HashSet<String>>>,
}

impl IgnoreTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress listeners tagged `tag` for events from or in `subject`.
    ///
    /// Returns `false` if the entry already existed.
    pub fn add(&self, subject: &str, tag: &str) -> bool {
        self.entries
            .write()
            .entry(irc_to_lower(subject))
            .or_default()
            .insert(tag.to_string())
    }

    /// Lift one ignore entry. Returns `false` if it was not present.
    pub fn remove(&self, subject: &str, tag: &str) -> bool {
        let key = irc_to_lower(subject);
        let mut entries = self.entries.write();
        let Some(tags) = entries.get_mut(&key) else {
            return false;
        };
        let removed = tags.remove(tag);
        if tags.is_empty() {
            entries.remove(&key);
        }
        removed
    }

    /// Lift every ignore entry for `subject`.
    pub fn clear(&self, subject: &str) -> bool {
        self.entries.write().remove(&irc_to_lower(subject)).is_some()
    }

    /// Drop the whole table.
    pub fn clear_all(&self) {
        self.entries.write().clear();
    }

    /// Whether `tag` is ignored for `subject`.
    pub fn is_ignored(&self, subject: &str, tag: &str) -> bool {
        self.entries
            .read()
            .get(&irc_to_lower(subject))
            .is_some_and(|tags| tags.contains(tag))
    }

    /// Whether `tag` is ignored for any of `subjects`.
    pub fn any_ignored<'a, I>(&self, subjects: I, tag: &str) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entries = self.entries.read();
        if entries.is_empty() {
            return false;
        }
        subjects.into_iter().any(|subject| {
            entries
                .get(&irc_to_lower(subject))
                .is_some_and(|tags| tags.contains(tag))
        })
    }

    /// Tags currently ignored for `subject`, sorted.
    pub fn tags(&self, subject: &str) -> Vec<String> {
        let mut tags: Vec<String> = self
            .entries
            .read()
            .get(&irc_to_lower(subject))
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default();
        tags.sort();
        tags
    }

    /// Whether no entry exists.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
