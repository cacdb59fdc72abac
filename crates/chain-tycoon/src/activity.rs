//! Bounded feed of human-readable activity messages.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// Default number of entries kept by an [`ActivityLog`].
pub const DEFAULT_LOG_CAPACITY: usize = 40;

/// Topic of an [`LogEntry`], used by the presentation layer for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tokens,
    Consensus,
    Contract,
    Education,
}

/// Unique identifier of a [`LogEntry`] within one game.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub timestamp: Timestamp,
    pub category: Category,
    pub message: String,
}

/// Ring buffer of the most recent log entries, newest first.
///
/// # Invariants
///
/// `len() <= capacity()` and `latest()` is always the most recently
/// pushed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl ActivityLog {
    /// Creates an empty log holding at most `capacity` entries.
    ///
    /// ## Panics
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "activity log capacity must be greater than 0");

        ActivityLog {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Adds a new entry at the front, evicting the oldest entry if the log is
    /// full. Returns the ID of the new entry.
    pub fn push<M>(
        &mut self,
        timestamp: Timestamp,
        category: Category,
        message: M,
    ) -> EntryId
    where
        M: Into<String>,
    {
        let id = EntryId(self.next_id);
        self.next_id += 1;

        self.entries.push_front(LogEntry {
            id,
            timestamp,
            category,
            message: message.into(),
        });
        self.entries.truncate(self.capacity);

        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the newest entry, if any.
    #[inline]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Iterates from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Returns the entry at position `index`, where 0 is the newest.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}
