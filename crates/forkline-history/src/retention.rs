#![forbid(unsafe_code)]

//! Retention policy: bounded per-branch history that never drops snapshots.
//!
//! After every append the active branch is trimmed to its most recent
//! `max` entries. Snapshot entries older than that window are kept,
//! in their original order, ahead of the window:
//!
//! ```text
//! max = 3, S = snapshot
//!
//! before: [e0, S1, e2, e3, S4, e5, e6, e7]
//!                              └─ window ─┘
//! after:  [S1, S4, e5, e6, e7]
//! ```
//!
//! The trimmed branch may therefore hold more than `max` entries when many
//! snapshots predate the window. Ordinary entries outside the window are
//! gone for good.

use std::num::NonZeroUsize;

use crate::entry::HistoryEntry;

/// Per-branch entry cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Keep every entry.
    #[default]
    Unbounded,
    /// Keep the last this-many entries of any kind, plus every older snapshot.
    Bounded(NonZeroUsize),
}

impl RetentionPolicy {
    /// Build a policy from an optional cap.
    ///
    /// `None` and `Some(0)` both mean "no cap".
    #[must_use]
    pub fn from_max_entries(max_entries: Option<usize>) -> Self {
        max_entries
            .and_then(NonZeroUsize::new)
            .map_or(Self::Unbounded, Self::Bounded)
    }

    /// The cap, if any.
    #[must_use]
    pub fn max_entries(self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Bounded(max) => Some(max.get()),
        }
    }

    /// Trim `entries` in place.
    ///
    /// Keeps the last `max` entries plus every older snapshot. The caller
    /// is responsible for moving the cursor to the new tip.
    pub fn apply<T>(self, entries: &mut Vec<HistoryEntry<T>>) -> TrimReport {
        let Self::Bounded(max) = self else {
            return TrimReport::default();
        };
        let len = entries.len();
        if len <= max.get() {
            return TrimReport::default();
        }

        let window_start = len - max.get();
        let mut report = TrimReport::default();
        let mut index = 0;
        entries.retain(|entry| {
            let in_window = index >= window_start;
            index += 1;
            if in_window {
                true
            } else if entry.is_snapshot() {
                report.preserved_snapshots += 1;
                true
            } else {
                report.dropped += 1;
                false
            }
        });
        report
    }
}

/// What a retention pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimReport {
    /// Ordinary entries removed.
    pub dropped: usize,
    /// Snapshots older than the window that were kept.
    pub preserved_snapshots: usize,
}

impl TrimReport {
    /// Whether nothing was removed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.dropped == 0
    }
}
