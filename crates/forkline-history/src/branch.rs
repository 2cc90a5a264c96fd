#![forbid(unsafe_code)]

//! Branches and the cursor that navigates them.
//!
//! A [`Branch`] is an ordered, never-empty list of entries plus a cursor
//! (`current`) pointing at the entry the editor currently shows. Each branch
//! keeps its own cursor, so switching away and back resumes exactly where the
//! branch was left.
//!
//! ```text
//!            undo()        redo()
//!              ◄─────┐   ┌─────►
//! entries: [e0, e1, e2, e3, e4]
//!                   ▲
//!                current = 2     canUndo = true, canRedo = true
//! ```
//!
//! # Invariants
//!
//! 1. `entries` is never empty.
//! 2. `current < entries.len()`.
//! 3. Entry timestamps are non-decreasing in list order.
//! 4. The name, every action and every snapshot name are non-blank.
//!
//! With the `serde` feature a branch can be deserialized. The result is
//! checked against these invariants and rejected if any fails.

use chrono::{DateTime, Utc};

use crate::entry::HistoryEntry;
use crate::error::InvariantViolation;
use crate::ids::{BranchId, EntryId};
use crate::retention::{RetentionPolicy, TrimReport};

/// Where a forked branch came from. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForkPoint {
    /// The branch that was active when the fork happened.
    pub branch: BranchId,
    /// The entry of that branch the fork copied.
    pub entry: EntryId,
}

/// An entry's place relative to the branch cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPosition {
    /// Reachable with undo.
    Past,
    /// What the editor currently shows.
    Current,
    /// Reachable with redo; discarded by the next push.
    Future,
}

/// An independently-cursored timeline of entries.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "RawBranch<T>",
        bound(deserialize = "T: serde::Deserialize<'de>")
    )
)]
pub struct Branch<T> {
    id: BranchId,
    name: String,
    created_at: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    parent: Option<ForkPoint>,
    entries: Vec<HistoryEntry<T>>,
    current: usize,
}

/// Unchecked wire form of a [`Branch`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawBranch<T> {
    id: BranchId,
    name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    parent: Option<ForkPoint>,
    entries: Vec<HistoryEntry<T>>,
    current: usize,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawBranch<T>> for Branch<T> {
    type Error = InvariantViolation;

    fn try_from(raw: RawBranch<T>) -> Result<Self, Self::Error> {
        let branch = Self {
            id: raw.id,
            name: raw.name,
            created_at: raw.created_at,
            parent: raw.parent,
            entries: raw.entries,
            current: raw.current,
        };
        branch.check()?;
        Ok(branch)
    }
}

impl<T> Branch<T> {
    pub(crate) fn new(
        id: BranchId,
        name: String,
        created_at: DateTime<Utc>,
        seed: HistoryEntry<T>,
        parent: Option<ForkPoint>,
    ) -> Self {
        Self {
            id,
            name,
            created_at,
            parent,
            entries: vec![seed],
            current: 0,
        }
    }

    // ====================================================================
    // Metadata
    // ====================================================================

    #[must_use]
    pub fn id(&self) -> BranchId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The fork point, for branches created by forking.
    #[must_use]
    pub fn fork_point(&self) -> Option<ForkPoint> {
        self.parent
    }

    /// Id of the branch this one was forked from.
    #[must_use]
    pub fn parent_id(&self) -> Option<BranchId> {
        self.parent.map(|p| p.branch)
    }

    /// Id of the parent entry this branch was seeded from.
    #[must_use]
    pub fn parent_entry_id(&self) -> Option<EntryId> {
        self.parent.map(|p| p.entry)
    }

    // ====================================================================
    // Entries
    // ====================================================================

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry<T>] {
        &self.entries
    }

    /// Number of entries (always at least 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor index into [`entries`](Self::entries).
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// The entry under the cursor.
    #[must_use]
    pub fn current_entry(&self) -> &HistoryEntry<T> {
        &self.entries[self.current]
    }

    /// Index of the entry with `id`, if it belongs to this branch.
    #[must_use]
    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// The entry with `id`, if it belongs to this branch.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&HistoryEntry<T>> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Snapshot entries, in entry order.
    pub fn snapshots(&self) -> impl Iterator<Item = &HistoryEntry<T>> {
        self.entries.iter().filter(|e| e.is_snapshot())
    }

    /// Classify the entry at `index` relative to the cursor.
    #[must_use]
    pub fn position_of(&self, index: usize) -> EntryPosition {
        use std::cmp::Ordering;
        match index.cmp(&self.current) {
            Ordering::Less => EntryPosition::Past,
            Ordering::Equal => EntryPosition::Current,
            Ordering::Greater => EntryPosition::Future,
        }
    }

    /// Entries paired with their position relative to the cursor.
    pub fn timeline(&self) -> impl Iterator<Item = (EntryPosition, &HistoryEntry<T>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (self.position_of(index), entry))
    }

    // ====================================================================
    // Cursor navigation
    // ====================================================================

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// Step the cursor back one entry. Returns `false` at the start.
    pub(crate) fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Step the cursor forward one entry. Returns `false` at the tip.
    pub(crate) fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Put the cursor on `id`. Returns `false` if the entry is not here.
    pub(crate) fn jump_to(&mut self, id: EntryId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    // ====================================================================
    // Mutation
    // ====================================================================

    /// Clamp `now` so a new entry is never older than the tip.
    pub(crate) fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.entries
            .last()
            .map_or(now, |tip| now.max(tip.timestamp()))
    }

    /// Discard every entry after the cursor. Returns how many were removed.
    pub(crate) fn truncate_future(&mut self) -> usize {
        let removed = self.entries.len() - (self.current + 1);
        self.entries.truncate(self.current + 1);
        removed
    }

    /// Append at the tip, apply `retention`, and move the cursor to the tip.
    pub(crate) fn append(
        &mut self,
        entry: HistoryEntry<T>,
        retention: RetentionPolicy,
    ) -> TrimReport {
        self.entries.push(entry);
        let report = retention.apply(&mut self.entries);
        self.current = self.entries.len() - 1;
        report
    }

    pub(crate) fn rename_snapshot(&mut self, id: EntryId, name: &str) -> bool {
        self.entries
            .iter_mut()
            .find(|e| e.id() == id)
            .is_some_and(|e| e.rename_snapshot(name))
    }

    /// Structural self-check.
    pub(crate) fn check(&self) -> Result<(), InvariantViolation> {
        if self.entries.is_empty() {
            return Err(InvariantViolation::EmptyBranch(self.id));
        }
        if self.name.trim().is_empty() {
            return Err(InvariantViolation::BlankBranchName(self.id));
        }
        if self.current >= self.entries.len() {
            return Err(InvariantViolation::CursorOutOfRange {
                branch: self.id,
                current: self.current,
                len: self.entries.len(),
            });
        }
        if let Some(entry) = self.entries.iter().find(|e| {
            e.action().trim().is_empty() || e.snapshot_name().is_some_and(|n| n.trim().is_empty())
        }) {
            return Err(InvariantViolation::BlankLabel {
                branch: self.id,
                entry: entry.id(),
            });
        }
        if let Some(pair) = self
            .entries
            .windows(2)
            .find(|pair| pair[1].timestamp() < pair[0].timestamp())
        {
            return Err(InvariantViolation::TimestampRegression {
                branch: self.id,
                entry: pair[1].id(),
            });
        }
        Ok(())
    }
}

impl<T: Clone> Branch<T> {
    /// Collapse to a single copy of the current entry under `id`.
    pub(crate) fn collapse_to_current(&mut self, id: EntryId) {
        let survivor = self.current_entry().duplicate(id);
        self.entries = vec![survivor];
        self.current = 0;
    }
}
