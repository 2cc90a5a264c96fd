#![forbid(unsafe_code)]

//! The editor-facing history facade.
//!
//! [`EditHistory`] owns every branch of one editing session and exposes the
//! operations an editor calls (push, undo, redo, jump, snapshot, branch
//! management, clear) plus read-only projections of the active branch.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ EditHistory<T>                                               │
//! │  ┌────────────────────────────┐   ┌───────────────────────┐  │
//! │  │ BranchManager              │   │ RetentionPolicy       │  │
//! │  │  main*  [e0, e2, S3]  @2   │   │  max 100, keep snaps  │  │
//! │  │  exp    [e4, e5]      @1   │   └───────────────────────┘  │
//! │  └────────────────────────────┘   ┌───────────────────────┐  │
//! │                                   │ IdGenerator / Clock   │  │
//! │                                   └───────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. The root branch exists and the active branch exists.
//! 2. Every branch has at least one entry and a cursor inside it.
//! 3. After `push`, `create_snapshot` and `create_branch` the active cursor is
//!    on the tip and `can_redo()` is `false`.
//!
//! Debug builds re-check these after every mutating call and panic on a
//! violation. [`check_invariants`](EditHistory::check_invariants) runs the
//! same check on demand.
//!
//! # Error model
//!
//! Requests that cannot apply (undo at the start, redo at the tip, jump to an
//! id outside the active branch, switch to an unknown branch, delete the
//! root) are no-ops that return `false`. Only blank labels are errors.

use chrono::{DateTime, Utc};

use crate::branch::{Branch, EntryPosition, ForkPoint};
use crate::clock::{Clock, SystemClock};
use crate::config::HistoryConfig;
use crate::entry::{HistoryEntry, require_label};
use crate::error::{ConfigError, InvariantViolation, LabelField, Result};
use crate::ids::{BranchId, EntryId, IdGenerator};
use crate::manager::BranchManager;
use crate::retention::{RetentionPolicy, TrimReport};

/// Tracing target for every history event.
pub const LOG_TARGET: &str = "forkline.history";

/// A branching undo/redo history over document states of type `T`.
///
/// The payload is opaque: it is never compared or inspected. Operations that
/// duplicate a state (snapshots, forks, clearing) require `T: Clone` and copy
/// the payload; nothing is shared between branches. Payloads should already
/// be immutable values when pushed.
#[derive(Debug, Clone)]
pub struct EditHistory<T, C = SystemClock> {
    branches: BranchManager<T>,
    ids: IdGenerator,
    retention: RetentionPolicy,
    config: HistoryConfig,
    clock: C,
}

impl<T> EditHistory<T, SystemClock> {
    /// Create a history seeded with `initial`, using the default config.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self::seeded(initial, HistoryConfig::default(), SystemClock)
    }

    /// Create a history seeded with `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when a label in `config` is blank.
    pub fn with_config(
        initial: T,
        config: HistoryConfig,
    ) -> std::result::Result<Self, ConfigError> {
        Self::with_clock(initial, config, SystemClock)
    }
}

impl<T, C: Clock> EditHistory<T, C> {
    /// Create a history seeded with `initial`, reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when a label in `config` is blank.
    pub fn with_clock(
        initial: T,
        config: HistoryConfig,
        clock: C,
    ) -> std::result::Result<Self, ConfigError> {
        let config = config.validated()?;
        Ok(Self::seeded(initial, config, clock))
    }

    /// `config` must already be valid.
    fn seeded(initial: T, config: HistoryConfig, clock: C) -> Self {
        let mut ids = IdGenerator::new();
        let now = clock.now();
        let seed = HistoryEntry::new(
            ids.next_entry(),
            now,
            config.initial_action.clone(),
            initial,
            None,
            BranchId::ROOT,
        );
        let root = Branch::new(
            BranchId::ROOT,
            config.root_branch_name.clone(),
            now,
            seed,
            None,
        );
        tracing::debug!(
            target: LOG_TARGET,
            max_entries = ?config.retention().max_entries(),
            "history created"
        );
        Self {
            branches: BranchManager::new(root),
            ids,
            retention: config.retention(),
            config,
            clock,
        }
    }

    // ====================================================================
    // Recording
    // ====================================================================

    /// Record a new state on the active branch.
    ///
    /// Entries after the cursor (the redo path) are discarded first. The
    /// cursor lands on the new entry, then the retention policy runs.
    pub fn push(&mut self, action: impl Into<String>, data: T) -> Result<EntryId> {
        self.record(action.into(), data, None)
    }

    /// [`push`](Self::push) with a free-text description.
    pub fn push_with_description(
        &mut self,
        action: impl Into<String>,
        data: T,
        description: impl Into<String>,
    ) -> Result<EntryId> {
        self.record(action.into(), data, Some(description.into()))
    }

    pub(crate) fn record(
        &mut self,
        action: String,
        data: T,
        description: Option<String>,
    ) -> Result<EntryId> {
        require_label(&action, LabelField::Action)?;

        let id = self.ids.next_entry();
        let now = self.clock.now();
        let branch_id = self.branches.active_id();
        let retention = self.retention;

        let branch = self.branches.active_mut();
        let discarded = branch.truncate_future();
        let timestamp = branch.next_timestamp(now);
        let entry = HistoryEntry::new(id, timestamp, action, data, description, branch_id);
        let report = branch.append(entry, retention);
        let len = branch.len();

        tracing::debug!(
            target: LOG_TARGET,
            branch = %branch_id,
            entry = %id,
            discarded,
            len,
            "entry pushed"
        );
        log_trim(branch_id, report);
        self.debug_check();
        Ok(id)
    }

    /// Rename a snapshot in the active branch.
    ///
    /// No-op (returns `false`) if the entry is not in the active branch, is
    /// not a snapshot, or `name` is blank.
    pub fn rename_snapshot(&mut self, entry: EntryId, name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        if require_label(name, LabelField::SnapshotName).is_err() {
            return false;
        }
        let renamed = self.branches.active_mut().rename_snapshot(entry, name);
        tracing::debug!(
            target: LOG_TARGET,
            branch = %self.branches.active_id(),
            entry = %entry,
            renamed,
            "snapshot rename"
        );
        renamed
    }

    // ====================================================================
    // Cursor navigation
    // ====================================================================

    /// Step back one entry on the active branch. Returns `false` at the start.
    pub fn undo(&mut self) -> bool {
        let moved = self.branches.active_mut().undo();
        self.trace_cursor("undo", moved);
        moved
    }

    /// Step forward one entry on the active branch. Returns `false` at the tip.
    pub fn redo(&mut self) -> bool {
        let moved = self.branches.active_mut().redo();
        self.trace_cursor("redo", moved);
        moved
    }

    /// Move the cursor to `entry` within the active branch.
    ///
    /// Ids from other branches are not found and leave the cursor alone.
    pub fn jump_to(&mut self, entry: EntryId) -> bool {
        let moved = self.branches.active_mut().jump_to(entry);
        self.trace_cursor("jump", moved);
        moved
    }

    fn trace_cursor(&self, op: &'static str, moved: bool) {
        let branch = self.branches.active();
        tracing::trace!(
            target: LOG_TARGET,
            op,
            moved,
            branch = %branch.id(),
            current = branch.current(),
            len = branch.len(),
            "cursor"
        );
    }

    // ====================================================================
    // Branches
    // ====================================================================

    /// Make `branch` active. Unknown ids are ignored.
    ///
    /// Every branch keeps its own cursor, so switching back later resumes
    /// where that branch was left.
    pub fn switch_branch(&mut self, branch: BranchId) -> bool {
        let switched = self.branches.switch(branch);
        tracing::debug!(target: LOG_TARGET, branch = %branch, switched, "branch switch");
        switched
    }

    /// Delete a non-root branch.
    ///
    /// The root branch and unknown ids are ignored. Deleting the active
    /// branch makes the root active.
    pub fn delete_branch(&mut self, branch: BranchId) -> bool {
        let removed = self.branches.remove(branch);
        tracing::debug!(
            target: LOG_TARGET,
            branch = %branch,
            deleted = removed.is_some(),
            active = %self.branches.active_id(),
            "branch delete"
        );
        self.debug_check();
        removed.is_some()
    }

    // ====================================================================
    // Projections
    // ====================================================================

    /// The payload the editor should currently show.
    #[must_use]
    pub fn current_data(&self) -> &T {
        self.current_entry().data()
    }

    /// The entry under the active branch's cursor.
    #[must_use]
    pub fn current_entry(&self) -> &HistoryEntry<T> {
        self.active_branch().current_entry()
    }

    #[must_use]
    pub fn active_branch(&self) -> &Branch<T> {
        self.branches.active()
    }

    #[must_use]
    pub fn active_branch_id(&self) -> BranchId {
        self.branches.active_id()
    }

    /// Id of the protected root branch.
    #[must_use]
    pub fn root_branch_id(&self) -> BranchId {
        BranchId::ROOT
    }

    #[must_use]
    pub fn branch(&self, id: BranchId) -> Option<&Branch<T>> {
        self.branches.get(id)
    }

    /// All branches in creation order.
    #[must_use]
    pub fn branches(&self) -> &[Branch<T>] {
        self.branches.branches()
    }

    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Snapshot entries of the active branch, in entry order.
    pub fn snapshots(&self) -> impl Iterator<Item = &HistoryEntry<T>> {
        self.active_branch().snapshots()
    }

    /// Active branch entries with their position relative to the cursor.
    pub fn timeline(&self) -> impl Iterator<Item = (EntryPosition, &HistoryEntry<T>)> {
        self.active_branch().timeline()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.active_branch().can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.active_branch().can_redo()
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    #[must_use]
    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Change the entry cap (0 = unlimited). Takes effect on the next append.
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.config.max_entries = max_entries;
        self.retention = self.config.retention();
    }

    /// The current time according to this history's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ====================================================================
    // Invariants
    // ====================================================================

    /// Verify every structural invariant.
    ///
    /// A violation is always an engine bug; valid inputs never produce one.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        self.branches.check()
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.check_invariants(), Ok(()), "history invariant violated");
    }
}

impl<T: Clone, C: Clock> EditHistory<T, C> {
    /// Append a named checkpoint duplicating the current entry's payload.
    ///
    /// The snapshot goes at the tip (the redo path is kept), the cursor
    /// moves to it, and the retention policy runs. Snapshots are never
    /// dropped by retention.
    pub fn create_snapshot(&mut self, name: impl Into<String>) -> Result<EntryId> {
        let name = name.into();
        require_label(&name, LabelField::SnapshotName)?;

        let id = self.ids.next_entry();
        let now = self.clock.now();
        let branch_id = self.branches.active_id();
        let retention = self.retention;

        let branch = self.branches.active_mut();
        let timestamp = branch.next_timestamp(now);
        let entry = branch
            .current_entry()
            .snapshot_of(id, timestamp, &name, branch_id);
        let report = branch.append(entry, retention);

        tracing::debug!(
            target: LOG_TARGET,
            branch = %branch_id,
            entry = %id,
            name = %name,
            "snapshot created"
        );
        log_trim(branch_id, report);
        self.debug_check();
        Ok(id)
    }

    /// Fork the active branch at its current entry and activate the fork.
    ///
    /// The new branch starts with one entry copying the current entry's
    /// payload. The parent branch is not modified.
    pub fn create_branch(&mut self, name: impl Into<String>) -> Result<BranchId> {
        let name = name.into();
        require_label(&name, LabelField::BranchName)?;

        let branch_id = self.ids.next_branch();
        let entry_id = self.ids.next_entry();
        let now = self.clock.now();

        let parent = self.branches.active();
        let source = parent.current_entry();
        let fork = ForkPoint {
            branch: parent.id(),
            entry: source.id(),
        };
        let seed = source.fork_seed(entry_id, now, parent.name(), branch_id);
        let branch = Branch::new(branch_id, name, now, seed, Some(fork));
        self.branches.insert_active(branch);

        tracing::debug!(
            target: LOG_TARGET,
            branch = %branch_id,
            parent = %fork.branch,
            parent_entry = %fork.entry,
            "branch created"
        );
        self.debug_check();
        Ok(branch_id)
    }

    /// Collapse the active branch to a single copy of its current entry.
    ///
    /// Other branches are untouched.
    pub fn clear_history(&mut self) {
        let id = self.ids.next_entry();
        let branch_id = self.branches.active_id();
        let branch = self.branches.active_mut();
        let dropped = branch.len() - 1;
        branch.collapse_to_current(id);

        tracing::debug!(
            target: LOG_TARGET,
            branch = %branch_id,
            entry = %id,
            dropped,
            "history cleared"
        );
        self.debug_check();
    }
}

fn log_trim(branch: BranchId, report: TrimReport) {
    if report.is_noop() {
        return;
    }
    tracing::info!(
        target: LOG_TARGET,
        branch = %branch,
        dropped = report.dropped,
        preserved_snapshots = report.preserved_snapshots,
        "retention trimmed branch"
    );
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize, C> serde::Serialize for EditHistory<T, C> {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("EditHistory", 3)?;
        state.serialize_field("active_branch", &self.branches.active_id())?;
        state.serialize_field("max_entries", &self.retention.max_entries())?;
        state.serialize_field("branches", self.branches.branches())?;
        state.end()
    }
}
