#![forbid(unsafe_code)]

//! Immutable history entries.
//!
//! An entry records one state transition: the payload the editor saw after
//! it, plus a label and timestamp. Once appended to a branch an entry is
//! never mutated, with one exception: a snapshot's name (and the action
//! label derived from it) can be changed by
//! [`EditHistory::rename_snapshot`](crate::EditHistory::rename_snapshot).
//!
//! Entries are never shared between branches. Operations that need "the same
//! state again" (snapshots, forks, clearing history) clone the payload into a
//! new entry with a fresh id.

use chrono::{DateTime, Utc};

use crate::error::{HistoryError, LabelField, Result};
use crate::ids::{BranchId, EntryId};

/// One recorded state of the document.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry<T> {
    id: EntryId,
    timestamp: DateTime<Utc>,
    action: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    description: Option<String>,
    data: T,
    /// Snapshot name; `Some` iff this entry is a snapshot.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    snapshot: Option<String>,
    origin: BranchId,
}

impl<T> HistoryEntry<T> {
    pub(crate) fn new(
        id: EntryId,
        timestamp: DateTime<Utc>,
        action: String,
        data: T,
        description: Option<String>,
        origin: BranchId,
    ) -> Self {
        Self {
            id,
            timestamp,
            action,
            description,
            data,
            snapshot: None,
            origin,
        }
    }

    /// Unique id of this entry.
    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// When the entry was created.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Short label of the transition that produced this entry.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Optional free-text elaboration.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The document state at this point.
    #[must_use]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consume the entry, returning its payload.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }

    /// Whether this entry is a named snapshot.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The snapshot name, if this entry is a snapshot.
    #[must_use]
    pub fn snapshot_name(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// The branch this entry was created under.
    #[must_use]
    pub fn origin(&self) -> BranchId {
        self.origin
    }

    /// Rename a snapshot entry. Returns `false` for ordinary entries.
    pub(crate) fn rename_snapshot(&mut self, name: &str) -> bool {
        if self.snapshot.is_none() {
            return false;
        }
        self.action = snapshot_action(name);
        self.snapshot = Some(name.to_owned());
        true
    }
}

impl<T: Clone> HistoryEntry<T> {
    /// Copy this entry under a fresh id, keeping everything else.
    pub(crate) fn duplicate(&self, id: EntryId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// A new snapshot entry carrying this entry's payload and description.
    pub(crate) fn snapshot_of(
        &self,
        id: EntryId,
        timestamp: DateTime<Utc>,
        name: &str,
        origin: BranchId,
    ) -> Self {
        Self {
            id,
            timestamp,
            action: snapshot_action(name),
            description: self.description.clone(),
            data: self.data.clone(),
            snapshot: Some(name.to_owned()),
            origin,
        }
    }

    /// The seed entry of a branch forked from this entry.
    ///
    /// Keeps the description and any snapshot marking of the source.
    pub(crate) fn fork_seed(
        &self,
        id: EntryId,
        timestamp: DateTime<Utc>,
        parent_name: &str,
        origin: BranchId,
    ) -> Self {
        Self {
            id,
            timestamp,
            action: format!("Branched from {parent_name}"),
            description: self.description.clone(),
            data: self.data.clone(),
            snapshot: self.snapshot.clone(),
            origin,
        }
    }
}

/// Action label given to snapshot entries.
#[must_use]
pub fn snapshot_action(name: &str) -> String {
    format!("Snapshot: {name}")
}

/// Reject empty or whitespace-only labels.
pub(crate) fn require_label(value: &str, field: LabelField) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HistoryError::EmptyLabel { field });
    }
    Ok(())
}
