#![forbid(unsafe_code)]

//! Error types.
//!
//! Most malformed requests (undo at the start, jump to an unknown id, delete
//! the root branch, ...) are silent no-ops and never surface here. The only
//! recoverable input error is a blank label. [`InvariantViolation`] describes
//! engine bugs and is reported by
//! [`EditHistory::check_invariants`](crate::EditHistory::check_invariants).

use thiserror::Error;

use crate::ids::{BranchId, EntryId};

/// Which label a caller left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    /// The action label of a pushed entry.
    Action,
    /// The name of a snapshot.
    SnapshotName,
    /// The name of a branch.
    BranchName,
}

impl LabelField {
    /// Human-readable field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::SnapshotName => "snapshot name",
            Self::BranchName => "branch name",
        }
    }
}

/// Errors returned by history operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A required label was empty or whitespace-only.
    #[error("{} must not be empty", .field.as_str())]
    EmptyLabel { field: LabelField },
}

/// Result alias for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;

/// A broken structural invariant. Always an engine bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("history has no branches")]
    NoBranches,
    #[error("root branch {0} is missing")]
    MissingRootBranch(BranchId),
    #[error("active branch {0} does not exist")]
    MissingActiveBranch(BranchId),
    #[error("branch id {0} appears more than once")]
    DuplicateBranchId(BranchId),
    #[error("branch {0} has no entries")]
    EmptyBranch(BranchId),
    #[error("branch {0} has a blank name")]
    BlankBranchName(BranchId),
    #[error("branch {branch} entry {entry} has a blank action or snapshot name")]
    BlankLabel { branch: BranchId, entry: EntryId },
    #[error("branch {branch} cursor {current} is outside 0..{len}")]
    CursorOutOfRange {
        branch: BranchId,
        current: usize,
        len: usize,
    },
    #[error("branch {branch} entry {entry} is older than its predecessor")]
    TimestampRegression { branch: BranchId, entry: EntryId },
}

/// Errors from loading or validating a [`HistoryConfig`](crate::HistoryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a config file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The config text could not be parsed or produced.
    #[error("invalid {format} config: {message}")]
    Format {
        format: &'static str,
        message: String,
    },
    /// One or more fields are out of range.
    #[error("invalid config: {}", .0.join("; "))]
    Validation(Vec<String>),
}
