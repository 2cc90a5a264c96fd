#![forbid(unsafe_code)]

//! Operations as data.
//!
//! [`HistoryOp`] names every mutating call on [`EditHistory`] so a session
//! can be recorded, serialized (with the `serde` feature) and replayed.
//! Replaying the same ops against a history built with the same config and
//! clock produces the same ids and the same structure.

use crate::clock::Clock;
use crate::error::Result;
use crate::history::EditHistory;
use crate::ids::{BranchId, EntryId};

/// One mutating history operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum HistoryOp<T> {
    Push {
        action: String,
        data: T,
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        description: Option<String>,
    },
    Undo,
    Redo,
    JumpTo {
        entry: EntryId,
    },
    CreateSnapshot {
        name: String,
    },
    RenameSnapshot {
        entry: EntryId,
        name: String,
    },
    CreateBranch {
        name: String,
    },
    SwitchBranch {
        branch: BranchId,
    },
    DeleteBranch {
        branch: BranchId,
    },
    ClearHistory,
}

impl<T> HistoryOp<T> {
    /// A push without description.
    pub fn push(action: impl Into<String>, data: T) -> Self {
        Self::Push {
            action: action.into(),
            data,
            description: None,
        }
    }

    /// Stable snake_case name, used in logs and script output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Push { .. } => "push",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::JumpTo { .. } => "jump_to",
            Self::CreateSnapshot { .. } => "create_snapshot",
            Self::RenameSnapshot { .. } => "rename_snapshot",
            Self::CreateBranch { .. } => "create_branch",
            Self::SwitchBranch { .. } => "switch_branch",
            Self::DeleteBranch { .. } => "delete_branch",
            Self::ClearHistory => "clear_history",
        }
    }
}

/// What applying a [`HistoryOp`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", content = "id", rename_all = "snake_case"))]
pub enum OpOutcome {
    /// A new entry was appended.
    Entry(EntryId),
    /// A new branch was created and activated.
    Branch(BranchId),
    /// State changed without creating an entry or branch.
    Changed,
    /// The request did not apply; nothing changed.
    NoOp,
}

impl OpOutcome {
    fn from_flag(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::NoOp }
    }

    /// Whether the operation had no effect.
    #[must_use]
    pub fn is_noop(self) -> bool {
        self == Self::NoOp
    }
}

impl<T: Clone, C: Clock> EditHistory<T, C> {
    /// Apply one operation.
    ///
    /// Errors only on blank labels, exactly like the direct calls. A failed
    /// op leaves the history unchanged.
    pub fn apply(&mut self, op: HistoryOp<T>) -> Result<OpOutcome> {
        let outcome = match op {
            HistoryOp::Push {
                action,
                data,
                description,
            } => OpOutcome::Entry(self.record(action, data, description)?),
            HistoryOp::Undo => OpOutcome::from_flag(self.undo()),
            HistoryOp::Redo => OpOutcome::from_flag(self.redo()),
            HistoryOp::JumpTo { entry } => OpOutcome::from_flag(self.jump_to(entry)),
            HistoryOp::CreateSnapshot { name } => OpOutcome::Entry(self.create_snapshot(name)?),
            HistoryOp::RenameSnapshot { entry, name } => {
                OpOutcome::from_flag(self.rename_snapshot(entry, name))
            }
            HistoryOp::CreateBranch { name } => OpOutcome::Branch(self.create_branch(name)?),
            HistoryOp::SwitchBranch { branch } => OpOutcome::from_flag(self.switch_branch(branch)),
            HistoryOp::DeleteBranch { branch } => OpOutcome::from_flag(self.delete_branch(branch)),
            HistoryOp::ClearHistory => {
                self.clear_history();
                OpOutcome::Changed
            }
        };
        Ok(outcome)
    }

    /// Apply `ops` in order, stopping at the first error.
    pub fn replay(&mut self, ops: impl IntoIterator<Item = HistoryOp<T>>) -> Result<Vec<OpOutcome>> {
        ops.into_iter().map(|op| self.apply(op)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::HistoryConfig;
    use crate::error::{HistoryError, LabelField};

    fn history() -> EditHistory<i32, ManualClock> {
        EditHistory::with_clock(0, HistoryConfig::unlimited(), ManualClock::from_millis(0)).unwrap()
    }

    #[test]
    fn apply_reports_outcomes() {
        let mut history = history();
        let pushed = history.apply(HistoryOp::push("one", 1)).unwrap();
        let OpOutcome::Entry(entry) = pushed else {
            panic!("expected entry outcome, got {pushed:?}");
        };
        assert_eq!(history.current_entry().id(), entry);

        assert_eq!(history.apply(HistoryOp::Undo).unwrap(), OpOutcome::Changed);
        assert_eq!(history.apply(HistoryOp::Undo).unwrap(), OpOutcome::NoOp);
        assert_eq!(
            history.apply(HistoryOp::JumpTo { entry }).unwrap(),
            OpOutcome::Changed
        );
        assert!(history.apply(HistoryOp::Redo).unwrap().is_noop());
    }

    #[test]
    fn branch_ops_round_through_apply() {
        let mut history = history();
        let outcome = history
            .apply(HistoryOp::CreateBranch { name: "alt".into() })
            .unwrap();
        let OpOutcome::Branch(branch) = outcome else {
            panic!("expected branch outcome, got {outcome:?}");
        };
        assert_eq!(
            history
                .apply(HistoryOp::SwitchBranch {
                    branch: BranchId::ROOT
                })
                .unwrap(),
            OpOutcome::Changed
        );
        assert_eq!(
            history.apply(HistoryOp::DeleteBranch { branch }).unwrap(),
            OpOutcome::Changed
        );
        assert_eq!(
            history.apply(HistoryOp::DeleteBranch { branch }).unwrap(),
            OpOutcome::NoOp
        );
    }

    #[test]
    fn failed_op_leaves_history_unchanged() {
        let mut history = history();
        history.apply(HistoryOp::push("one", 1)).unwrap();
        let err = history
            .apply(HistoryOp::CreateSnapshot { name: " ".into() })
            .unwrap_err();
        assert_eq!(
            err,
            HistoryError::EmptyLabel {
                field: LabelField::SnapshotName
            }
        );
        assert_eq!(history.active_branch().len(), 2);
    }

    #[test]
    fn replay_is_deterministic() {
        let ops = vec![
            HistoryOp::push("a", 1),
            HistoryOp::push("b", 2),
            HistoryOp::Undo,
            HistoryOp::CreateSnapshot { name: "s".into() },
            HistoryOp::CreateBranch { name: "x".into() },
            HistoryOp::push("c", 3),
            HistoryOp::ClearHistory,
        ];
        let mut first = history();
        let mut second = history();
        let a = first.replay(ops.clone()).unwrap();
        let b = second.replay(ops).unwrap();
        assert_eq!(a, b);
        assert_eq!(first.current_entry().id(), second.current_entry().id());
        assert_eq!(*first.current_data(), 3);
    }

    #[test]
    fn replay_stops_at_first_error() {
        let mut history = history();
        let result = history.replay(vec![
            HistoryOp::push("a", 1),
            HistoryOp::push("", 2),
            HistoryOp::push("c", 3),
        ]);
        assert!(result.is_err());
        assert_eq!(*history.current_data(), 1);
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(HistoryOp::<()>::ClearHistory.name(), "clear_history");
        assert_eq!(HistoryOp::push("x", ()).name(), "push");
    }
}
