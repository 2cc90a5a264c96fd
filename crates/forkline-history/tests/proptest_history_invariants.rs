#![forbid(unsafe_code)]

//! Property tests for [`EditHistory`] invariants.
//!
//! Validates:
//! - Random op sequences never break the structural invariants.
//! - Linear push/undo/redo matches a plain vector-and-cursor model.
//! - Retention never keeps more than `max` ordinary entries per branch.
//! - Snapshots survive retention for as long as nothing discards them.
//! - Entry ids are unique across all branches.
//! - Branch switching preserves every branch's cursor.

use std::collections::HashSet;

use proptest::prelude::*;

use forkline_history::{
    BranchId, EditHistory, EntryId, HistoryConfig, HistoryOp, ManualClock,
};

// ============================================================================
// Strategy helpers
// ============================================================================

/// Operations driven against the history. Indices are resolved against the
/// live history at apply time so they always have a chance to hit.
#[derive(Debug, Clone)]
enum Op {
    Push(u16),
    Undo,
    Redo,
    Jump(usize),
    Snapshot,
    Rename(usize),
    Branch,
    Switch(usize),
    Delete(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => any::<u16>().prop_map(Op::Push),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
        1 => any::<usize>().prop_map(Op::Jump),
        2 => Just(Op::Snapshot),
        1 => any::<usize>().prop_map(Op::Rename),
        1 => Just(Op::Branch),
        1 => any::<usize>().prop_map(Op::Switch),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => Just(Op::Clear),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

type History = EditHistory<u16, ManualClock>;

fn history(max_entries: usize) -> History {
    EditHistory::with_clock(
        0,
        HistoryConfig::new(max_entries),
        ManualClock::from_millis(1_700_000_000_000),
    )
    .unwrap()
}

fn pick_entry(history: &History, index: usize) -> EntryId {
    let entries = history.active_branch().entries();
    entries[index % entries.len()].id()
}

fn pick_branch(history: &History, index: usize) -> BranchId {
    let branches = history.branches();
    branches[index % branches.len()].id()
}

fn apply(history: &mut History, op: &Op, step: usize) {
    let op = match *op {
        Op::Push(v) => HistoryOp::push(format!("edit {step}"), v),
        Op::Undo => HistoryOp::Undo,
        Op::Redo => HistoryOp::Redo,
        Op::Jump(i) => HistoryOp::JumpTo {
            entry: pick_entry(history, i),
        },
        Op::Snapshot => HistoryOp::CreateSnapshot {
            name: format!("snap {step}"),
        },
        Op::Rename(i) => HistoryOp::RenameSnapshot {
            entry: pick_entry(history, i),
            name: format!("renamed {step}"),
        },
        Op::Branch => HistoryOp::CreateBranch {
            name: format!("branch {step}"),
        },
        Op::Switch(i) => HistoryOp::SwitchBranch {
            branch: pick_branch(history, i),
        },
        Op::Delete(i) => HistoryOp::DeleteBranch {
            branch: pick_branch(history, i),
        },
        Op::Clear => HistoryOp::ClearHistory,
    };
    history.apply(op).unwrap();
}

// ============================================================================
// Invariant 1: Structural invariants hold after every operation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn structure_survives_random_sequences(
        ops in ops_strategy(80),
        max_entries in 0usize..8,
    ) {
        let mut history = history(max_entries);
        for (step, op) in ops.iter().enumerate() {
            apply(&mut history, op, step);

            prop_assert!(history.check_invariants().is_ok());
            prop_assert!(history.branch(BranchId::ROOT).is_some());
            let branch = history.active_branch();
            prop_assert!(branch.current() < branch.len());
            prop_assert_eq!(history.can_undo(), branch.current() > 0);
            prop_assert_eq!(history.can_redo(), branch.current() + 1 < branch.len());

            if matches!(op, Op::Push(_) | Op::Snapshot | Op::Branch) {
                prop_assert!(!history.can_redo());
            }
        }
    }
}

// ============================================================================
// Invariant 2: Linear navigation matches a vector model
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn linear_history_matches_model(ops in ops_strategy(60)) {
        let mut history = history(0);
        let mut model: Vec<u16> = vec![0];
        let mut cursor = 0usize;

        for (step, op) in ops.iter().enumerate() {
            match *op {
                Op::Push(v) => {
                    history.push(format!("edit {step}"), v).unwrap();
                    model.truncate(cursor + 1);
                    model.push(v);
                    cursor = model.len() - 1;
                }
                Op::Undo => {
                    let moved = history.undo();
                    prop_assert_eq!(moved, cursor > 0);
                    cursor = cursor.saturating_sub(1);
                }
                Op::Redo => {
                    let moved = history.redo();
                    prop_assert_eq!(moved, cursor + 1 < model.len());
                    if moved {
                        cursor += 1;
                    }
                }
                _ => continue,
            }
            prop_assert_eq!(*history.current_data(), model[cursor]);
            prop_assert_eq!(history.active_branch().len(), model.len());
        }
    }
}

// ============================================================================
// Invariant 3: Retention bounds ordinary entries
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn retention_bounds_ordinary_entries(
        ops in ops_strategy(100),
        max_entries in 1usize..6,
    ) {
        let mut history = history(max_entries);
        for (step, op) in ops.iter().enumerate() {
            apply(&mut history, op, step);
            for branch in history.branches() {
                let ordinary = branch.entries().iter().filter(|e| !e.is_snapshot()).count();
                prop_assert!(
                    ordinary <= max_entries,
                    "branch {} holds {} ordinary entries, cap {}",
                    branch.id(),
                    ordinary,
                    max_entries
                );
            }
        }
    }

    #[test]
    fn snapshots_survive_retention(
        values in prop::collection::vec(any::<u16>(), 1..60),
        snapshot_every in 2usize..7,
        max_entries in 1usize..5,
    ) {
        let mut history = history(max_entries);
        let mut snapshots = Vec::new();
        for (step, v) in values.iter().enumerate() {
            history.push(format!("edit {step}"), *v).unwrap();
            if step % snapshot_every == 0 {
                snapshots.push(history.create_snapshot(format!("snap {step}")).unwrap());
            }
        }
        let kept: Vec<EntryId> = history.snapshots().map(|e| e.id()).collect();
        prop_assert_eq!(kept, snapshots);
        prop_assert!(!history.can_redo());
    }
}

// ============================================================================
// Invariant 4: Ids are unique and branch cursors are independent
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn entry_ids_are_unique_across_branches(ops in ops_strategy(80)) {
        let mut history = history(0);
        for (step, op) in ops.iter().enumerate() {
            apply(&mut history, op, step);
        }
        let mut seen = HashSet::new();
        for branch in history.branches() {
            for entry in branch.entries() {
                prop_assert!(seen.insert(entry.id()), "duplicate id {}", entry.id());
            }
        }
    }

    #[test]
    fn switching_preserves_cursors(ops in ops_strategy(80)) {
        let mut history = history(0);
        for (step, op) in ops.iter().enumerate() {
            apply(&mut history, op, step);
        }
        let before: Vec<(BranchId, EntryId)> = history
            .branches()
            .iter()
            .map(|b| (b.id(), b.current_entry().id()))
            .collect();

        for (id, _) in &before {
            prop_assert!(history.switch_branch(*id));
        }
        for (id, current) in &before {
            history.switch_branch(*id);
            prop_assert_eq!(history.current_entry().id(), *current);
        }
    }
}
