//! Plain-text rendering of replay progress and the final history.
//!
//! ```text
//! * b0 Main (3 entries, cursor 2)
//!       e0  Initial state = ""                      Just now
//!       e2  type = "C"                              Just now
//!     > e3  Snapshot: checkpoint = "C" [checkpoint] Just now
//!   b1 experiment (1 entry, cursor 0, forked from b0@e3)
//!     > e4  Branched from Main = "C" [checkpoint]   Just now
//! ```
//!
//! `*` marks the active branch, `>` the cursor, `~` entries on the redo path.

use std::fmt::Write as _;

use forkline_history::{Branch, Clock, EditHistory, EntryPosition, HistoryOp, OpOutcome, format_age};

/// One progress line for an applied op.
#[must_use]
pub fn outcome_line(line: usize, op: &HistoryOp<String>, outcome: OpOutcome) -> String {
    let result = match outcome {
        OpOutcome::Entry(id) => format!("created {id}"),
        OpOutcome::Branch(id) => format!("created {id}"),
        OpOutcome::Changed => "ok".to_owned(),
        OpOutcome::NoOp => "no-op".to_owned(),
    };
    format!("{line:>4}: {:<16}{result}", op.name())
}

/// Every branch with its entries, cursor and snapshot names.
#[must_use]
pub fn summary<C: Clock>(history: &EditHistory<String, C>) -> String {
    let now = history.now();
    let active = history.active_branch_id();
    let mut out = String::new();

    for branch in history.branches() {
        let marker = if branch.id() == active { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {} {} ({})", branch.id(), branch.name(), branch_facts(branch));

        for (position, entry) in branch.timeline() {
            let cursor = match position {
                EntryPosition::Past => ' ',
                EntryPosition::Current => '>',
                EntryPosition::Future => '~',
            };
            let mut label = format!("{}  {} = {:?}", entry.id(), entry.action(), entry.data());
            if let Some(name) = entry.snapshot_name() {
                let _ = write!(label, " [{name}]");
            }
            let _ = writeln!(
                out,
                "    {cursor} {label:<40} {}",
                format_age(entry.timestamp(), now)
            );
            if let Some(description) = entry.description() {
                let _ = writeln!(out, "        {description}");
            }
        }
    }
    out
}

fn branch_facts(branch: &Branch<String>) -> String {
    let noun = if branch.len() == 1 { "entry" } else { "entries" };
    let mut facts = format!("{} {noun}, cursor {}", branch.len(), branch.current());
    if let Some(fork) = branch.fork_point() {
        let _ = write!(facts, ", forked from {}@{}", fork.branch, fork.entry);
    }
    facts
}
