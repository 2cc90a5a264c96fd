#![forbid(unsafe_code)]

//! End-to-end editing sessions against the public API.
//!
//! Covers the full edit → undo → overwrite → snapshot → fork → switch flow,
//! snapshot survival under a tight entry cap, and the tracing events the
//! engine emits under [`LOG_TARGET`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

use forkline_history::{
    BranchId, EditHistory, EntryId, EntryPosition, HistoryConfig, LOG_TARGET, ManualClock,
    format_age,
};

fn session(max_entries: usize) -> (EditHistory<&'static str, ManualClock>, ManualClock) {
    let clock = ManualClock::from_millis(1_700_000_000_000);
    let history =
        EditHistory::with_clock("A", HistoryConfig::new(max_entries), clock.clone()).unwrap();
    (history, clock)
}

fn entry_ids<C: forkline_history::Clock>(history: &EditHistory<&'static str, C>) -> Vec<u64> {
    history
        .active_branch()
        .entries()
        .iter()
        .map(|e| e.id().raw())
        .collect()
}

// ============================================================================
// Edit, overwrite, snapshot, fork, switch
// ============================================================================

#[test]
fn edit_undo_overwrite_snapshot_fork_switch() {
    let (mut history, clock) = session(0);

    let e1 = history.push("edit1", "B").unwrap();
    assert_eq!(entry_ids(&history), vec![0, 1]);
    assert_eq!(history.active_branch().current(), 1);

    assert!(history.undo());
    assert_eq!(history.active_branch().current(), 0);
    assert_eq!(*history.current_data(), "A");

    clock.advance(TimeDelta::seconds(5));
    history.push("edit2", "C").unwrap();
    assert_eq!(entry_ids(&history), vec![0, 2]);
    assert!(history.active_branch().entry(e1).is_none());
    assert_eq!(*history.current_data(), "C");

    let snapshot = history.create_snapshot("checkpoint").unwrap();
    assert_eq!(snapshot, EntryId::new(3));
    assert_eq!(entry_ids(&history), vec![0, 2, 3]);
    assert_eq!(history.active_branch().current(), 2);
    assert!(history.current_entry().is_snapshot());

    let experiment = history.create_branch("experiment").unwrap();
    assert_eq!(history.active_branch_id(), experiment);
    assert_eq!(history.active_branch().name(), "experiment");
    assert_eq!(entry_ids(&history), vec![4]);
    assert_eq!(history.active_branch().current(), 0);
    assert_eq!(*history.current_data(), "C");
    assert_eq!(history.active_branch().parent_entry_id(), Some(snapshot));

    let root = history.branch(BranchId::ROOT).unwrap();
    assert_eq!(
        root.entries().iter().map(|e| e.id().raw()).collect::<Vec<_>>(),
        vec![0, 2, 3]
    );
    assert_eq!(root.current(), 2);

    assert!(history.switch_branch(BranchId::ROOT));
    assert_eq!(*history.current_data(), "C");
    assert_eq!(history.current_entry().id(), snapshot);
    assert!(history.check_invariants().is_ok());
}

#[test]
fn fork_diverges_without_touching_parent() {
    let (mut history, _) = session(0);
    history.push("b", "B").unwrap();
    history.push("c", "C").unwrap();
    history.undo();

    let side = history.create_branch("side").unwrap();
    history.push("x", "X").unwrap();
    history.push("y", "Y").unwrap();
    history.undo();

    history.switch_branch(BranchId::ROOT);
    assert_eq!(*history.current_data(), "B");
    assert!(history.can_redo());
    history.redo();
    assert_eq!(*history.current_data(), "C");

    history.switch_branch(side);
    assert_eq!(*history.current_data(), "X");
    let positions: Vec<_> = history.timeline().map(|(p, e)| (p, *e.data())).collect();
    assert_eq!(
        positions,
        vec![
            (EntryPosition::Past, "B"),
            (EntryPosition::Current, "X"),
            (EntryPosition::Future, "Y"),
        ]
    );
}

#[test]
fn deleting_the_active_fork_returns_to_root() {
    let (mut history, _) = session(0);
    history.push("b", "B").unwrap();
    let side = history.create_branch("side").unwrap();
    history.push("x", "X").unwrap();

    assert!(history.delete_branch(side));
    assert_eq!(history.active_branch_id(), BranchId::ROOT);
    assert_eq!(*history.current_data(), "B");
    assert!(!history.switch_branch(side));
    assert!(!history.delete_branch(BranchId::ROOT));
}

// ============================================================================
// Snapshot survival under retention
// ============================================================================

#[test]
fn leading_snapshot_survives_ten_pushes_at_cap_three() {
    let (mut history, _) = session(3);
    let snapshot = history.create_snapshot("base").unwrap();
    history.clear_history();
    let leading = history.current_entry().id();
    assert!(history.current_entry().is_snapshot());
    assert_ne!(leading, snapshot);

    for i in 0..10 {
        history.push(format!("edit {i}"), "x").unwrap();
    }

    let branch = history.active_branch();
    assert_eq!(branch.len(), 4);
    assert_eq!(branch.entries()[0].id(), leading);
    assert_eq!(branch.current(), 3);
    assert!(history.jump_to(leading));
    assert_eq!(history.active_branch().current(), 0);
}

#[test]
fn snapshot_outlives_the_entry_it_followed() {
    let (mut history, _) = session(3);
    let snapshot = history.create_snapshot("base").unwrap();
    for i in 0..10 {
        history.push(format!("edit {i}"), "x").unwrap();
    }

    let branch = history.active_branch();
    assert_eq!(branch.len(), 4);
    assert_eq!(branch.entries()[0].id(), snapshot);
    assert!(branch.entries()[1..].iter().all(|e| !e.is_snapshot()));
    assert!(history.jump_to(snapshot));
    assert_eq!(*history.current_data(), "A");
}

#[test]
fn rename_then_list_snapshots() {
    let (mut history, _) = session(0);
    history.push("b", "B").unwrap();
    let first = history.create_snapshot("first").unwrap();
    history.push("c", "C").unwrap();
    history.create_snapshot("second").unwrap();

    assert!(history.rename_snapshot(first, "renamed"));
    let names: Vec<_> = history
        .snapshots()
        .map(|e| e.snapshot_name().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(names, vec!["renamed", "second"]);
}

#[test]
fn entry_ages_render_relative_to_clock() {
    let (mut history, clock) = session(0);
    history.push("b", "B").unwrap();
    clock.advance(TimeDelta::minutes(5));
    let stamp = history.current_entry().timestamp();
    assert_eq!(format_age(stamp, history.now()), "5m ago");
    clock.advance(TimeDelta::hours(3));
    assert_eq!(format_age(stamp, history.now()), "3h ago");
}

// ============================================================================
// Tracing
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn message(event: &CapturedEvent) -> &str {
    event.fields.get("message").map_or("", String::as_str)
}

#[test]
fn mutations_emit_debug_events_under_history_target() {
    let events = with_captured_tracing(|| {
        let (mut history, _) = session(0);
        history.push("edit", "B").unwrap();
        history.create_snapshot("s").unwrap();
        history.create_branch("side").unwrap();
    });

    let history_events: Vec<_> = events.iter().filter(|e| e.target == LOG_TARGET).collect();
    let messages: Vec<_> = history_events.iter().map(|e| message(e)).collect();
    assert!(messages.contains(&"entry pushed"), "{messages:?}");
    assert!(messages.contains(&"snapshot created"));
    assert!(messages.contains(&"branch created"));
    assert!(
        history_events
            .iter()
            .filter(|e| message(e) != "history created")
            .all(|e| e.level == tracing::Level::DEBUG)
    );

    let push = history_events
        .iter()
        .find(|e| message(e) == "entry pushed")
        .unwrap();
    assert_eq!(push.fields.get("entry").map(String::as_str), Some("e1"));
    assert_eq!(push.fields.get("branch").map(String::as_str), Some("b0"));
}

#[test]
fn retention_trim_emits_info_event() {
    let events = with_captured_tracing(|| {
        let (mut history, _) = session(2);
        for i in 0..4 {
            history.push(format!("edit {i}"), "x").unwrap();
        }
    });

    let trims: Vec<_> = events
        .iter()
        .filter(|e| e.target == LOG_TARGET && message(e) == "retention trimmed branch")
        .collect();
    assert_eq!(trims.len(), 3);
    assert!(trims.iter().all(|e| e.level == tracing::Level::INFO));
    assert_eq!(trims[0].fields.get("dropped").map(String::as_str), Some("1"));
}

#[test]
fn cursor_moves_are_traced() {
    let events = with_captured_tracing(|| {
        let (mut history, _) = session(0);
        history.undo();
    });
    let cursor = events
        .iter()
        .find(|e| e.target == LOG_TARGET && message(e) == "cursor")
        .unwrap();
    assert_eq!(cursor.level, tracing::Level::TRACE);
    assert_eq!(cursor.fields.get("moved").map(String::as_str), Some("false"));
    assert_eq!(cursor.fields.get("op").map(String::as_str), Some("undo"));
}
