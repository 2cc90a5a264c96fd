#![forbid(unsafe_code)]

//! Forkline History
//!
//! A branching edit-history engine for editors: linear undo/redo over opaque
//! document states, named snapshots that survive retention, and forked
//! branches that each keep their own cursor.
//!
//! # Key Components
//!
//! - [`EditHistory`] - The facade an editor owns and mutates
//! - [`Branch`] - One independently-cursored timeline
//! - [`HistoryEntry`] - One recorded state with label and timestamp
//! - [`RetentionPolicy`] - Per-branch entry cap that never drops snapshots
//! - [`HistoryConfig`] - Tunables, loadable from TOML/JSON with `config`
//! - [`HistoryOp`] - Operations as data, for recording and replay
//! - [`Clock`] - Time source; [`ManualClock`] for deterministic tests
//!
//! # Example
//!
//! ```
//! use forkline_history::{EditHistory, HistoryConfig};
//!
//! let mut history = EditHistory::with_config(String::from("A"), HistoryConfig::new(50))?;
//! history.push("type B", "AB".to_owned())?;
//! history.create_snapshot("draft")?;
//! history.undo();
//! assert_eq!(history.current_data(), "AB");
//!
//! let fork = history.create_branch("experiment")?;
//! history.push("type C", "ABC".to_owned())?;
//! history.switch_branch(history.root_branch_id());
//! assert_eq!(history.current_data(), "AB");
//! assert!(history.switch_branch(fork));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Serialize/Deserialize for ids, entries, branches, ops and
//!   config, plus a Serialize view of a whole [`EditHistory`]. A
//!   deserialized [`Branch`] is checked and rejected if malformed.
//! - `config`: TOML/JSON loading for [`HistoryConfig`].

pub mod branch;
pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod history;
pub mod ids;
pub mod manager;
pub mod ops;
pub mod retention;

pub use branch::{Branch, EntryPosition, ForkPoint};
pub use clock::{Clock, ManualClock, SystemClock, format_age};
pub use config::HistoryConfig;
pub use entry::{HistoryEntry, snapshot_action};
pub use error::{ConfigError, HistoryError, InvariantViolation, LabelField, Result};
pub use history::{EditHistory, LOG_TARGET};
pub use ids::{BranchId, EntryId, IdGenerator};
pub use manager::BranchManager;
pub use ops::{HistoryOp, OpOutcome};
pub use retention::{RetentionPolicy, TrimReport};
