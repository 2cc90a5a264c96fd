#![forbid(unsafe_code)]

//! Entry and branch identifiers.
//!
//! Ids are plain `u64` newtypes issued by a per-history [`IdGenerator`].
//! They are unique within one [`EditHistory`](crate::EditHistory) and never
//! reused, even after the entry or branch they named has been discarded.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a single history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntryId(u64);

impl EntryId {
    /// Create an entry id from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = ParseIntError;

    /// Accepts the display form (`e12`) or a bare integer (`12`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('e').unwrap_or(s);
        digits.parse().map(Self)
    }
}

/// Identifier of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BranchId(u64);

impl BranchId {
    /// The protected root branch every history is seeded with.
    pub const ROOT: Self = Self(0);

    /// Create a branch id from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the root branch id.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == Self::ROOT.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl FromStr for BranchId {
    type Err = ParseIntError;

    /// Accepts the display form (`b3`) or a bare integer (`3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('b').unwrap_or(s);
        digits.parse().map(Self)
    }
}

/// Monotonic id source shared by all branches of one history.
///
/// Entry and branch ids come from separate counters. Branch ids start at 1
/// because 0 is reserved for [`BranchId::ROOT`].
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next_entry: u64,
    next_branch: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a fresh generator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_entry: 0,
            next_branch: BranchId::ROOT.0 + 1,
        }
    }

    /// Issue the next entry id.
    pub fn next_entry(&mut self) -> EntryId {
        let id = EntryId(self.next_entry);
        self.next_entry += 1;
        id
    }

    /// Issue the next branch id.
    pub fn next_branch(&mut self) -> BranchId {
        let id = BranchId(self.next_branch);
        self.next_branch += 1;
        id
    }

    /// Number of entry ids issued so far.
    #[must_use]
    pub const fn entries_issued(&self) -> u64 {
        self.next_entry
    }
}
