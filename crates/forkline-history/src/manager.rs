#![forbid(unsafe_code)]

//! Branch collection and active-branch selection.
//!
//! # Invariants
//!
//! 1. There is always at least one branch: the root ([`BranchId::ROOT`]),
//!    which can never be removed.
//! 2. `active` always names a branch in the collection.
//! 3. Branch ids are unique. Names need not be.

use std::collections::HashSet;

use crate::branch::Branch;
use crate::error::InvariantViolation;
use crate::ids::BranchId;

/// Owns every branch of a history and tracks which one is active.
///
/// Branches are kept in creation order.
#[derive(Debug, Clone)]
pub struct BranchManager<T> {
    branches: Vec<Branch<T>>,
    active: BranchId,
}

impl<T> BranchManager<T> {
    /// Create a manager holding only `root`, which becomes active.
    pub(crate) fn new(root: Branch<T>) -> Self {
        debug_assert!(root.id().is_root(), "root branch must use BranchId::ROOT");
        Self {
            active: root.id(),
            branches: vec![root],
        }
    }

    /// Id of the active branch.
    #[must_use]
    pub fn active_id(&self) -> BranchId {
        self.active
    }

    /// The active branch.
    ///
    /// # Panics
    ///
    /// Panics if the active branch is missing, which is an engine bug.
    #[must_use]
    pub fn active(&self) -> &Branch<T> {
        let index = self.active_index();
        &self.branches[index]
    }

    pub(crate) fn active_mut(&mut self) -> &mut Branch<T> {
        let index = self.active_index();
        &mut self.branches[index]
    }

    fn active_index(&self) -> usize {
        self.index_of(self.active).unwrap_or_else(|| {
            panic!(
                "invariant violated: active branch {} is missing",
                self.active
            )
        })
    }

    fn index_of(&self, id: BranchId) -> Option<usize> {
        self.branches.iter().position(|b| b.id() == id)
    }

    /// Look up a branch by id.
    #[must_use]
    pub fn get(&self, id: BranchId) -> Option<&Branch<T>> {
        self.branches.iter().find(|b| b.id() == id)
    }

    /// Whether a branch with `id` exists.
    #[must_use]
    pub fn contains(&self, id: BranchId) -> bool {
        self.index_of(id).is_some()
    }

    /// All branches in creation order.
    #[must_use]
    pub fn branches(&self) -> &[Branch<T>] {
        &self.branches
    }

    /// Number of branches (always at least 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Always `false`; the root branch cannot be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Add a new branch and make it active.
    pub(crate) fn insert_active(&mut self, branch: Branch<T>) {
        self.active = branch.id();
        self.branches.push(branch);
    }

    /// Make `id` active. Unknown ids are ignored.
    pub(crate) fn switch(&mut self, id: BranchId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active = id;
        true
    }

    /// Remove a non-root branch.
    ///
    /// If the removed branch was active, the root becomes active. Returns the
    /// removed branch, or `None` for the root or an unknown id.
    pub(crate) fn remove(&mut self, id: BranchId) -> Option<Branch<T>> {
        if id.is_root() {
            return None;
        }
        let index = self.index_of(id)?;
        let removed = self.branches.remove(index);
        if self.active == id {
            self.active = BranchId::ROOT;
        }
        Some(removed)
    }

    /// Structural self-check of the collection and every branch.
    pub(crate) fn check(&self) -> Result<(), InvariantViolation> {
        if self.branches.is_empty() {
            return Err(InvariantViolation::NoBranches);
        }
        if !self.contains(BranchId::ROOT) {
            return Err(InvariantViolation::MissingRootBranch(BranchId::ROOT));
        }
        if !self.contains(self.active) {
            return Err(InvariantViolation::MissingActiveBranch(self.active));
        }
        let mut seen = HashSet::with_capacity(self.branches.len());
        for branch in &self.branches {
            if !seen.insert(branch.id()) {
                return Err(InvariantViolation::DuplicateBranchId(branch.id()));
            }
            branch.check()?;
        }
        Ok(())
    }
}
