//! Solvers for threshold grouping
//!
//! Both partitioners (the exact bitmask solver and the heuristic
//! bin-covering solver) consume sanitized items and produce the same
//! [`OptimizationResult`] shape: the qualifying groups, the leftover items,
//! and the threshold they were solved against.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

use crate::items::{Item, subtotal};

pub mod exact;
pub mod heuristic;
pub mod subset_sum;

pub use exact::{EXACT_ITEM_LIMIT, ExactSolver};
pub use heuristic::{HeuristicOptions, HeuristicSolver};
pub use subset_sum::SubsetSumTable;

/// Solver Errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// Item count exceeds the exact solver's tractability ceiling.
    ///
    /// This is a usage contract violation: the caller must route oversized
    /// inputs to the heuristic solver instead.
    #[error("item count {items} exceeds the exact solver limit of {limit}")]
    CapacityExceeded {
        /// Number of items the caller supplied.
        items: usize,
        /// Maximum item count the exact solver accepts.
        limit: usize,
    },

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// A completed group whose total meets the threshold it was formed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    items: SmallVec<[Item; 8]>,
    total: i64,
}

impl Group {
    /// Build a group from its member items, deriving the total.
    pub(crate) fn from_items(items: SmallVec<[Item; 8]>) -> Self {
        let total = items.iter().map(Item::amount).sum();

        Self { items, total }
    }

    /// Member items, in the order they joined the group.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Sum of the member items' amounts.
    pub const fn total(&self) -> i64 {
        self.total
    }

    /// Amount by which this group's total exceeds the given threshold.
    pub const fn surplus(&self, threshold: i64) -> i64 {
        self.total - threshold
    }
}

/// Result of partitioning items into qualifying groups.
///
/// `groups` and `leftover` partition the solver's input exactly: every input
/// position appears in exactly one of the two, and the input total equals the
/// covered amount plus the leftover amount.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    groups: Vec<Group>,
    leftover: Vec<Item>,
    threshold: i64,
}

impl OptimizationResult {
    pub(crate) fn new(groups: Vec<Group>, leftover: Vec<Item>, threshold: i64) -> Self {
        #[cfg(debug_assertions)]
        {
            let mut seen = FxHashSet::default();

            let all = groups
                .iter()
                .flat_map(|group| group.items().iter())
                .chain(leftover.iter());

            for item in all {
                debug_assert!(
                    seen.insert(item.position()),
                    "duplicate position {} across groups and leftover",
                    item.position()
                );
            }
        }

        Self {
            groups,
            leftover,
            threshold,
        }
    }

    /// The trivial result: no groups, everything left over.
    pub(crate) fn all_leftover(items: &[Item], threshold: i64) -> Self {
        Self::new(Vec::new(), items.to_vec(), threshold)
    }

    /// Qualifying groups, each with a total at or above the threshold.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Items not claimed by any group, in the solver input's order.
    pub fn leftover(&self) -> &[Item] {
        &self.leftover
    }

    /// Threshold the partition was solved against.
    pub const fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Number of qualifying groups ("gifts earned").
    pub fn total_gifts(&self) -> usize {
        self.groups.len()
    }

    /// Sum of all group totals.
    pub fn covered_amount(&self) -> i64 {
        self.groups.iter().map(Group::total).sum()
    }

    /// Sum of all input amounts (covered plus leftover).
    pub fn total_amount(&self) -> i64 {
        self.covered_amount() + subtotal(&self.leftover)
    }

    /// Positions claimed by qualifying groups.
    pub fn covered_positions(&self) -> FxHashSet<u32> {
        self.groups
            .iter()
            .flat_map(|group| group.items().iter().map(Item::position))
            .collect()
    }
}

/// Trait for partitioners that share the grouping result shape.
pub trait Partitioner {
    /// Partition `items` into disjoint groups with totals at or above
    /// `threshold`, maximising (exactly or approximately) the group count.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the solver's calling contract is violated.
    fn partition(items: &[Item], threshold: i64) -> Result<OptimizationResult, SolverError>;
}
