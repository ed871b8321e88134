//! Exact bitmask partitioner
//!
//! True maximum qualifying-group count via subset-of-subset dynamic
//! programming. `subset_sum[mask]` is enumerated for every bit-mask over the
//! items, then `dp[mask]`, the maximum number of disjoint qualifying groups
//! formable from the items in `mask`, is computed by trying every sub-mask
//! with a qualifying sum. O(3^n) aggregate work from the sub-mask
//! enumeration, so the item count is capped by a caller-visible contract
//! rather than silently degrading to exponential latency.

use smallvec::SmallVec;

use crate::{
    items::Item,
    solvers::{Group, OptimizationResult, Partitioner, SolverError},
};

/// Tractability ceiling for the exact solver.
///
/// `2^n` subset sums and `3^n` sub-mask visits are both practical at this
/// bound; beyond it callers must use the heuristic solver.
pub const EXACT_ITEM_LIMIT: usize = 20;

/// Exact partitioner over bit-masks of the item set.
#[derive(Debug)]
pub struct ExactSolver;

impl Partitioner for ExactSolver {
    fn partition(items: &[Item], threshold: i64) -> Result<OptimizationResult, SolverError> {
        Self::solve(items, threshold)
    }
}

impl ExactSolver {
    /// Compute the maximum number of disjoint qualifying groups together with
    /// one witnessing partition.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::CapacityExceeded`] when the item count is above
    /// [`EXACT_ITEM_LIMIT`].
    #[expect(
        clippy::indexing_slicing,
        reason = "all table indexes are masks over n <= EXACT_ITEM_LIMIT items, bounded by construction"
    )]
    pub fn solve(items: &[Item], threshold: i64) -> Result<OptimizationResult, SolverError> {
        let n = items.len();

        if n > EXACT_ITEM_LIMIT {
            return Err(SolverError::CapacityExceeded {
                items: n,
                limit: EXACT_ITEM_LIMIT,
            });
        }

        if threshold <= 0 || items.is_empty() {
            return Ok(OptimizationResult::all_leftover(items, threshold));
        }

        let full = (1usize << n) - 1;

        // Subset sums via the drop-lowest-set-bit recurrence.
        let mut sums = vec![0i64; full + 1];

        for mask in 1..=full {
            let lowest = mask.trailing_zeros() as usize;

            sums[mask] = sums[mask & (mask - 1)] + items[lowest].amount();
        }

        // dp[mask]: maximum qualifying disjoint groups within `mask`.
        // parent[mask]: the sub-mask chosen as one group at that maximum.
        let mut dp = vec![0u16; full + 1];
        let mut parent = vec![0usize; full + 1];

        for mask in 1..=full {
            let mut sub = mask;

            while sub > 0 {
                if sums[sub] >= threshold {
                    let candidate = dp[mask ^ sub] + 1;

                    if candidate > dp[mask] {
                        dp[mask] = candidate;
                        parent[mask] = sub;
                    }
                }

                sub = (sub - 1) & mask;
            }
        }

        // Leaving items unused is valid, so the best mask need not be full.
        let mut best_mask = 0usize;

        for mask in 0..=full {
            if dp[mask] > dp[best_mask] {
                best_mask = mask;
            }
        }

        let mut groups = Vec::with_capacity(usize::from(dp[best_mask]));
        let mut remaining = best_mask;

        while remaining != 0 && dp[remaining] > 0 {
            let sub = parent[remaining];

            if sub == 0 || sub & remaining != sub {
                return Err(SolverError::InvariantViolation {
                    message: "parent pointer does not select a sub-mask of the remaining items",
                });
            }

            groups.push(group_from_mask(items, sub));
            remaining ^= sub;
        }

        let leftover_mask = (full ^ best_mask) | remaining;
        let leftover = items
            .iter()
            .enumerate()
            .filter(|(index, _)| leftover_mask >> index & 1 == 1)
            .map(|(_, item)| *item)
            .collect();

        Ok(OptimizationResult::new(groups, leftover, threshold))
    }
}

fn group_from_mask(items: &[Item], mask: usize) -> Group {
    let members: SmallVec<[Item; 8]> = items
        .iter()
        .enumerate()
        .filter(|(index, _)| mask >> index & 1 == 1)
        .map(|(_, item)| *item)
        .collect();

    Group::from_items(members)
}
