//! Minimum qualifying subset selector
//!
//! Finds the smallest-sum subset of discount-eligible items whose total meets
//! a tier threshold. The chosen items are the ones consumed to *qualify* for
//! the tier, so they are excluded from the discount itself; everything else
//! receives the tier's rate. Backed by the subset-sum kernel, with an
//! ascending greedy fallback when the kernel's sum axis is truncated.

use smallvec::SmallVec;

use crate::{
    items::{Item, subtotal},
    solvers::subset_sum::SubsetSumTable,
};

/// The cheapest subset whose total meets a tier threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyingSubset {
    total: i64,
    positions: SmallVec<[u32; 8]>,
}

impl QualifyingSubset {
    /// Sum of the member items' amounts.
    pub const fn total(&self) -> i64 {
        self.total
    }

    /// Member positions, ascending.
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    /// Whether the subset consumed the item at `position`.
    pub fn contains(&self, position: u32) -> bool {
        self.positions.contains(&position)
    }
}

/// Find the smallest-sum subset of `items` whose total is at least
/// `threshold`.
///
/// Returns `None` when even the full eligible sum falls short. That is an
/// expected, common case (the tier simply is not reachable), not an error.
/// A threshold of zero or below is met by the empty subset.
///
/// Among subsets with equal totals the kernel's backpointer witness wins,
/// which is deterministic for a fixed input order.
pub fn select_minimal_qualifying_subset(
    items: &[Item],
    threshold: i64,
) -> Option<QualifyingSubset> {
    if threshold <= 0 {
        return Some(QualifyingSubset {
            total: 0,
            positions: SmallVec::new(),
        });
    }

    if subtotal(items) < threshold {
        return None;
    }

    let amounts: Vec<i64> = items.iter().map(Item::amount).collect();
    let table = SubsetSumTable::build(&amounts, threshold);

    if let Some(sum) = table.smallest_sum_at_least(threshold) {
        if let Some(witness) = table.witness(sum) {
            let mut positions: SmallVec<[u32; 8]> = witness
                .iter()
                .filter_map(|&index| items.get(index))
                .map(Item::position)
                .collect();

            positions.sort_unstable();

            return Some(QualifyingSubset {
                total: i64::try_from(sum).unwrap_or(i64::MAX),
                positions,
            });
        }
    }

    greedy_ascending(items, threshold)
}

/// Ascending greedy accumulation, used when the kernel cannot guarantee the
/// minimal qualifying sum. Succeeds whenever the full eligible sum meets the
/// threshold, which the caller has already checked.
fn greedy_ascending(items: &[Item], threshold: i64) -> Option<QualifyingSubset> {
    let mut sorted = items.to_vec();

    sorted.sort_by(|a, b| {
        a.amount()
            .cmp(&b.amount())
            .then(a.position().cmp(&b.position()))
    });

    let mut total = 0i64;
    let mut positions: SmallVec<[u32; 8]> = SmallVec::new();

    for item in sorted {
        total += item.amount();
        positions.push(item.position());

        if total >= threshold {
            positions.sort_unstable();

            return Some(QualifyingSubset { total, positions });
        }
    }

    None
}
