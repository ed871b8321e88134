//! Subset-sum kernel
//!
//! Shared reachability DP underlying the exact partitioner's qualifying-sum
//! checks and the discount selector's cheapest-qualifying-subset search.
//! Given `n` amounts and a sum bound `L`, builds a bitset-backed table of
//! reachable sums in `0..=L` together with backpointers: for each reachable
//! sum, the item whose inclusion last made it reachable and the sum before
//! that inclusion, enough to reconstruct one witnessing subset.
//! O(n·L) time, O(L) space.

/// Hard cap on the DP sum axis, independent of inputs. Protects against
/// pathological threshold/amount combinations; when the cap truncates the
/// useful range the table reports no exact subset and callers fall back to
/// greedy accumulation.
pub const SUM_BOUND_CAP: usize = 4_000_000;

/// Sentinel for "sum not reachable" in the backpointer arrays.
const NO_ITEM: u32 = u32::MAX;

/// Reachability table with witness backpointers for one set of amounts.
#[derive(Debug)]
pub struct SubsetSumTable {
    bound: usize,
    truncated: bool,
    words: Vec<u64>,
    last_item: Vec<u32>,
    prev_sum: Vec<u32>,
}

impl SubsetSumTable {
    /// Build the table for `amounts` with a sum axis large enough to answer
    /// "smallest reachable sum ≥ threshold".
    ///
    /// The bound is `min(SUM_BOUND_CAP, threshold + max_amount)`: a minimal
    /// qualifying subset never overshoots the threshold by more than its
    /// largest single item, so the window is sufficient whenever it is not
    /// truncated by the hard cap. Non-positive amounts are skipped.
    pub fn build(amounts: &[i64], threshold: i64) -> Self {
        let max_amount = amounts.iter().copied().max().unwrap_or(0).max(0);
        let ideal = usize::try_from(threshold.max(0).saturating_add(max_amount))
            .unwrap_or(usize::MAX);

        let bound = ideal.min(SUM_BOUND_CAP);
        let truncated = ideal > SUM_BOUND_CAP;

        let mut table = Self {
            bound,
            truncated,
            words: vec![0; bound / 64 + 1],
            last_item: vec![NO_ITEM; bound + 1],
            prev_sum: vec![0; bound + 1],
        };

        table.set(0);

        for (index, &amount) in amounts.iter().enumerate() {
            let Ok(step) = usize::try_from(amount) else {
                continue;
            };

            if step == 0 || step > bound {
                continue;
            }

            // Items are processed in a fixed outer order while the sum axis
            // is scanned downward: an item can extend only sums that were
            // reachable before this item was considered, so each item is used
            // at most once per sum.
            for sum in (step..=bound).rev() {
                if table.is_reachable(sum - step) && !table.is_reachable(sum) {
                    table.set(sum);
                    table.record(sum, index, sum - step);
                }
            }
        }

        table
    }

    /// Whether the hard cap truncated the useful sum range.
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Upper end of the sum axis.
    pub const fn bound(&self) -> usize {
        self.bound
    }

    /// Whether `sum` is achievable by some subset of the amounts.
    pub fn is_reachable(&self, sum: usize) -> bool {
        self.words
            .get(sum / 64)
            .is_some_and(|word| word >> (sum % 64) & 1 == 1)
    }

    /// Smallest reachable sum at or above `threshold`.
    ///
    /// Reports `None` when the table was truncated, even if a candidate sum
    /// exists within the bound: truncation means the window no longer
    /// guarantees the minimal qualifying sum is representable, so callers
    /// must fall back to greedy accumulation.
    pub fn smallest_sum_at_least(&self, threshold: i64) -> Option<usize> {
        if self.truncated {
            return None;
        }

        let start = usize::try_from(threshold.max(0)).ok()?;

        (start..=self.bound).find(|&sum| self.is_reachable(sum))
    }

    /// Item indexes of one subset achieving `sum`, in ascending index order.
    pub fn witness(&self, sum: usize) -> Option<Vec<usize>> {
        if !self.is_reachable(sum) {
            return None;
        }

        let mut indexes = Vec::new();
        let mut current = sum;

        while current != 0 {
            let item = *self.last_item.get(current)?;

            if item == NO_ITEM {
                return None;
            }

            indexes.push(item as usize);
            current = *self.prev_sum.get(current)? as usize;
        }

        indexes.sort_unstable();

        Some(indexes)
    }

    fn set(&mut self, sum: usize) {
        if let Some(word) = self.words.get_mut(sum / 64) {
            *word |= 1 << (sum % 64);
        }
    }

    fn record(&mut self, sum: usize, item: usize, prev: usize) {
        if let (Some(last), Some(previous)) =
            (self.last_item.get_mut(sum), self.prev_sum.get_mut(sum))
        {
            *last = u32::try_from(item).unwrap_or(NO_ITEM);
            *previous = u32::try_from(prev).unwrap_or(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reachable_sums_cover_all_subsets() {
        let table = SubsetSumTable::build(&[100, 300, 50], 120);

        // The sum axis only extends to threshold + max amount (420), so the
        // full-set sum 450 is out of window by design.
        for sum in [0, 50, 100, 150, 300, 350, 400] {
            assert!(table.is_reachable(sum), "sum {sum} should be reachable");
        }

        assert_eq!(table.bound(), 420);
        assert!(!table.is_reachable(120));
        assert!(!table.is_reachable(75));
        assert!(!table.is_reachable(450));
    }

    #[test]
    fn smallest_sum_at_least_finds_minimal_qualifying_sum() {
        let table = SubsetSumTable::build(&[100, 300, 50], 120);

        assert_eq!(table.smallest_sum_at_least(120), Some(150));
        assert_eq!(table.smallest_sum_at_least(0), Some(0));
        assert_eq!(table.smallest_sum_at_least(451), None);
    }

    #[test]
    fn witness_reconstructs_an_achieving_subset() {
        let amounts = [100, 300, 50];
        let table = SubsetSumTable::build(&amounts, 120);

        let witness = table.witness(150).unwrap_or_default();
        let total: i64 = witness.iter().filter_map(|&i| amounts.get(i)).sum();

        assert_eq!(total, 150);
        assert_eq!(witness, vec![0, 2]);
    }

    #[test]
    fn duplicate_amounts_are_distinct_items_used_once_each() {
        // Two items of 5: 10 is reachable only by using both, never one twice.
        let table = SubsetSumTable::build(&[5, 5], 8);

        assert!(table.is_reachable(10));
        assert_eq!(table.witness(10), Some(vec![0, 1]));
        assert!(!table.is_reachable(15));
    }

    #[test]
    fn single_item_alone_can_be_the_witness() {
        let table = SubsetSumTable::build(&[700, 20], 600);

        assert_eq!(table.smallest_sum_at_least(600), Some(700));
        assert_eq!(table.witness(700), Some(vec![0]));
    }

    #[test]
    fn truncated_table_reports_no_exact_subset() {
        let threshold = i64::try_from(SUM_BOUND_CAP).unwrap_or(i64::MAX) + 10;
        let table = SubsetSumTable::build(&[500], threshold);

        assert!(table.truncated());
        assert_eq!(table.smallest_sum_at_least(threshold), None);
    }

    #[test]
    fn non_positive_amounts_are_skipped() {
        let table = SubsetSumTable::build(&[-10, 0, 30], 20);

        assert_eq!(table.smallest_sum_at_least(20), Some(30));
        assert_eq!(table.witness(30), Some(vec![2]));
    }
}
