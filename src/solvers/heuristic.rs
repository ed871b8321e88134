//! Heuristic bin-covering partitioner
//!
//! Polynomial-time alternative to the exact solver for item counts where
//! `2^n` states are intractable. Builds an initial solution with
//! largest-first best-fit-to-completion, then refines it with a bounded
//! local-search loop over four ordered moves: pool group formation, surplus
//! donation, group/pool swap, and direct single-item completion. The first
//! move that succeeds ends the iteration; the loop ends when every move
//! fails or the iteration cap is reached. Completed groups are never broken,
//! so the result never has fewer groups than the initial construction.

use rustc_hash::FxHashSet;
use smallvec::{SmallVec, smallvec};

use crate::{
    items::Item,
    solvers::{Group, OptimizationResult, Partitioner, SolverError},
};

/// Absolute ceiling on local-search iterations.
const IMPROVE_ITER_CEILING: usize = 3000;

/// Tunables for the local-search phase.
///
/// These are preserved as configuration rather than hard invariants: the
/// defaults work well but carry no documented derivation.
#[derive(Debug, Clone)]
pub struct HeuristicOptions {
    /// Iteration cap for the local-search loop. Defaults to
    /// `min(3000, max(1, 4 * item_count))` when `None`.
    pub max_improve_iters: Option<usize>,

    /// Re-sort the pool at most once every this many iterations once it is
    /// marked dirty. Successive donations and swaps perturb only a few
    /// entries, so a full re-sort every iteration is wasted work at scale.
    pub resort_every: usize,

    /// Whether the direct single-item completion move is attempted.
    pub enable_direct_donate: bool,
}

impl Default for HeuristicOptions {
    fn default() -> Self {
        Self {
            max_improve_iters: None,
            resort_every: 6,
            enable_direct_donate: true,
        }
    }
}

/// Heuristic partitioner with local-search refinement.
#[derive(Debug)]
pub struct HeuristicSolver;

impl Partitioner for HeuristicSolver {
    fn partition(items: &[Item], threshold: i64) -> Result<OptimizationResult, SolverError> {
        Ok(Self::solve(items, threshold))
    }
}

impl HeuristicSolver {
    /// Partition with the default [`HeuristicOptions`].
    pub fn solve(items: &[Item], threshold: i64) -> OptimizationResult {
        Self::solve_with(items, threshold, &HeuristicOptions::default())
    }

    /// Partition with explicit local-search tunables.
    ///
    /// `max_improve_iters` of zero yields the initial construction only.
    pub fn solve_with(
        items: &[Item],
        threshold: i64,
        options: &HeuristicOptions,
    ) -> OptimizationResult {
        if threshold <= 0 || items.is_empty() {
            return OptimizationResult::all_leftover(items, threshold);
        }

        let (completed, pool) = initial_construction(items, threshold);

        let mut workspace = Workspace {
            pool,
            completed,
            threshold,
            dirty: true,
        };

        let cap = options
            .max_improve_iters
            .unwrap_or_else(|| IMPROVE_ITER_CEILING.min(4 * items.len()).max(1));

        let resort_every = options.resort_every.max(1);

        for iteration in 0..cap {
            if workspace.dirty && iteration % resort_every == 0 {
                workspace.sort_pool();
            }

            let moved = workspace.try_form_group()
                || workspace.try_donate_surplus()
                || workspace.try_swap_group_pool()
                || (options.enable_direct_donate && workspace.try_direct_completion());

            if !moved {
                break;
            }
        }

        let claimed: FxHashSet<u32> = workspace
            .completed
            .iter()
            .flat_map(|group| group.items().iter().map(Item::position))
            .collect();

        let leftover = items
            .iter()
            .filter(|item| !claimed.contains(&item.position()))
            .copied()
            .collect();

        OptimizationResult::new(workspace.completed, leftover, threshold)
    }
}

/// A group still below the threshold during initial construction.
#[derive(Debug)]
struct OpenGroup {
    items: SmallVec<[Item; 8]>,
    total: i64,
}

/// Largest-first best-fit-to-completion.
///
/// Each item (descending by amount) either completes the open group it
/// overshoots least, joins the open group it leaves closest to completion,
/// or starts a new group. Open groups that never cross the threshold are
/// dissolved into the returned pool for the local-search phase to re-mix.
fn initial_construction(items: &[Item], threshold: i64) -> (Vec<Group>, Vec<Item>) {
    let mut sorted = items.to_vec();

    sorted.sort_by(|a, b| {
        b.amount()
            .cmp(&a.amount())
            .then(a.position().cmp(&b.position()))
    });

    let mut open: Vec<OpenGroup> = Vec::new();
    let mut completed: Vec<Group> = Vec::new();

    for item in sorted {
        if item.amount() >= threshold {
            completed.push(Group::from_items(smallvec![item]));
            continue;
        }

        let mut best_completing: Option<(usize, i64)> = None;
        let mut best_partial: Option<(usize, i64)> = None;

        for (index, group) in open.iter().enumerate() {
            let new_total = group.total + item.amount();

            if new_total >= threshold {
                let overshoot = new_total - threshold;

                if best_completing.is_none_or(|(_, current)| overshoot < current) {
                    best_completing = Some((index, overshoot));
                }
            } else {
                let shortfall = threshold - new_total;

                if best_partial.is_none_or(|(_, current)| shortfall < current) {
                    best_partial = Some((index, shortfall));
                }
            }
        }

        if let Some((index, _)) = best_completing {
            let mut group = open.swap_remove(index);

            group.items.push(item);
            completed.push(Group::from_items(group.items));
        } else if let Some((index, _)) = best_partial {
            if let Some(group) = open.get_mut(index) {
                group.items.push(item);
                group.total += item.amount();
            }
        } else {
            open.push(OpenGroup {
                total: item.amount(),
                items: smallvec![item],
            });
        }
    }

    let pool: Vec<Item> = open.into_iter().flat_map(|group| group.items).collect();

    (completed, pool)
}

/// Mutable pool/group state threaded through the local-search moves.
///
/// Private to one solve call: items move between `pool` and `completed`
/// groups but are never duplicated or dropped.
#[derive(Debug)]
struct Workspace {
    /// Unassigned items, kept descending by amount (modulo the dirty flag).
    pool: Vec<Item>,

    /// Groups whose totals already meet the threshold.
    completed: Vec<Group>,

    threshold: i64,

    /// Set when a move perturbed the pool's ordering.
    dirty: bool,
}

impl Workspace {
    fn sort_pool(&mut self) {
        self.pool.sort_by(|a, b| {
            b.amount()
                .cmp(&a.amount())
                .then(a.position().cmp(&b.position()))
        });

        self.dirty = false;
    }

    /// Move 1: form a new qualifying group from the pool alone.
    ///
    /// Takes the largest remaining item as a core, then fills with the
    /// smallest remaining items (two-pointer from both ends) until the
    /// running sum reaches the threshold.
    fn try_form_group(&mut self) -> bool {
        let Some(core) = self.pool.first().copied() else {
            return false;
        };

        let mut total = core.amount();
        let mut tail_take = 0usize;

        while total < self.threshold && tail_take + 1 < self.pool.len() {
            let Some(next) = self.pool.get(self.pool.len() - 1 - tail_take) else {
                break;
            };

            total += next.amount();
            tail_take += 1;
        }

        if total < self.threshold {
            return false;
        }

        let mut members: SmallVec<[Item; 8]> = smallvec![core];

        members.extend(self.pool.split_off(self.pool.len() - tail_take));

        // The core is still at the front: the tail loop never consumes it.
        if !self.pool.is_empty() {
            self.pool.remove(0);
        }

        self.completed.push(Group::from_items(members));

        // Removing from the front and back preserves the descending order.
        true
    }

    /// Move 2: seed the pool from a group's surplus.
    ///
    /// Among groups with positive surplus (largest surplus first), release
    /// the smallest item whose removal still leaves the group qualifying.
    fn try_donate_surplus(&mut self) -> bool {
        for group_index in self.groups_by_surplus_desc() {
            let Some(group) = self.completed.get_mut(group_index) else {
                continue;
            };

            let surplus = group.total - self.threshold;

            let removable = group
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.amount() <= surplus)
                .min_by_key(|(_, item)| (item.amount(), item.position()))
                .map(|(index, _)| index);

            if let Some(index) = removable {
                let item = group.items.remove(index);

                group.total -= item.amount();
                self.pool.push(item);
                self.dirty = true;

                return true;
            }
        }

        false
    }

    /// Move 3: shrink a group's surplus by swapping one of its items for a
    /// strictly smaller pool item that keeps the group qualifying, freeing
    /// the larger item for future groups.
    fn try_swap_group_pool(&mut self) -> bool {
        for group_index in self.groups_by_surplus_desc() {
            let swap = self.find_swap_for_group(group_index);

            let Some((member_index, member, pool_index)) = swap else {
                continue;
            };

            let Some(pool_slot) = self.pool.get_mut(pool_index) else {
                continue;
            };

            let incoming = *pool_slot;
            *pool_slot = member;

            if let Some(group) = self.completed.get_mut(group_index) {
                if let Some(slot) = group.items.get_mut(member_index) {
                    *slot = incoming;
                }

                group.total = group.total - member.amount() + incoming.amount();
            }

            self.dirty = true;

            return true;
        }

        false
    }

    /// Move 4: complete a near-threshold pool subset with a single item
    /// donated by a surplus group, without breaking the donor.
    fn try_direct_completion(&mut self) -> bool {
        let Some(core) = self.pool.first().copied() else {
            return false;
        };

        if core.amount() >= self.threshold {
            // Pool formation would already have taken it.
            return false;
        }

        // Same large/small two-pointer strategy as move 1, but stopping just
        // below the threshold.
        let mut total = core.amount();
        let mut tail_take = 0usize;

        while tail_take + 1 < self.pool.len() {
            let Some(next) = self.pool.get(self.pool.len() - 1 - tail_take) else {
                break;
            };

            if total + next.amount() >= self.threshold {
                break;
            }

            total += next.amount();
            tail_take += 1;
        }

        let shortfall = self.threshold - total;

        let mut donor: Option<(usize, usize, Item)> = None;

        for (group_index, group) in self.completed.iter().enumerate() {
            let surplus = group.surplus(self.threshold);

            if surplus <= 0 {
                continue;
            }

            for (item_index, item) in group.items.iter().enumerate() {
                if item.amount() < shortfall || item.amount() > surplus {
                    continue;
                }

                let better = donor.is_none_or(|(_, _, current)| {
                    (item.amount(), item.position()) < (current.amount(), current.position())
                });

                if better {
                    donor = Some((group_index, item_index, *item));
                }
            }
        }

        let Some((group_index, item_index, _)) = donor else {
            return false;
        };

        let Some(group) = self.completed.get_mut(group_index) else {
            return false;
        };

        let donated = group.items.remove(item_index);

        group.total -= donated.amount();

        let mut members: SmallVec<[Item; 8]> = smallvec![core];

        members.extend(self.pool.split_off(self.pool.len() - tail_take));

        if !self.pool.is_empty() {
            self.pool.remove(0);
        }

        members.push(donated);
        self.completed.push(Group::from_items(members));

        true
    }

    /// Indexes of completed groups with positive surplus, largest first.
    fn groups_by_surplus_desc(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.completed.len())
            .filter(|&index| {
                self.completed
                    .get(index)
                    .is_some_and(|group| group.surplus(self.threshold) > 0)
            })
            .collect();

        order.sort_by_key(|&index| {
            std::cmp::Reverse(
                self.completed
                    .get(index)
                    .map_or(0, |group| group.surplus(self.threshold)),
            )
        });

        order
    }

    /// For move 3: the first (largest-first) group member for which the pool
    /// holds a strictly smaller item that keeps the group qualifying,
    /// together with the smallest such pool item.
    fn find_swap_for_group(&self, group_index: usize) -> Option<(usize, Item, usize)> {
        let group = self.completed.get(group_index)?;

        let mut member_order: Vec<usize> = (0..group.items.len()).collect();

        member_order.sort_by_key(|&index| {
            std::cmp::Reverse(group.items.get(index).map_or(0, Item::amount))
        });

        for member_index in member_order {
            let member = group.items.get(member_index).copied()?;
            let needed = self.threshold - (group.total - member.amount());

            let candidate = self
                .pool
                .iter()
                .enumerate()
                .filter(|(_, pool_item)| {
                    pool_item.amount() < member.amount() && pool_item.amount() >= needed
                })
                .min_by_key(|(_, pool_item)| (pool_item.amount(), pool_item.position()))
                .map(|(index, _)| index);

            if let Some(pool_index) = candidate {
                return Some((member_index, member, pool_index));
            }
        }

        None
    }
}
