//! Garland
//!
//! Garland is a threshold-grouping and tiered-discount engine. Given a basket
//! of positive integer amounts it partitions a subset of them into disjoint
//! groups whose totals each meet a gift threshold (bin covering, maximising
//! the number of qualifying groups), and it selects the cheapest qualifying
//! subset for tiered percentage discounts so the discount lands on the
//! leftover spend.
//!
//! The engine is a pure, synchronous, in-process library: callers sanitize
//! raw entries with [`items::sanitize`], pick the exact or heuristic
//! partitioner from [`solvers`] based on item count, and apply discounts via
//! [`discounts::apply_tiered_discount`].

pub mod discounts;
pub mod fixtures;
pub mod items;
pub mod report;
pub mod solvers;
pub mod utils;
