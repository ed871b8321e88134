//! Discounts
//!
//! Tiered percentage discounts over sanitized items. Each [`DiscountTier`]
//! names a spend threshold, a rate, and an optional cap on the discountable
//! amount. The cheapest subset meeting the threshold is consumed to qualify
//! and pays full price; the discount applies to the remaining, non-qualifying
//! spend. Among qualifying tiers the one with the largest savings wins, with
//! equal savings broken towards the higher rate.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::items::{Item, subtotal};

pub mod selector;

pub use selector::{QualifyingSubset, select_minimal_qualifying_subset};

new_key_type! {
    /// Key identifying one discount tier within an application call.
    pub struct TierKey;
}

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Tier rate outside the half-open interval `(0, 1]`.
    #[error("discount rate {rate} is outside the interval (0, 1]")]
    InvalidRate {
        /// The offending rate as a fraction.
        rate: Decimal,
    },

    /// Tier cap below zero.
    #[error("discount cap {cap} is negative")]
    InvalidCap {
        /// The offending cap in minor units.
        cap: i64,
    },

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// One spend-threshold discount tier.
#[derive(Debug, Clone, Copy)]
pub struct DiscountTier {
    key: TierKey,
    threshold: i64,
    rate: Percentage,
    cap: Option<i64>,
}

impl DiscountTier {
    /// Create a tier, validating the rate and cap.
    ///
    /// `rate` is a fraction (e.g. `0.25` for 25% off); `cap` bounds the total
    /// amount the rate may be applied to, allocated across non-qualifying
    /// items in input order. A cap of zero is allowed and discounts nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::InvalidRate`] unless the rate is in `(0, 1]`,
    /// and [`DiscountError::InvalidCap`] when the cap is negative: a negative
    /// cap would turn the per-item discount into a surcharge.
    pub fn new(
        key: TierKey,
        threshold: i64,
        rate: Percentage,
        cap: Option<i64>,
    ) -> Result<Self, DiscountError> {
        let fraction = rate * Decimal::ONE;

        if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
            return Err(DiscountError::InvalidRate { rate: fraction });
        }

        if let Some(cap) = cap
            && cap < 0
        {
            return Err(DiscountError::InvalidCap { cap });
        }

        Ok(Self {
            key,
            threshold,
            rate,
            cap,
        })
    }

    /// Return the tier key.
    pub const fn key(&self) -> TierKey {
        self.key
    }

    /// Return the qualifying spend threshold.
    pub const fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Return the discount rate as a fraction.
    pub const fn rate(&self) -> Percentage {
        self.rate
    }

    /// Return the optional cap on the discountable amount.
    pub const fn cap(&self) -> Option<i64> {
        self.cap
    }
}

/// One item's price before and after the discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountedItem {
    position: u32,
    original: i64,
    discounted: i64,
}

impl DiscountedItem {
    /// Stable identity of the underlying item.
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Amount before the discount.
    pub const fn original(&self) -> i64 {
        self.original
    }

    /// Amount after the discount.
    pub const fn discounted(&self) -> i64 {
        self.discounted
    }

    /// Amount saved on this item.
    pub const fn savings(&self) -> i64 {
        self.original - self.discounted
    }
}

/// Which tier was applied, and how the items split between qualifying and
/// discounted roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTier {
    key: TierKey,
    qualifying_total: i64,
    qualifying_positions: SmallVec<[u32; 8]>,
    discounted_positions: SmallVec<[u32; 8]>,
}

impl AppliedTier {
    /// Key of the winning tier.
    pub const fn key(&self) -> TierKey {
        self.key
    }

    /// Total of the items consumed to qualify.
    pub const fn qualifying_total(&self) -> i64 {
        self.qualifying_total
    }

    /// Positions consumed to qualify for the tier, excluded from the
    /// discount.
    pub fn qualifying_positions(&self) -> &[u32] {
        &self.qualifying_positions
    }

    /// Positions that received the tier's rate.
    pub fn discounted_positions(&self) -> &[u32] {
        &self.discounted_positions
    }
}

/// Result of applying the best tier (if any) to a set of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountResult {
    items: Vec<DiscountedItem>,
    total_before: i64,
    total_after: i64,
    applied: Option<AppliedTier>,
}

impl DiscountResult {
    /// Per-item prices before and after, in input order.
    pub fn items(&self) -> &[DiscountedItem] {
        &self.items
    }

    /// Sum of amounts before the discount.
    pub const fn total_before(&self) -> i64 {
        self.total_before
    }

    /// Sum of amounts after the discount.
    pub const fn total_after(&self) -> i64 {
        self.total_after
    }

    /// Total amount saved.
    pub const fn savings(&self) -> i64 {
        self.total_before - self.total_after
    }

    /// The winning tier, or `None` if no tier was reachable.
    pub const fn applied(&self) -> Option<&AppliedTier> {
        self.applied.as_ref()
    }
}

/// Apply the best of `tiers` to `items`.
///
/// Each tier is evaluated independently: the cheapest subset meeting its
/// threshold qualifies (and pays full price), every other item receives
/// `floor(rate × discountable)` off, where the tier's optional cap is
/// allocated across non-qualifying items in input order until exhausted.
/// Unreachable tiers are skipped; if none is reachable the items are
/// returned unchanged with no applied tier.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if a rate application cannot
/// be represented in minor units.
pub fn apply_tiered_discount(
    items: &[Item],
    tiers: &[DiscountTier],
) -> Result<DiscountResult, DiscountError> {
    let total_before = subtotal(items);

    let mut best: Option<Candidate> = None;

    for tier in tiers {
        let Some(candidate) = evaluate_tier(items, tier)? else {
            continue;
        };

        let replace = match &best {
            None => true,
            Some(current) => {
                let savings = candidate.savings();
                let current_savings = current.savings();

                savings > current_savings
                    || (savings == current_savings
                        && candidate.rate_fraction > current.rate_fraction)
            }
        };

        if replace {
            best = Some(candidate);
        }
    }

    let Some(winner) = best else {
        return Ok(DiscountResult {
            items: items.iter().map(undiscounted).collect(),
            total_before,
            total_after: total_before,
            applied: None,
        });
    };

    let total_after = winner.items.iter().map(DiscountedItem::discounted).sum();

    Ok(DiscountResult {
        items: winner.items,
        total_before,
        total_after,
        applied: Some(winner.applied),
    })
}

/// A fully-evaluated tier awaiting the best-of comparison.
#[derive(Debug)]
struct Candidate {
    items: Vec<DiscountedItem>,
    applied: AppliedTier,
    rate_fraction: Decimal,
}

impl Candidate {
    fn savings(&self) -> i64 {
        self.items.iter().map(DiscountedItem::savings).sum()
    }
}

/// Evaluate one tier against the items, or `None` if its threshold is not
/// reachable.
fn evaluate_tier(items: &[Item], tier: &DiscountTier) -> Result<Option<Candidate>, DiscountError> {
    let Some(subset) = select_minimal_qualifying_subset(items, tier.threshold()) else {
        return Ok(None);
    };

    let mut remaining_cap = tier.cap();
    let mut discounted_items = Vec::with_capacity(items.len());
    let mut discounted_positions: SmallVec<[u32; 8]> = SmallVec::new();

    for item in items {
        if subset.contains(item.position()) {
            discounted_items.push(undiscounted(item));
            continue;
        }

        let discountable = match remaining_cap {
            Some(cap) => item.amount().min(cap),
            None => item.amount(),
        };

        if let Some(cap) = remaining_cap {
            remaining_cap = Some(cap - discountable);
        }

        let discount = percent_of_minor_floored(tier.rate(), discountable)?;

        if discountable > 0 {
            discounted_positions.push(item.position());
        }

        discounted_items.push(DiscountedItem {
            position: item.position(),
            original: item.amount(),
            discounted: item.amount() - discount,
        });
    }

    Ok(Some(Candidate {
        items: discounted_items,
        applied: AppliedTier {
            key: tier.key(),
            qualifying_total: subset.total(),
            qualifying_positions: SmallVec::from_slice(subset.positions()),
            discounted_positions,
        },
        rate_fraction: tier.rate() * Decimal::ONE,
    }))
}

const fn undiscounted(item: &Item) -> DiscountedItem {
    DiscountedItem {
        position: item.position(),
        original: item.amount(),
        discounted: item.amount(),
    }
}

/// The discount amount for a rate over a minor-unit amount, rounded towards
/// zero. Floor, never round-to-nearest: fractional remainders always stay
/// with the payer.
fn percent_of_minor_floored(rate: Percentage, minor: i64) -> Result<i64, DiscountError> {
    let fraction = rate * Decimal::ONE;

    let Some(applied) = fraction.checked_mul(Decimal::from(minor)) else {
        return Err(DiscountError::PercentConversion);
    };

    applied
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
