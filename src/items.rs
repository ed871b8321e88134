//! Items
//!
//! Raw basket entries and the sanitizer that turns them into engine items.
//! Amounts are integer minor units; `position` is the stable identity of an
//! item (its original input order, 1-based when auto-assigned). Amounts may
//! repeat, so everything downstream tracks items by position, never by amount
//! or array index.

use serde::Deserialize;

/// A sanitized basket item: a positive integer amount plus the stable
/// position it occupied in the caller's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    amount: i64,
    position: u32,
}

impl Item {
    /// Create an item from an already-validated amount and position.
    pub const fn new(amount: i64, position: u32) -> Self {
        Self { amount, position }
    }

    /// Amount in integer minor units. Always positive for sanitized items.
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Stable identity of this item in the caller's input.
    pub const fn position(&self) -> u32 {
        self.position
    }
}

/// A raw entry as collected by the caller, prior to sanitisation.
///
/// Amounts arrive as floats (the surrounding form accepts locale-formatted
/// numbers); positions are optional and filled in from input order.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawItem {
    /// Raw amount; floored to an integer by [`sanitize`].
    pub amount: f64,

    /// Optional caller-assigned position.
    #[serde(default)]
    pub position: Option<u32>,
}

impl RawItem {
    /// Create a raw entry without an explicit position.
    pub const fn new(amount: f64) -> Self {
        Self {
            amount,
            position: None,
        }
    }

    /// Create a raw entry with an explicit position.
    pub const fn at(amount: f64, position: u32) -> Self {
        Self {
            amount,
            position: Some(position),
        }
    }
}

impl From<Item> for RawItem {
    #[expect(clippy::cast_precision_loss, reason = "amounts are minor units, far below 2^52")]
    fn from(item: Item) -> Self {
        Self {
            amount: item.amount() as f64,
            position: Some(item.position()),
        }
    }
}

/// Normalize raw entries into engine items.
///
/// Each amount is floored to an integer; entries whose floored amount is
/// non-finite or not positive are discarded. Entries without a position get
/// `index + 1` in input order. Relative order of kept entries is preserved.
/// Bad data is filtered, never reported as an error, so re-running sanitize
/// on its own output is a no-op.
pub fn sanitize(raw: &[RawItem]) -> Vec<Item> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.amount.is_finite() {
                return None;
            }

            let floored = entry.amount.floor();

            if floored <= 0.0 || floored >= 9_007_199_254_740_992.0 {
                // 2^53: beyond exact f64 integer range, treat as malformed.
                return None;
            }

            #[expect(
                clippy::cast_possible_truncation,
                reason = "floored value is checked to be within exact integer range"
            )]
            let amount = floored as i64;

            let position = entry
                .position
                .or_else(|| u32::try_from(index + 1).ok())?;

            Some(Item::new(amount, position))
        })
        .collect()
}

/// Sum of the amounts of a slice of items.
pub fn subtotal(items: &[Item]) -> i64 {
    items.iter().map(Item::amount).sum()
}
