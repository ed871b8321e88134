//! Fixtures
//!
//! YAML fixture sets for demos and tests. A set is a single file holding a
//! grouping threshold, raw items, and optional discount tiers, loaded from a
//! base path (default `./fixtures`).

use std::{fs, path::PathBuf};

use decimal_percentage::Percentage;
use serde::Deserialize;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    discounts::{DiscountError, DiscountTier, TierKey},
    items::{Item, RawItem, sanitize},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid tier definition
    #[error("Invalid discount tier: {0}")]
    Discount(#[from] DiscountError),

    /// Not enough items in fixture
    #[error("Not enough items in fixture, available: {available}, requested: {requested}")]
    NotEnoughItems {
        /// Number of sanitized items in the fixture
        available: usize,
        /// Number of items requested
        requested: usize,
    },
}

/// On-disk shape of one fixture set.
#[derive(Debug, Deserialize)]
struct SetFixture {
    threshold: i64,
    items: Vec<RawItem>,

    #[serde(default)]
    tiers: Vec<TierFixture>,
}

#[derive(Debug, Deserialize)]
struct TierFixture {
    threshold: i64,
    rate: f64,

    #[serde(default)]
    cap: Option<i64>,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Grouping threshold for the set
    threshold: i64,

    /// Raw entries as they appeared in the file
    raw_items: Vec<RawItem>,

    /// Sanitized items
    items: Vec<Item>,

    /// `SlotMap` generating the tier keys
    tier_keys: SlotMap<TierKey, ()>,

    /// Built discount tiers, in file order
    tiers: Vec<DiscountTier>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            threshold: 0,
            raw_items: Vec::new(),
            items: Vec::new(),
            tier_keys: SlotMap::with_key(),
            tiers: Vec::new(),
        }
    }

    /// Load a fixture set from `<base path>/<name>.yml`, replacing any
    /// previously loaded set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a tier
    /// definition is invalid.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: SetFixture = serde_norway::from_str(&contents)?;

        self.threshold = fixture.threshold;
        self.items = sanitize(&fixture.items);
        self.raw_items = fixture.items;
        self.tier_keys = SlotMap::with_key();
        self.tiers = Vec::with_capacity(fixture.tiers.len());

        for tier in fixture.tiers {
            let key = self.tier_keys.insert(());

            self.tiers.push(DiscountTier::new(
                key,
                tier.threshold,
                Percentage::from(tier.rate),
                tier.cap,
            )?);
        }

        Ok(self)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get the grouping threshold
    pub const fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Get the raw entries as they appeared in the file
    pub fn raw_items(&self) -> &[RawItem] {
        &self.raw_items
    }

    /// Get the sanitized items
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Get the discount tiers
    pub fn tiers(&self) -> &[DiscountTier] {
        &self.tiers
    }

    /// Get the first `n` sanitized items, or all of them
    ///
    /// # Errors
    ///
    /// Returns an error if `n` exceeds the number of items in the set.
    pub fn first_items(&self, n: Option<usize>) -> Result<Vec<Item>, FixtureError> {
        if let Some(n) = n
            && n > self.items.len()
        {
            return Err(FixtureError::NotEnoughItems {
                requested: n,
                available: self.items.len(),
            });
        }

        Ok(self
            .items
            .iter()
            .take(n.unwrap_or(self.items.len()))
            .copied()
            .collect())
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use testresult::TestResult;

    use super::*;

    const SET: &str = "\
threshold: 1000
items:
  - amount: 600.5
  - amount: 500.0
  - amount: -3.0
  - amount: 400.0
    position: 9
tiers:
  - threshold: 120
    rate: 0.10
  - threshold: 800
    rate: 0.25
    cap: 500
";

    fn write_set(dir: &std::path::Path, name: &str, contents: &str) -> TestResult {
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_threshold_items_and_tiers() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path(), "basic", SET)?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_set("basic")?;

        assert_eq!(fixture.threshold(), 1000);
        assert_eq!(fixture.raw_items().len(), 4);

        // The negative entry is dropped; 600.5 floors; the explicit position
        // survives.
        assert_eq!(
            fixture.items(),
            &[Item::new(600, 1), Item::new(500, 2), Item::new(400, 9)]
        );

        assert_eq!(fixture.tiers().len(), 2);
        assert_eq!(fixture.tiers().first().map(DiscountTier::threshold), Some(120));
        assert_eq!(fixture.tiers().last().and_then(DiscountTier::cap), Some(500));

        Ok(())
    }

    #[test]
    fn fixture_tier_keys_are_distinct() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path(), "basic", SET)?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_set("basic")?;

        let keys: Vec<TierKey> = fixture.tiers().iter().map(DiscountTier::key).collect();

        assert_eq!(keys.len(), 2);
        assert_ne!(keys.first(), keys.last());

        Ok(())
    }

    #[test]
    fn fixture_first_items_limits_and_validates() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path(), "basic", SET)?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_set("basic")?;

        assert_eq!(fixture.first_items(Some(2))?.len(), 2);
        assert_eq!(fixture.first_items(None)?.len(), 3);

        assert!(matches!(
            fixture.first_items(Some(10)),
            Err(FixtureError::NotEnoughItems {
                requested: 10,
                available: 3
            })
        ));

        Ok(())
    }

    #[test]
    fn fixture_rejects_invalid_tier_rate() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(
            dir.path(),
            "bad_rate",
            "threshold: 100\nitems:\n  - amount: 50.0\ntiers:\n  - threshold: 10\n    rate: 1.5\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_set("bad_rate");

        assert!(matches!(result, Err(FixtureError::Discount(_))));

        Ok(())
    }

    #[test]
    fn fixture_missing_file_is_an_io_error() {
        let mut fixture = Fixture::new();
        let result = fixture.load_set("does-not-exist");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.items.is_empty());
        assert!(fixture.tiers.is_empty());
    }

    #[test]
    fn bundled_boutique_set_loads() -> TestResult {
        let fixture = Fixture::from_set("boutique")?;

        assert!(fixture.threshold() > 0);
        assert!(!fixture.items().is_empty());
        assert!(!fixture.tiers().is_empty());

        Ok(())
    }
}
