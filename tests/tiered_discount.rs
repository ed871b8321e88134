//! Integration tests for the selector and tiered discount application

use decimal_percentage::Percentage;
use slotmap::SlotMap;
use testresult::TestResult;

use garland::{
    discounts::{
        DiscountTier, TierKey, apply_tiered_discount, select_minimal_qualifying_subset,
    },
    fixtures::Fixture,
    items::Item,
    solvers::{HeuristicSolver, Partitioner},
};

#[test]
fn selector_prefers_the_smallest_qualifying_total() -> TestResult {
    let items = [Item::new(100, 1), Item::new(300, 2), Item::new(50, 3)];

    let subset =
        select_minimal_qualifying_subset(&items, 120).ok_or("threshold should be reachable")?;

    // 100 + 50 = 150 beats 300 alone and 400 for the pair.
    assert_eq!(subset.total(), 150);
    assert_eq!(subset.positions(), &[1, 3]);

    Ok(())
}

#[test]
fn selector_reports_none_for_unreachable_thresholds() {
    let items = [Item::new(100, 1), Item::new(300, 2), Item::new(50, 3)];

    assert!(select_minimal_qualifying_subset(&items, 451).is_none());
}

#[test]
fn discount_is_floored_never_rounded_up() -> TestResult {
    let mut keys = SlotMap::<TierKey, ()>::with_key();
    let key = keys.insert(());

    let items = [Item::new(100, 1), Item::new(1299, 2)];
    let tier = DiscountTier::new(key, 100, Percentage::from(0.1), None)?;

    let result = apply_tiered_discount(&items, &[tier])?;

    // Position 1 qualifies; 10% of 1299 is 129.9, floored to 129.
    assert_eq!(result.savings(), 129);
    assert_eq!(result.total_after(), 1270);

    Ok(())
}

#[test]
fn qualifying_spend_is_never_discounted() -> TestResult {
    let mut keys = SlotMap::<TierKey, ()>::with_key();
    let key = keys.insert(());

    let items = [Item::new(100, 1), Item::new(300, 2), Item::new(50, 3)];
    let tier = DiscountTier::new(key, 120, Percentage::from(0.5), None)?;

    let result = apply_tiered_discount(&items, &[tier])?;
    let applied = result.applied().ok_or("expected an applied tier")?;

    assert_eq!(applied.qualifying_positions(), &[1, 3]);

    for item in result.items() {
        if applied.qualifying_positions().contains(&item.position()) {
            assert_eq!(item.savings(), 0, "qualifying items pay full price");
        }
    }

    assert_eq!(result.savings(), 150);

    Ok(())
}

#[test]
fn leftover_spend_from_grouping_feeds_the_discount() -> TestResult {
    let fixture = Fixture::from_set("boutique")?;

    let result = HeuristicSolver::partition(fixture.items(), fixture.threshold())?;

    // 2853 total spend cannot cover three 1000-groups.
    assert_eq!(result.total_gifts(), 2);

    let discounts = apply_tiered_discount(result.leftover(), fixture.tiers())?;

    assert_eq!(discounts.total_before(), result.total_amount() - result.covered_amount());
    assert!(discounts.applied().is_some());
    assert!(discounts.savings() > 0);
    assert_eq!(
        discounts.total_after(),
        discounts.total_before() - discounts.savings()
    );

    Ok(())
}

#[test]
fn best_tier_wins_across_the_fixture_set() -> TestResult {
    let fixture = Fixture::from_set("boutique")?;

    let items = [Item::new(600, 1), Item::new(129, 2), Item::new(99, 3)];
    let result = apply_tiered_discount(&items, fixture.tiers())?;

    // The 15% tier (threshold 600) saves 19 + 14; the 10% tier only 12 + 9.
    assert_eq!(result.savings(), 33);

    let applied = result.applied().ok_or("expected an applied tier")?;
    assert_eq!(applied.qualifying_positions(), &[1]);
    assert_eq!(applied.discounted_positions(), &[2, 3]);

    Ok(())
}
