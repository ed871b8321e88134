//! Report
//!
//! Plain-text table rendering of grouping and discount results, writable to
//! any [`io::Write`] target.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    discounts::{DiscountResult, DiscountedItem},
    items::{Item, subtotal},
    solvers::OptimizationResult,
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Write a table of the qualifying groups and the leftover, followed by a
/// short summary.
///
/// # Errors
///
/// Returns [`ReportError::IO`] if the report cannot be written.
pub fn write_grouping_report(
    mut out: impl io::Write,
    result: &OptimizationResult,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Group", "Amounts", "Positions", "Total", "Surplus"]);

    for (index, group) in result.groups().iter().enumerate() {
        builder.push_record([
            (index + 1).to_string(),
            amounts_cell(group.items()),
            positions_cell(group.items()),
            group.total().to_string(),
            group.surplus(result.threshold()).to_string(),
        ]);
    }

    if !result.leftover().is_empty() {
        builder.push_record([
            "leftover".to_string(),
            amounts_cell(result.leftover()),
            positions_cell(result.leftover()),
            subtotal(result.leftover()).to_string(),
            String::new(),
        ]);
    }

    write_table(&mut out, builder)?;

    writeln!(
        out,
        " Threshold: {}  Gifts earned: {}  Covered: {} of {}",
        result.threshold(),
        result.total_gifts(),
        result.covered_amount(),
        result.total_amount(),
    )
    .map_err(|_err| ReportError::IO)
}

/// Write a per-item table of a discount application, followed by the totals.
///
/// # Errors
///
/// Returns [`ReportError::IO`] if the report cannot be written.
pub fn write_discount_report(
    mut out: impl io::Write,
    result: &DiscountResult,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Position", "Original", "Discounted", "Savings", "Role"]);

    for item in result.items() {
        builder.push_record([
            item.position().to_string(),
            item.original().to_string(),
            item.discounted().to_string(),
            item.savings().to_string(),
            role_cell(result, item).to_string(),
        ]);
    }

    write_table(&mut out, builder)?;

    writeln!(
        out,
        " Before: {}  After: {}  Saved: {}",
        result.total_before(),
        result.total_after(),
        result.savings(),
    )
    .map_err(|_err| ReportError::IO)
}

fn role_cell(result: &DiscountResult, item: &DiscountedItem) -> &'static str {
    let Some(applied) = result.applied() else {
        return "full price";
    };

    if applied.qualifying_positions().contains(&item.position()) {
        "qualifying"
    } else if applied.discounted_positions().contains(&item.position()) {
        "discounted"
    } else {
        "full price"
    }
}

fn write_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReportError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..5), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReportError::IO)
}

fn amounts_cell(items: &[Item]) -> String {
    items
        .iter()
        .map(|item| item.amount().to_string())
        .collect::<Vec<_>>()
        .join(" + ")
}

fn positions_cell(items: &[Item]) -> String {
    items
        .iter()
        .map(|item| item.position().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{
        discounts::{DiscountTier, TierKey, apply_tiered_discount},
        solvers::{HeuristicSolver, Partitioner},
    };

    use super::*;

    #[test]
    fn grouping_report_lists_groups_and_leftover() -> TestResult {
        let items = [
            Item::new(600, 1),
            Item::new(500, 2),
            Item::new(300, 3),
        ];

        let result = HeuristicSolver::partition(&items, 1000)?;

        let mut rendered = Vec::new();
        write_grouping_report(&mut rendered, &result)?;

        let text = String::from_utf8(rendered)?;

        assert!(text.contains("600 + 500"));
        assert!(text.contains("leftover"));
        assert!(text.contains("Gifts earned: 1"));
        assert!(text.contains("Covered: 1100 of 1400"));

        Ok(())
    }

    #[test]
    fn discount_report_labels_item_roles() -> TestResult {
        let mut keys = SlotMap::<TierKey, ()>::with_key();
        let key = keys.insert(());

        let items = [Item::new(100, 1), Item::new(300, 2), Item::new(50, 3)];
        let tier = DiscountTier::new(key, 120, Percentage::from(0.1), None)?;
        let result = apply_tiered_discount(&items, &[tier])?;

        let mut rendered = Vec::new();
        write_discount_report(&mut rendered, &result)?;

        let text = String::from_utf8(rendered)?;

        assert!(text.contains("qualifying"));
        assert!(text.contains("discounted"));
        assert!(text.contains("Saved: 30"));

        Ok(())
    }
}
