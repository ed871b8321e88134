//! Gift Groups Demo
//!
//! Loads a fixture set, partitions its items into threshold groups, then
//! applies the best discount tier to the leftover spend.
//!
//! Use `-f` to load a fixture set by name
//! Use `-n` to take only the first n items
//! Use `--heuristic` to force the heuristic solver

use std::{io, time::Instant};

use anyhow::Result;
use clap::Parser;
use garland::{
    discounts::apply_tiered_discount,
    fixtures::Fixture,
    report::{write_discount_report, write_grouping_report},
    solvers::{EXACT_ITEM_LIMIT, ExactSolver, HeuristicSolver, Partitioner},
    utils::DemoArgs,
};
use humanize_duration::{Truncate, prelude::DurationExt};

/// Gift Groups Demo
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let items = fixture.first_items(args.n)?;

    let start = Instant::now();

    let result = if args.heuristic || items.len() > EXACT_ITEM_LIMIT {
        HeuristicSolver::partition(&items, fixture.threshold())?
    } else {
        ExactSolver::partition(&items, fixture.threshold())?
    };

    let discounts = apply_tiered_discount(result.leftover(), fixture.tiers())?;

    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    write_grouping_report(&mut handle, &result)?;
    write_discount_report(&mut handle, &discounts)?;

    println!("\nSolved in {}", elapsed.human(Truncate::Nano));

    Ok(())
}
