//! Utils

use clap::Parser;

/// Arguments for the grouping demos
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Number of items to take from the fixture set
    #[clap(short, long)]
    pub n: Option<usize>,

    /// Fixture set to load
    #[clap(short, long, default_value = "boutique")]
    pub fixture: String,

    /// Force the heuristic solver even below the exact item limit
    #[clap(long)]
    pub heuristic: bool,
}
