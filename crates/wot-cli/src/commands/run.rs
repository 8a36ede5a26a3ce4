//! `wot run` — Resolve the dump, then analyze the strong set.

use clap::Args;

use super::analyze::{analyze_stage, print_summary};
use super::resolve::resolve_stage;
use super::CommonArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the number of clustering workers (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,
}

pub async fn run(args: &RunArgs) -> anyhow::Result<()> {
    let mut config = args.common.setup()?;
    if let Some(workers) = args.workers {
        config.analytics.workers = workers;
    }

    let refinement = resolve_stage(&config)?;
    println!(
        "Resolution complete: {} certified keys, {} edge blocks",
        refinement.certified, refinement.edge_blocks
    );

    let report = analyze_stage(&config).await?;
    print_summary(&report);
    Ok(())
}
