//! `wot analyze` — Strong-set statistics over the resolved artifacts.

use anyhow::Context;
use clap::Args;

use wot_analytics::{analyze, AnalyticsInputs, AnalyticsReport};

use super::CommonArgs;
use crate::config::WotConfig;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the number of clustering workers (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Compute the report from the configured inputs and write it to
/// `paths.report`.
pub async fn analyze_stage(config: &WotConfig) -> anyhow::Result<AnalyticsReport> {
    let paths = &config.paths;
    let inputs = AnalyticsInputs {
        connectivity: paths.resolve(&paths.connectivity),
        centrality: paths.resolve(&paths.centrality),
        edge_corpus: paths.resolve(&paths.edge_corpus),
        key_status: paths.resolve(&paths.key_status),
    };
    let report = analyze(&inputs, &config.analytics)
        .await
        .context("strong-set analytics")?;

    let target = paths.resolve(&paths.report);
    report
        .save(&target)
        .with_context(|| format!("writing report {}", target.display()))?;
    Ok(report)
}

pub fn print_summary(report: &AnalyticsReport) {
    println!("Analytics complete (run {}):", report.run_id);
    println!("  Reachable set:       {}", report.reachable_set_size);
    println!("  Strong set:          {}", report.strong_set_size);
    println!(
        "  Centralization:      {:.6}",
        report.centralization.index
    );
    println!("  Global clustering:   {:.6}", report.global_clustering);
    if !report.diagnostics.is_empty() {
        println!("  Diagnostics:");
        for diagnostic in &report.diagnostics {
            println!("    - {}", diagnostic);
        }
    }
}

pub async fn run(args: &AnalyzeArgs) -> anyhow::Result<()> {
    let mut config = args.common.setup()?;
    if let Some(workers) = args.workers {
        config.analytics.workers = workers;
    }
    let report = analyze_stage(&config).await?;
    print_summary(&report);
    Ok(())
}
