//! `wot resolve` — Both resolution passes over the keyring dump.

use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use wot_resolve::{refine, resolve, Refinement};

use super::CommonArgs;
use crate::config::WotConfig;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn open(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Resolve the dump into the key-status table, the canonical edge corpus
/// and the policy-URI table. The first pass writes `.tmp` files that the
/// second pass consumes and removes.
pub fn resolve_stage(config: &WotConfig) -> anyhow::Result<Refinement> {
    let paths = &config.paths;
    std::fs::create_dir_all(&paths.data_dir)
        .with_context(|| format!("creating data directory {}", paths.data_dir.display()))?;

    let dump = paths.resolve(&paths.dump);
    let status_tmp = paths.scratch(&paths.key_status);
    let corpus_tmp = paths.scratch(&paths.edge_corpus);

    tracing::info!(dump = %dump.display(), "starting first pass");
    let first = {
        let mut status = create(&status_tmp)?;
        let mut corpus = create(&corpus_tmp)?;
        resolve(open(&dump)?, &mut status, &mut corpus, &config.resolver)
            .with_context(|| format!("first pass over {}", dump.display()))?
    };

    let refinement = {
        let mut corpus = create(&paths.resolve(&paths.edge_corpus))?;
        let mut status = create(&paths.resolve(&paths.key_status))?;
        let mut policy = create(&paths.resolve(&paths.policy_uris))?;
        refine(
            &first,
            open(&corpus_tmp)?,
            open(&status_tmp)?,
            &mut corpus,
            &mut status,
            &mut policy,
        )
        .context("second pass over the first-pass artifacts")?
    };

    for scratch in [&status_tmp, &corpus_tmp] {
        std::fs::remove_file(scratch)
            .with_context(|| format!("removing {}", scratch.display()))?;
    }

    tracing::info!(
        keys = first.keys,
        interesting = first.interesting.len(),
        certified = refinement.certified,
        "resolution complete"
    );
    Ok(refinement)
}

pub fn run(args: &ResolveArgs) -> anyhow::Result<()> {
    let config = args.common.setup()?;
    let refinement = resolve_stage(&config)?;

    let paths = &config.paths;
    println!("Resolution complete:");
    println!("  Certified keys:      {}", refinement.certified);
    println!("  Edge blocks:         {}", refinement.edge_blocks);
    println!("  Certifications:      {}", refinement.certifications);
    println!("  Policy URIs:         {}", refinement.policy_uris);
    println!(
        "  Key status table:    {}",
        paths.resolve(&paths.key_status).display()
    );
    println!(
        "  Edge corpus:         {}",
        paths.resolve(&paths.edge_corpus).display()
    );
    Ok(())
}
