//! `wot init` — Write a default configuration file.

use clap::Args;
use std::path::PathBuf;

use crate::config::WotConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path of the config file to create.
    #[arg(short, long, default_value = "wot.toml")]
    pub config: PathBuf,

    /// Data directory to record in the new config.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    if args.config.exists() && !args.force {
        anyhow::bail!(
            "configuration file already exists at {}",
            args.config.display()
        );
    }

    let mut config = WotConfig::default();
    if let Some(ref data_dir) = args.data_dir {
        config.paths.data_dir = data_dir.clone();
    }
    config.save(&args.config)?;
    std::fs::create_dir_all(&config.paths.data_dir)?;

    println!("Wrote default configuration to {}", args.config.display());
    println!(
        "Place the keyring dump at {}",
        config.paths.resolve(&config.paths.dump).display()
    );
    println!("Run 'wot run' to resolve the dump and compute statistics.");
    Ok(())
}
