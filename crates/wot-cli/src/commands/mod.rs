pub mod analyze;
pub mod init;
pub mod resolve;
pub mod run;

use clap::Args;
use std::path::PathBuf;

use crate::config::WotConfig;

/// Options shared by every command that reads `wot.toml`.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to the config file.
    #[arg(short, long, default_value = "wot.toml")]
    pub config: PathBuf,

    /// Override the data directory.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl CommonArgs {
    /// Load the config file, apply CLI overrides and install logging.
    pub fn setup(&self) -> anyhow::Result<WotConfig> {
        let mut config = WotConfig::load(&self.config)?;
        if let Some(ref data_dir) = self.data_dir {
            config.paths.data_dir = data_dir.clone();
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
        crate::init_tracing(&config.logging)?;
        tracing::debug!(config = %self.config.display(), "configuration loaded");
        Ok(config)
    }
}
