//! `wot.toml` loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::Context;
use wot_core::{AnalyticsConfig, ResolverConfig};

/// Full configuration of a `wot` run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WotConfig {
    /// Certification exclusion policy and progress reporting.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Strong-set analytics settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Input and output files.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// File names. Relative names are taken from `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Keyring dump, one colon-delimited record per line.
    #[serde(default = "default_dump")]
    pub dump: PathBuf,
    #[serde(default = "default_key_status")]
    pub key_status: PathBuf,
    #[serde(default = "default_edge_corpus")]
    pub edge_corpus: PathBuf,
    #[serde(default = "default_policy_uris")]
    pub policy_uris: PathBuf,
    /// Precomputed distance metrics, `msd.csv` layout.
    #[serde(default = "default_connectivity")]
    pub connectivity: PathBuf,
    #[serde(default = "default_centrality")]
    pub centrality: PathBuf,
    #[serde(default = "default_report")]
    pub report: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_dump() -> PathBuf {
    PathBuf::from("pgpring.dump")
}
fn default_key_status() -> PathBuf {
    PathBuf::from("keystatus.csv")
}
fn default_edge_corpus() -> PathBuf {
    PathBuf::from("preprocessed")
}
fn default_policy_uris() -> PathBuf {
    PathBuf::from("policyuris.csv")
}
fn default_connectivity() -> PathBuf {
    PathBuf::from("msd.csv")
}
fn default_centrality() -> PathBuf {
    PathBuf::from("centrality.csv")
}
fn default_report() -> PathBuf {
    PathBuf::from("report.json")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            dump: default_dump(),
            key_status: default_key_status(),
            edge_corpus: default_edge_corpus(),
            policy_uris: default_policy_uris(),
            connectivity: default_connectivity(),
            centrality: default_centrality(),
            report: default_report(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PathsConfig {
    /// `file` itself when absolute, otherwise `file` under `data_dir`.
    pub fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }

    /// Scratch file written next to `file` by the first pass.
    pub fn scratch(&self, file: &Path) -> PathBuf {
        let mut name = self.resolve(file).into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl WotConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// or any field is missing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: WotConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
