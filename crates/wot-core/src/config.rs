use serde::{Deserialize, Serialize};

use crate::types::HashAlgorithm;

/// Exclusion policy and progress reporting for the resolution passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Drop certifications the dump flags as expired.
    #[serde(default = "default_true")]
    pub exclude_expired_certifications: bool,
    /// Drop certifications revoked by their issuer.
    #[serde(default = "default_true")]
    pub exclude_revoked_certifications: bool,
    /// Drop certifications made with a deprecated hash algorithm.
    #[serde(default)]
    pub exclude_deprecated_hash_algorithms: bool,
    /// Numeric ids of the deprecated hash algorithms.
    #[serde(default)]
    pub deprecated_hash_algorithms: Vec<u8>,
    /// Log progress every this many keys. Zero disables progress logging.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

impl ResolverConfig {
    /// Whether `hash` is excluded by the deprecated-hash policy.
    pub fn is_deprecated(&self, hash: HashAlgorithm) -> bool {
        self.exclude_deprecated_hash_algorithms
            && self.deprecated_hash_algorithms.contains(&u8::from(hash))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            exclude_expired_certifications: true,
            exclude_revoked_certifications: true,
            exclude_deprecated_hash_algorithms: false,
            deprecated_hash_algorithms: Vec::new(),
            progress_interval: default_progress_interval(),
        }
    }
}

/// Settings for the strong-set analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyticsConfig {
    /// Worker tasks for the clustering coefficient. Zero means one per
    /// available CPU.
    #[serde(default)]
    pub workers: usize,
    /// Year used to bucket key creation dates in the future. Zero means
    /// the current year.
    #[serde(default)]
    pub current_year: i32,
}

fn default_true() -> bool {
    true
}
fn default_progress_interval() -> usize {
    100_000
}
