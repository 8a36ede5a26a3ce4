use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::breakdown::{CertificationStatistics, KeyStatistics};
use crate::centralization::Centralization;
use crate::distribution::{DegreeRow, EccentricityRow};
use crate::error::AnalyticsError;
use crate::graph::StrongSetNode;
use crate::stats::DescriptiveStats;

/// Everything one analytics run computes.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// BLAKE3 digest of the edge corpus the run consumed, hex encoded.
    pub edge_corpus_digest: String,
    pub reachable_set_size: usize,
    pub strong_set_size: usize,
    pub mean_distance_reachable: Option<DescriptiveStats>,
    pub mean_distance_strong: Option<DescriptiveStats>,
    pub eccentricity_strong: Option<DescriptiveStats>,
    pub degree_distribution: Vec<DegreeRow>,
    pub eccentricity_distribution: Vec<EccentricityRow>,
    pub centralization: Centralization,
    pub global_clustering: f64,
    pub strong_set: Vec<StrongSetNode>,
    pub key_statistics: KeyStatistics,
    pub certification_statistics: CertificationStatistics,
    /// Cross-file inconsistencies and degenerate cases met along the way.
    pub diagnostics: Vec<String>,
}

impl AnalyticsReport {
    pub fn write_json<W: Write>(&self, out: W) -> Result<(), AnalyticsError> {
        serde_json::to_writer_pretty(out, self)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), AnalyticsError> {
        let file = File::create(path).map_err(AnalyticsError::io(path))?;
        let mut out = BufWriter::new(file);
        self.write_json(&mut out)?;
        out.flush().map_err(AnalyticsError::io(path))?;
        tracing::info!(path = %path.display(), "analytics report written");
        Ok(())
    }
}
