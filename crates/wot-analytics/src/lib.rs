//! WoT Analytics — Graph statistics over the strong set of the web of trust.
//!
//! This crate provides:
//! - [`StrongSetGraph`] — the read-only arena of strong-set nodes and their
//!   neighbor sets.
//! - [`describe`] — descriptive statistics of a numeric series.
//! - [`degree_distribution`] / [`eccentricity_distribution`] — histograms.
//! - [`centralization`] — Freeman graph centralization.
//! - [`local_coefficient`] / [`clustering_coefficients_parallel`] — the
//!   directed local clustering coefficient.
//! - [`Analyzer`] / [`analyze`] — a full run producing an [`AnalyticsReport`].

pub mod breakdown;
pub mod centralization;
pub mod clustering;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod report;
pub mod stats;

#[cfg(test)]
mod proptests;

// Re-exports for convenience.
pub use breakdown::{
    CertificationStatistics, CertificationStatisticsBuilder, KeyStatistics, KeyStatisticsBuilder,
};
pub use centralization::{apply_centrality, centralization, relative_centrality, Centralization};
pub use clustering::{
    clustering_coefficients, clustering_coefficients_parallel, global_coefficient,
    local_coefficient, Coefficient,
};
pub use distribution::{degree_distribution, eccentricity_distribution, DegreeRow, EccentricityRow};
pub use engine::{analyze, AnalyticsInputs, Analyzer};
pub use error::AnalyticsError;
pub use graph::{Neighbors, StrongSetGraph, StrongSetNode};
pub use metrics::{read_centrality, read_connectivity, CentralityRecord, ConnectivityRecord};
pub use report::AnalyticsReport;
pub use stats::{describe, DescriptiveStats};
