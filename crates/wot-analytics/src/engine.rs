//! Orchestration of one analytics run.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use wot_core::{AnalyticsConfig, KeyId};
use wot_resolve::{EdgeCorpusReader, StatusTableReader};

use crate::breakdown::{CertificationStatisticsBuilder, KeyStatistics, KeyStatisticsBuilder};
use crate::centralization::{apply_centrality, centralization};
use crate::clustering::{clustering_coefficients_parallel, global_coefficient, Coefficient};
use crate::distribution::{degree_distribution, eccentricity_distribution};
use crate::error::AnalyticsError;
use crate::graph::{StrongSetGraph, StrongSetNode};
use crate::metrics::{read_centrality, read_connectivity, CentralityRecord, ConnectivityRecord};
use crate::report::AnalyticsReport;
use crate::stats::describe;

/// Files consumed by [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalyticsInputs {
    pub connectivity: PathBuf,
    pub centrality: PathBuf,
    pub edge_corpus: PathBuf,
    pub key_status: PathBuf,
}

/// Hashes everything read through it.
struct DigestReader<R> {
    inner: R,
    hasher: blake3::Hasher,
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

/// Incremental analytics state. Load the connectivity table first, then
/// centrality, the edge corpus and the status table, then [`finish`].
///
/// [`finish`]: Analyzer::finish
pub struct Analyzer {
    config: AnalyticsConfig,
    reachable: HashSet<KeyId>,
    reachable_msd: Vec<f64>,
    graph: StrongSetGraph,
    /// Strong-set (in, out) degree totals from the connectivity table.
    external_totals: (u64, u64),
    certifications: CertificationStatisticsBuilder,
    keys: Option<KeyStatistics>,
    corpus_digest: String,
    diagnostics: Vec<String>,
}

impl Analyzer {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            reachable: HashSet::new(),
            reachable_msd: Vec::new(),
            graph: StrongSetGraph::new(),
            external_totals: (0, 0),
            certifications: CertificationStatisticsBuilder::new(),
            keys: None,
            corpus_digest: String::new(),
            diagnostics: Vec::new(),
        }
    }

    fn diagnostic(&mut self, message: String) {
        tracing::warn!(diagnostic = %message, "cross-file inconsistency");
        self.diagnostics.push(message);
    }

    fn current_year(&self) -> u32 {
        let year = if self.config.current_year > 0 {
            self.config.current_year
        } else {
            Utc::now().year()
        };
        u32::try_from(year).unwrap_or_default()
    }

    pub fn load_connectivity(&mut self, records: &[ConnectivityRecord]) {
        let mut duplicates = 0usize;
        for record in records {
            self.reachable.insert(record.key_id.clone());
            self.reachable_msd.push(record.mean_distance);
            if !record.in_strong_set {
                continue;
            }
            if self.graph.add_node(StrongSetNode::from(record)).is_none() {
                duplicates += 1;
                continue;
            }
            self.external_totals.0 += u64::from(record.in_degree_strong);
            self.external_totals.1 += u64::from(record.out_degree_strong);
        }
        if duplicates > 0 {
            self.diagnostic(format!(
                "{} repeated strong-set keys in the connectivity table; first occurrence kept",
                duplicates
            ));
        }
        let (incoming, outgoing) = self.external_totals;
        if incoming != outgoing {
            self.diagnostic(format!(
                "connectivity table strong-set degree totals differ: in {} out {}",
                incoming, outgoing
            ));
        }
        tracing::info!(
            reachable = self.reachable.len(),
            strong = self.graph.len(),
            "connectivity table loaded"
        );
    }

    pub fn load_centrality(&mut self, records: &[CentralityRecord]) {
        for message in apply_centrality(&mut self.graph, records) {
            self.diagnostics.push(message);
        }
    }

    /// Scan the edge corpus: certification tables, strong-set edges and
    /// the corpus digest.
    pub fn load_edge_corpus<R: BufRead>(&mut self, reader: R) -> Result<(), AnalyticsError> {
        let mut reader = BufReader::new(DigestReader {
            inner: reader,
            hasher: blake3::Hasher::new(),
        });
        let mut missing: HashSet<KeyId> = HashSet::new();
        let mut strong_edges = 0usize;

        for block in EdgeCorpusReader::new(&mut reader) {
            let block = block?;
            let signee_reachable = self.reachable.contains(&block.signee);
            if !signee_reachable {
                missing.insert(block.signee.clone());
            }
            for entry in &block.entries {
                let signer_reachable = self.reachable.contains(&entry.issuer);
                if !signer_reachable {
                    missing.insert(entry.issuer.clone());
                }
                let strong = self.graph.add_edge(&entry.issuer, &block.signee);
                if strong {
                    strong_edges += 1;
                }
                self.certifications
                    .record(entry, signee_reachable && signer_reachable, strong);
            }
        }
        self.corpus_digest = reader.into_inner().hasher.finalize().to_hex().to_string();

        if !missing.is_empty() {
            self.diagnostic(format!(
                "{} keys in the edge corpus are absent from the connectivity table",
                missing.len()
            ));
        }
        tracing::info!(
            strong_edges,
            digest = %self.corpus_digest,
            "edge corpus loaded"
        );
        Ok(())
    }

    pub fn load_key_status<R: BufRead>(&mut self, reader: R) -> Result<(), AnalyticsError> {
        let mut builder = KeyStatisticsBuilder::new(self.current_year());
        for line in StatusTableReader::new(reader) {
            let line = line?;
            let reachable = self.reachable.contains(&line.key_id);
            let strong = self.graph.contains(&line.key_id);
            builder.record(&line, reachable, strong);
        }
        self.keys = Some(builder.finish(self.reachable.len(), self.graph.len()));
        Ok(())
    }

    fn workers(&self) -> usize {
        if self.config.workers > 0 {
            return self.config.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub async fn finish(mut self) -> Result<AnalyticsReport, AnalyticsError> {
        // Edge-derived in and out totals agree by construction; conservation
        // is checked against the connectivity table's degrees.
        let (edge_in, edge_out) = self.graph.edge_degree_totals();
        if (edge_in as u64, edge_out as u64) != self.external_totals {
            self.diagnostic(format!(
                "strong-set degree totals differ between the connectivity table (in {} out {}) and the edge corpus (in {} out {})",
                self.external_totals.0, self.external_totals.1, edge_in, edge_out
            ));
        }

        let workers = self.workers();
        let graph = Arc::new(std::mem::take(&mut self.graph));
        let coefficients = clustering_coefficients_parallel(Arc::clone(&graph), workers).await?;
        let mut graph = Arc::try_unwrap(graph).unwrap_or_else(|shared| (*shared).clone());

        let mut degenerate = 0usize;
        for (index, coefficient) in coefficients.iter().enumerate() {
            if *coefficient == Coefficient::Degenerate {
                degenerate += 1;
                tracing::warn!(key = %graph.node(index).key_id, "degenerate clustering denominator");
            }
            graph.node_mut(index).clustering = coefficient.value();
        }
        if degenerate > 0 {
            self.diagnostics.push(format!(
                "{} strong-set keys have a non-positive clustering denominator; coefficient set to 0",
                degenerate
            ));
        }
        let global_clustering = global_coefficient(&coefficients);

        let strong_msd: Vec<f64> = graph.nodes().iter().map(|n| n.mean_distance).collect();
        let strong_ecc: Vec<f64> = graph
            .nodes()
            .iter()
            .map(|n| f64::from(n.eccentricity))
            .collect();
        let centralization = centralization(&graph);
        let current_year = self.current_year();
        let reachable_set_size = self.reachable.len();
        let strong_set_size = graph.len();

        tracing::info!(
            reachable = reachable_set_size,
            strong = strong_set_size,
            workers,
            global_clustering,
            centralization = centralization.index,
            "analytics complete"
        );

        Ok(AnalyticsReport {
            run_id: Uuid::now_v7(),
            generated_at: Utc::now(),
            edge_corpus_digest: self.corpus_digest,
            reachable_set_size,
            strong_set_size,
            mean_distance_reachable: describe(&self.reachable_msd),
            mean_distance_strong: describe(&strong_msd),
            eccentricity_strong: describe(&strong_ecc),
            degree_distribution: degree_distribution(graph.nodes()),
            eccentricity_distribution: eccentricity_distribution(graph.nodes()),
            centralization,
            global_clustering,
            key_statistics: self.keys.unwrap_or_else(|| {
                KeyStatisticsBuilder::new(current_year).finish(reachable_set_size, strong_set_size)
            }),
            certification_statistics: self.certifications.finish(),
            strong_set: graph.into_nodes(),
            diagnostics: self.diagnostics,
        })
    }
}

fn open(path: &Path) -> Result<BufReader<File>, AnalyticsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(AnalyticsError::io(path))
}

/// Run the full analytics pipeline over the files named in `inputs`.
pub async fn analyze(
    inputs: &AnalyticsInputs,
    config: &AnalyticsConfig,
) -> Result<AnalyticsReport, AnalyticsError> {
    let mut analyzer = Analyzer::new(config.clone());

    let connectivity = read_connectivity(open(&inputs.connectivity)?)?;
    analyzer.load_connectivity(&connectivity);
    drop(connectivity);

    let centrality = read_centrality(open(&inputs.centrality)?)?;
    analyzer.load_centrality(&centrality);

    analyzer.load_edge_corpus(open(&inputs.edge_corpus)?)?;
    analyzer.load_key_status(open(&inputs.key_status)?)?;
    analyzer.finish().await
}
