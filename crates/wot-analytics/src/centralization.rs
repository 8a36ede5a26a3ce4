use serde::Serialize;

use crate::graph::StrongSetGraph;
use crate::metrics::CentralityRecord;

/// Freeman centralization of the strong set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Centralization {
    pub max_relative: f64,
    pub index: f64,
}

/// `absolute / ((n - 1)(n - 2))`, zero for graphs with fewer than three
/// nodes.
pub fn relative_centrality(absolute: f64, n: usize) -> f64 {
    if n < 3 {
        return 0.0;
    }
    absolute / ((n - 1) as f64 * (n - 2) as f64)
}

/// Attach centrality values to strong-set nodes. Entries for keys outside
/// the strong set are returned as diagnostics and otherwise ignored.
pub fn apply_centrality(graph: &mut StrongSetGraph, records: &[CentralityRecord]) -> Vec<String> {
    let n = graph.len();
    let mut diagnostics = Vec::new();
    for record in records {
        let Some(index) = graph.index_of(&record.key_id) else {
            tracing::warn!(key = %record.key_id, "centrality entry for a key outside the strong set");
            diagnostics.push(format!(
                "centrality entry for key {} outside the strong set",
                record.key_id
            ));
            continue;
        };
        let node = graph.node_mut(index);
        node.centrality_abs = record.absolute;
        node.centrality_rel = relative_centrality(record.absolute, n);
    }
    diagnostics
}

/// `Σ(max_rel - rel_k) / (n - 1)` over all strong-set nodes.
pub fn centralization(graph: &StrongSetGraph) -> Centralization {
    let n = graph.len();
    if n < 3 {
        return Centralization::default();
    }
    let max_relative = graph
        .nodes()
        .iter()
        .map(|node| node.centrality_rel)
        .fold(f64::NEG_INFINITY, f64::max);
    let spread: f64 = graph
        .nodes()
        .iter()
        .map(|node| max_relative - node.centrality_rel)
        .sum();
    Centralization {
        max_relative,
        index: spread / (n - 1) as f64,
    }
}
