//! Directed, reciprocity-weighted local clustering coefficient.
//!
//! For node `i` with neighbor sets `In(i)`, `Out(i)` and `All(i)`, the
//! weight toward a neighbor `j` is `w(i,j) = [j ∈ Out(i)] + [j ∈ In(i)]`.
//! The numerator sums `w(i,j) · w(i,h) · w(j,h)` over every neighbor `j`
//! and every common neighbor `h ∈ All(i) ∩ All(j)`; the denominator is
//! `2 · (degTot · (degTot - 1) - 2 · cross)` where `degTot = |In(i)| + |Out(i)|`
//! is counted from the neighbor sets and `cross` is the strong-set cross
//! degree from the connectivity table.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::error::AnalyticsError;
use crate::graph::StrongSetGraph;

/// Result for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficient {
    Value(f64),
    /// At least two neighbors but a non-positive denominator. Reported as
    /// zero.
    Degenerate,
}

impl Coefficient {
    pub fn value(self) -> f64 {
        match self {
            Self::Value(value) => value,
            Self::Degenerate => 0.0,
        }
    }
}

pub fn local_coefficient(graph: &StrongSetGraph, i: usize) -> Coefficient {
    let vi = graph.neighbors(i);
    if vi.all.len() < 2 {
        return Coefficient::Value(0.0);
    }

    let deg_tot = (vi.incoming.len() + vi.outgoing.len()) as i64;
    let denom = 2 * (deg_tot * (deg_tot - 1) - 2 * i64::from(graph.node(i).cross_degree));
    if denom <= 0 {
        return Coefficient::Degenerate;
    }

    let mut total: u64 = 0;
    for &j in &vi.all {
        let vj = graph.neighbors(j);
        // Iterate the smaller set, probe the larger.
        let (small, large) = if vi.all.len() <= vj.all.len() {
            (&vi.all, &vj.all)
        } else {
            (&vj.all, &vi.all)
        };
        let through_j: u64 = small
            .iter()
            .filter(|&&h| large.contains(&h))
            .map(|&h| vi.weight(h) * vj.weight(h))
            .sum();
        total += vi.weight(j) * through_j;
    }
    Coefficient::Value(total as f64 / denom as f64)
}

/// Coefficients of every node, in node order.
pub fn clustering_coefficients(graph: &StrongSetGraph) -> Vec<Coefficient> {
    (0..graph.len()).map(|i| local_coefficient(graph, i)).collect()
}

/// Same as [`clustering_coefficients`], fanned out across `workers`
/// blocking tasks that share the read-only graph.
pub async fn clustering_coefficients_parallel(
    graph: Arc<StrongSetGraph>,
    workers: usize,
) -> Result<Vec<Coefficient>, AnalyticsError> {
    let n = graph.len();
    let workers = workers.max(1).min(n.max(1));
    let chunk = n.div_ceil(workers).max(1);

    let mut tasks = JoinSet::new();
    for start in (0..n).step_by(chunk) {
        let graph = Arc::clone(&graph);
        let end = (start + chunk).min(n);
        tasks.spawn_blocking(move || {
            let values: Vec<Coefficient> =
                (start..end).map(|i| local_coefficient(&graph, i)).collect();
            (start, values)
        });
    }
    tracing::debug!(nodes = n, tasks = tasks.len(), "clustering workers started");

    let mut coefficients = vec![Coefficient::Value(0.0); n];
    while let Some(joined) = tasks.join_next().await {
        let (start, values) = joined.map_err(|e| AnalyticsError::Worker(e.to_string()))?;
        coefficients[start..start + values.len()].copy_from_slice(&values);
    }
    Ok(coefficients)
}

/// Mean of the per-node coefficients, zero for an empty strong set.
pub fn global_coefficient(coefficients: &[Coefficient]) -> f64 {
    if coefficients.is_empty() {
        return 0.0;
    }
    coefficients.iter().map(|c| c.value()).sum::<f64>() / coefficients.len() as f64
}
