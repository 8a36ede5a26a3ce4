//! Property-based tests for the strong-set statistics.

use std::collections::HashSet;

use proptest::prelude::*;

use wot_core::KeyId;

use crate::clustering::{clustering_coefficients, Coefficient};
use crate::graph::{StrongSetGraph, StrongSetNode};
use crate::stats::describe;

fn id(index: usize) -> KeyId {
    KeyId::new(format!("{:04X}", index + 1)).unwrap()
}

/// A graph whose external degrees agree with its edges.
fn graph_strategy() -> impl Strategy<Value = StrongSetGraph> {
    (2usize..12)
        .prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..40)))
        .prop_map(|(n, raw)| {
            let edges: HashSet<(usize, usize)> =
                raw.into_iter().filter(|(from, to)| from != to).collect();
            let mut graph = StrongSetGraph::new();
            for i in 0..n {
                let out_degree = edges.iter().filter(|(from, _)| *from == i).count() as u32;
                let in_degree = edges.iter().filter(|(_, to)| *to == i).count() as u32;
                let cross_degree = edges
                    .iter()
                    .filter(|&&(from, to)| from == i && edges.contains(&(to, from)))
                    .count() as u32;
                graph.add_node(StrongSetNode {
                    key_id: id(i),
                    mean_distance: 1.0,
                    in_degree,
                    out_degree,
                    cross_degree,
                    eccentricity: 1,
                    centrality_abs: 0.0,
                    centrality_rel: 0.0,
                    clustering: 0.0,
                });
            }
            for (from, to) in &edges {
                graph.add_edge(&id(*from), &id(*to));
            }
            graph
        })
}

proptest! {
    /// Non-degenerate coefficients lie in [0, 1]; nodes with fewer than
    /// two neighbors get exactly 0.
    #[test]
    fn clustering_coefficient_bounds(graph in graph_strategy()) {
        for (i, coefficient) in clustering_coefficients(&graph).into_iter().enumerate() {
            if graph.neighbors(i).all.len() < 2 {
                prop_assert_eq!(coefficient, Coefficient::Value(0.0));
            }
            if let Coefficient::Value(value) = coefficient {
                prop_assert!((0.0..=1.0 + 1e-12).contains(&value), "node {} value {}", i, value);
            }
        }
    }

    /// Total strong-set in-degree equals total out-degree.
    #[test]
    fn in_out_conservation(graph in graph_strategy()) {
        let (incoming, outgoing) = graph.edge_degree_totals();
        prop_assert_eq!(incoming, outgoing);
        let external_in: u32 = graph.nodes().iter().map(|n| n.in_degree).sum();
        let external_out: u32 = graph.nodes().iter().map(|n| n.out_degree).sum();
        prop_assert_eq!(external_in, external_out);
    }

    /// Quartiles are ordered and bounded by the extremes.
    #[test]
    fn quartiles_are_ordered(data in prop::collection::vec(-1.0e6f64..1.0e6, 1..60)) {
        let stats = describe(&data).unwrap();
        prop_assert!(stats.min <= stats.first_quartile);
        prop_assert!(stats.first_quartile <= stats.median);
        prop_assert!(stats.median <= stats.third_quartile);
        prop_assert!(stats.third_quartile <= stats.max);
        prop_assert!(stats.variance >= 0.0);
    }
}
