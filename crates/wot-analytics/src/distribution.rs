use serde::Serialize;

use crate::graph::StrongSetNode;

/// Histogram row for one degree value, with the number of nodes whose
/// degree is at least that value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DegreeRow {
    pub degree: u32,
    pub in_count: usize,
    pub in_at_least: usize,
    pub out_count: usize,
    pub out_at_least: usize,
    pub cross_count: usize,
    pub cross_at_least: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EccentricityRow {
    pub eccentricity: u32,
    pub count: usize,
}

/// In/out/cross degree histogram over `0..=max degree`.
pub fn degree_distribution(nodes: &[StrongSetNode]) -> Vec<DegreeRow> {
    let max = nodes
        .iter()
        .map(|n| n.in_degree.max(n.out_degree).max(n.cross_degree))
        .max();
    let Some(max) = max else {
        return Vec::new();
    };

    let mut rows: Vec<DegreeRow> = (0..=max)
        .map(|degree| DegreeRow {
            degree,
            ..Default::default()
        })
        .collect();
    for node in nodes {
        rows[node.in_degree as usize].in_count += 1;
        rows[node.out_degree as usize].out_count += 1;
        rows[node.cross_degree as usize].cross_count += 1;
    }

    let (mut incoming, mut outgoing, mut cross) = (nodes.len(), nodes.len(), nodes.len());
    for row in &mut rows {
        row.in_at_least = incoming;
        row.out_at_least = outgoing;
        row.cross_at_least = cross;
        incoming -= row.in_count;
        outgoing -= row.out_count;
        cross -= row.cross_count;
    }
    rows
}

/// Eccentricity histogram over every value between the observed minimum
/// and maximum.
pub fn eccentricity_distribution(nodes: &[StrongSetNode]) -> Vec<EccentricityRow> {
    let (Some(min), Some(max)) = (
        nodes.iter().map(|n| n.eccentricity).min(),
        nodes.iter().map(|n| n.eccentricity).max(),
    ) else {
        return Vec::new();
    };
    let mut rows: Vec<EccentricityRow> = (min..=max)
        .map(|eccentricity| EccentricityRow {
            eccentricity,
            count: 0,
        })
        .collect();
    for node in nodes {
        rows[(node.eccentricity - min) as usize].count += 1;
    }
    rows
}
