//! The strong-set graph: one node per strong-set key, neighbor sets built
//! from the canonical edge corpus.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use wot_core::KeyId;

use crate::metrics::ConnectivityRecord;

/// Per-node values, external metrics plus the locally computed ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrongSetNode {
    pub key_id: KeyId,
    pub mean_distance: f64,
    pub in_degree: u32,
    pub out_degree: u32,
    pub cross_degree: u32,
    pub eccentricity: u32,
    pub centrality_abs: f64,
    pub centrality_rel: f64,
    pub clustering: f64,
}

impl From<&ConnectivityRecord> for StrongSetNode {
    fn from(record: &ConnectivityRecord) -> Self {
        Self {
            key_id: record.key_id.clone(),
            mean_distance: record.mean_distance,
            in_degree: record.in_degree_strong,
            out_degree: record.out_degree_strong,
            cross_degree: record.cross_degree_strong,
            eccentricity: record.eccentricity,
            centrality_abs: 0.0,
            centrality_rel: 0.0,
            clustering: 0.0,
        }
    }
}

/// Node indices adjacent to one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// Issuers that certified this node.
    pub incoming: HashSet<usize>,
    /// Signees this node certified.
    pub outgoing: HashSet<usize>,
    pub all: HashSet<usize>,
}

impl Neighbors {
    /// Reciprocity weight toward `other`: 0, 1 or 2.
    pub fn weight(&self, other: usize) -> u64 {
        u64::from(self.outgoing.contains(&other)) + u64::from(self.incoming.contains(&other))
    }
}

/// Arena of strong-set nodes and their neighbor sets. Built once, then
/// read-only.
#[derive(Debug, Clone, Default)]
pub struct StrongSetGraph {
    index: HashMap<KeyId, usize>,
    nodes: Vec<StrongSetNode>,
    neighbors: Vec<Neighbors>,
}

impl StrongSetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns its index, or `None` if the key is already a
    /// member.
    pub fn add_node(&mut self, node: StrongSetNode) -> Option<usize> {
        if self.index.contains_key(&node.key_id) {
            return None;
        }
        let index = self.nodes.len();
        self.index.insert(node.key_id.clone(), index);
        self.nodes.push(node);
        self.neighbors.push(Neighbors::default());
        Some(index)
    }

    /// Record a certification from `signer` to `signee`. Returns false if
    /// either endpoint is outside the strong set.
    pub fn add_edge(&mut self, signer: &KeyId, signee: &KeyId) -> bool {
        let (Some(&from), Some(&to)) = (self.index.get(signer), self.index.get(signee)) else {
            return false;
        };
        self.neighbors[to].incoming.insert(from);
        self.neighbors[from].outgoing.insert(to);
        self.neighbors[to].all.insert(from);
        self.neighbors[from].all.insert(to);
        true
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key_id: &KeyId) -> bool {
        self.index.contains_key(key_id)
    }

    pub fn index_of(&self, key_id: &KeyId) -> Option<usize> {
        self.index.get(key_id).copied()
    }

    pub fn node(&self, index: usize) -> &StrongSetNode {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut StrongSetNode {
        &mut self.nodes[index]
    }

    pub fn nodes(&self) -> &[StrongSetNode] {
        &self.nodes
    }

    pub fn neighbors(&self, index: usize) -> &Neighbors {
        &self.neighbors[index]
    }

    /// Total (in, out) degree over the loaded edges. Equal by construction
    /// for a consistent corpus.
    pub fn edge_degree_totals(&self) -> (usize, usize) {
        self.neighbors.iter().fold((0, 0), |(incoming, outgoing), n| {
            (incoming + n.incoming.len(), outgoing + n.outgoing.len())
        })
    }

    pub fn into_nodes(self) -> Vec<StrongSetNode> {
        self.nodes
    }
}
