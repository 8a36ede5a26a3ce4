//! Integration test: the analytics engine over corpora produced by the
//! resolution passes.
//!
//! The connectivity and centrality tables normally come from an external
//! shortest-path tool; here they are derived from the same edges.

use wot_analytics::{
    analyze, read_centrality, read_connectivity, AnalyticsInputs, AnalyticsReport, Analyzer,
};
use wot_core::{AnalyticsConfig, ResolverConfig};
use wot_integration_tests::{key_id, resolve_dump, strong_set_connectivity, DumpBuilder, Resolved};

fn config() -> AnalyticsConfig {
    AnalyticsConfig {
        workers: 2,
        current_year: 2010,
    }
}

/// Every key is valid; each pair certifies each other. Certifications on
/// `hash` carry that hash algorithm id.
fn mutual_dump(ids: &[String], pairs: &[(usize, usize)], hash: u8) -> String {
    let mut builder = DumpBuilder::new();
    for (i, id) in ids.iter().enumerate() {
        builder = builder.valid_key(id);
        for &(a, b) in pairs {
            let partner = match (a == i, b == i) {
                (true, _) => b,
                (_, true) => a,
                _ => continue,
            };
            builder = builder.sig_with(&ids[partner], "2006-01-01", "10", "", hash);
        }
    }
    builder.build()
}

fn mutual_edges<'a>(ids: &'a [String], pairs: &[(usize, usize)]) -> Vec<(&'a str, &'a str)> {
    pairs
        .iter()
        .flat_map(|&(a, b)| [(ids[a].as_str(), ids[b].as_str()), (ids[b].as_str(), ids[a].as_str())])
        .collect()
}

fn zero_centrality(ids: &[String]) -> String {
    ids.iter().map(|id| format!("{};0.0\n", id)).collect()
}

async fn run_analytics(resolved: &Resolved, connectivity: &str, centrality: &str) -> AnalyticsReport {
    let mut analyzer = Analyzer::new(config());
    analyzer.load_connectivity(&read_connectivity(connectivity.as_bytes()).unwrap());
    analyzer.load_centrality(&read_centrality(centrality.as_bytes()).unwrap());
    analyzer.load_edge_corpus(resolved.corpus.as_bytes()).unwrap();
    analyzer.load_key_status(resolved.status.as_bytes()).unwrap();
    analyzer.finish().await.unwrap()
}

async fn mutual_report(n: u8, pairs: &[(usize, usize)], hash: u8) -> (Vec<String>, AnalyticsReport) {
    let ids: Vec<String> = (1..=n).map(key_id).collect();
    let resolved = resolve_dump(&mutual_dump(&ids, pairs, hash), &ResolverConfig::default()).unwrap();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let connectivity = strong_set_connectivity(&id_refs, &mutual_edges(&ids, pairs));
    let report = run_analytics(&resolved, &connectivity, &zero_centrality(&ids)).await;
    (ids, report)
}

// =========================================================================
// Clustering scenarios
// =========================================================================

#[tokio::test]
async fn test_mutual_pair_has_zero_clustering() {
    let (_, report) = mutual_report(2, &[(0, 1)], 8).await;

    assert_eq!(report.strong_set_size, 2);
    for node in &report.strong_set {
        assert_eq!(node.clustering, 0.0);
        assert_eq!(node.in_degree, 1);
    }
    assert_eq!(report.global_clustering, 0.0);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[tokio::test]
async fn test_mutual_triangle_is_fully_clustered() {
    let (_, report) = mutual_report(3, &[(0, 1), (1, 2), (0, 2)], 8).await;

    for node in &report.strong_set {
        assert!(node.clustering > 0.0);
        assert!((node.clustering - 1.0).abs() < 1e-12);
    }
    assert!((report.global_clustering - 1.0).abs() < 1e-12);
    assert_eq!(report.key_statistics.totals.certified, 3);
    assert_eq!(report.certification_statistics.totals.strong, 6);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[tokio::test]
async fn test_triangle_with_pendant_key() {
    // 0-1-2 mutual triangle, 3 attached to 0 only.
    let (ids, report) = mutual_report(4, &[(0, 1), (1, 2), (0, 2), (0, 3)], 8).await;

    let clustering = |id: &str| {
        report
            .strong_set
            .iter()
            .find(|n| n.key_id.as_str() == id)
            .map(|n| n.clustering)
            .unwrap()
    };
    assert!((clustering(&ids[1]) - 1.0).abs() < 1e-12);
    assert_eq!(clustering(&ids[3]), 0.0);
    // Key 0: degTot 6, cross 3, denom 2·(30 - 6) = 48; numerator 16.
    assert!((clustering(&ids[0]) - 16.0 / 48.0).abs() < 1e-12);
    assert_eq!(report.degree_distribution.last().map(|r| r.degree), Some(3));
}

// =========================================================================
// Enumerations, diagnostics, end to end
// =========================================================================

#[tokio::test]
async fn test_unknown_hash_algorithm_lands_in_unknown_bucket() {
    let (_, report) = mutual_report(2, &[(0, 1)], 50).await;

    let unknown = report
        .certification_statistics
        .by_hash_algorithm
        .iter()
        .find(|row| row.bucket == 0)
        .unwrap();
    assert_eq!(unknown.label, "Unknown");
    assert_eq!(unknown.counts.valid, 2);
    assert_eq!(unknown.counts.strong, 2);
    assert_eq!(report.certification_statistics.totals.valid, 2);
}

#[tokio::test]
async fn test_corpus_key_missing_from_connectivity_is_diagnosed() {
    let ids: Vec<String> = (1..=2).map(key_id).collect();
    let resolved =
        resolve_dump(&mutual_dump(&ids, &[(0, 1)], 8), &ResolverConfig::default()).unwrap();
    let connectivity = strong_set_connectivity(&[ids[0].as_str()], &[]);

    let report = run_analytics(&resolved, &connectivity, &zero_centrality(&ids[..1])).await;
    assert_eq!(report.strong_set_size, 1);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.contains("absent from the connectivity table")));
}

#[tokio::test]
async fn test_end_to_end_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let ids: Vec<String> = (1..=3).map(key_id).collect();
    let pairs = [(0, 1), (1, 2), (0, 2)];
    let resolved =
        resolve_dump(&mutual_dump(&ids, &pairs, 8), &ResolverConfig::default()).unwrap();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    let inputs = AnalyticsInputs {
        connectivity: dir.path().join("msd.csv"),
        centrality: dir.path().join("centrality.csv"),
        edge_corpus: dir.path().join("preprocessed"),
        key_status: dir.path().join("keystatus.csv"),
    };
    std::fs::write(
        &inputs.connectivity,
        strong_set_connectivity(&id_refs, &mutual_edges(&ids, &pairs)),
    )
    .unwrap();
    std::fs::write(&inputs.centrality, zero_centrality(&ids)).unwrap();
    std::fs::write(&inputs.edge_corpus, &resolved.corpus).unwrap();
    std::fs::write(&inputs.key_status, &resolved.status).unwrap();

    let report = analyze(&inputs, &config()).await.unwrap();
    let target = dir.path().join("report.json");
    report.save(&target).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(json["strong_set_size"], 3);
    assert_eq!(json["reachable_set_size"], 3);
    assert_eq!(json["edge_corpus_digest"], report.edge_corpus_digest.as_str());
    assert_eq!(json["strong_set"].as_array().map(Vec::len), Some(3));
    assert_eq!(
        json["key_statistics"]["totals"]["certified"],
        serde_json::json!(3)
    );
}
