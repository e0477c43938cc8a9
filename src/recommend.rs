use std::collections::BTreeMap;

use crate::projection::{ClusterTermMap, Point, terms_for_cluster};

pub const MAX_CONNECTIONS: usize = 10;
const CENTRAL_MEMBERS_PER_CLUSTER: usize = 3;
const INTRA_CLUSTER_MAX_DISTANCE: f32 = 0.5;
const CROSS_CLUSTER_MAX_DISTANCE: f32 = 0.2;
const CONNECTION_CLUSTER_TERMS: usize = 5;

/// A candidate related-note pair. Produced fresh on every request and only
/// consumed by the review panel; never persisted.
#[derive(Clone, Debug)]
pub struct Connection<'a> {
    pub source: &'a Point,
    pub target: &'a Point,
    /// In [0, 100], derived from planar distance.
    pub similarity: f32,
    /// Intersection of the pair's top terms, source order preserved.
    pub common_terms: Vec<String>,
    /// Up to five terms from the shared cluster; empty for cross-cluster pairs.
    pub cluster_terms: Vec<String>,
    pub reason: String,
}

/// Ranks candidate note pairs from cluster centrality and spatial proximity.
/// Deterministic for a given input; an empty result is not an error.
pub fn recommend<'a>(points: &'a [Point], cluster_terms: &ClusterTermMap) -> Vec<Connection<'a>> {
    let mut candidates = Vec::new();
    intra_cluster_pass(points, cluster_terms, &mut candidates);
    cross_cluster_pass(points, &mut candidates);

    candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    candidates.truncate(MAX_CONNECTIONS);
    candidates
}

/// Pairs among the three most central members of each cluster.
fn intra_cluster_pass<'a>(
    points: &'a [Point],
    cluster_terms: &ClusterTermMap,
    out: &mut Vec<Connection<'a>>,
) {
    let mut clusters: BTreeMap<i32, Vec<&'a Point>> = BTreeMap::new();
    for point in points {
        if !point.is_noise() {
            clusters.entry(point.cluster).or_default().push(point);
        }
    }

    for (cluster, mut members) in clusters {
        if members.len() < 2 {
            continue;
        }

        // Missing centrality sorts last; ties keep insertion order.
        members.sort_by(|a, b| centrality(a).total_cmp(&centrality(b)));
        let central = &members[..members.len().min(CENTRAL_MEMBERS_PER_CLUSTER)];

        let shared_terms = terms_for_cluster(cluster_terms, cluster)
            .map(|terms| {
                terms
                    .iter()
                    .take(CONNECTION_CLUSTER_TERMS)
                    .map(|entry| entry.term.clone())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        for (index, source) in central.iter().enumerate() {
            for target in &central[index + 1..] {
                let distance = source.model_distance(target);
                if distance > INTRA_CLUSTER_MAX_DISTANCE {
                    continue;
                }

                out.push(Connection {
                    source,
                    target,
                    similarity: 100.0 - (distance * 100.0).min(100.0),
                    common_terms: common_terms(source, target),
                    cluster_terms: shared_terms.clone(),
                    reason: format!(
                        "Both are among the most central notes of cluster {cluster}"
                    ),
                });
            }
        }
    }
}

/// Pairs from different (or no) clusters that sit close together and share
/// at least one keyword.
fn cross_cluster_pass<'a>(points: &'a [Point], out: &mut Vec<Connection<'a>>) {
    for (index, source) in points.iter().enumerate() {
        for target in &points[index + 1..] {
            if source.cluster == target.cluster && !source.is_noise() {
                continue;
            }

            let distance = source.model_distance(target);
            if distance > CROSS_CLUSTER_MAX_DISTANCE {
                continue;
            }

            let common_terms = common_terms(source, target);
            if common_terms.is_empty() {
                continue;
            }

            out.push(Connection {
                source,
                target,
                similarity: 100.0 - (distance * 200.0).min(100.0),
                common_terms,
                cluster_terms: Vec::new(),
                reason: "Spatially adjacent notes sharing keywords".to_owned(),
            });
        }
    }
}

fn centrality(point: &Point) -> f32 {
    point.distance_to_center.unwrap_or(f32::INFINITY)
}

fn common_terms(source: &Point, target: &Point) -> Vec<String> {
    source
        .top_terms
        .iter()
        .filter(|term| target.top_terms.contains(term))
        .cloned()
        .collect()
}
