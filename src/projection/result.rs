use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

/// One note placed in the projection. Produced as an immutable batch by the
/// sidecar; replaced wholesale when a new result is loaded.
#[derive(Clone, Debug, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub title: String,
    pub path: String,
    #[serde(default)]
    pub top_terms: Vec<String>,
    #[serde(default = "noise_cluster")]
    pub cluster: i32,
    #[serde(default, rename = "wordCount")]
    pub word_count: Option<u32>,
    #[serde(default, rename = "readingTime")]
    pub reading_time: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub mtime: Option<i64>,
    #[serde(default)]
    pub ctime: Option<i64>,
    #[serde(default, rename = "contentPreview")]
    pub content_preview: Option<String>,
    #[serde(default, rename = "distanceToCenter")]
    pub distance_to_center: Option<f32>,
}

fn noise_cluster() -> i32 {
    -1
}

impl Point {
    pub fn is_noise(&self) -> bool {
        self.cluster == -1
    }

    pub fn model_distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClusterTerm {
    pub term: String,
    #[serde(default)]
    pub score: f32,
}

/// Cluster id (decimal string key, as the sidecar emits it) to ranked terms.
pub type ClusterTermMap = BTreeMap<String, Vec<ClusterTerm>>;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProjectionResult {
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub clusters: usize,
    #[serde(default)]
    pub cluster_terms: ClusterTermMap,
}

impl ProjectionResult {
    pub fn terms_for_cluster(&self, cluster: i32) -> Option<&[ClusterTerm]> {
        terms_for_cluster(&self.cluster_terms, cluster)
    }

    /// "t1, t2, t3" label text for a cluster, or None when the term map has
    /// no entry for it.
    pub fn cluster_label_terms(&self, cluster: i32) -> Option<String> {
        let terms = self.terms_for_cluster(cluster)?;
        Some(
            terms
                .iter()
                .take(3)
                .map(|entry| entry.term.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    pub fn cluster_count(&self) -> usize {
        if self.clusters > 0 {
            return self.clusters;
        }
        let mut ids = self
            .points
            .iter()
            .filter(|point| !point.is_noise())
            .map(|point| point.cluster)
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

pub fn terms_for_cluster(map: &ClusterTermMap, cluster: i32) -> Option<&[ClusterTerm]> {
    if cluster < 0 {
        return None;
    }
    map.get(&cluster.to_string()).map(Vec::as_slice)
}

/// Parses a sidecar response body. The server reports failures as a JSON
/// object with an `error` field and HTTP 500, but the body alone must be
/// enough to reject it.
pub fn parse_projection(raw: &str) -> Result<ProjectionResult> {
    let value: Value = serde_json::from_str(raw).context("invalid JSON projection result")?;

    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(anyhow!("projection service error: {error}"));
    }

    if value.get("points").is_none() {
        return Err(anyhow!("projection result has no points array"));
    }

    ProjectionResult::deserialize(value).context("malformed projection result")
}

/// Bare point for unit tests across the crate; fields are adjusted in place
/// where a test needs metadata.
#[cfg(test)]
pub(crate) fn test_point(title: &str, x: f32, y: f32, cluster: i32) -> Point {
    Point {
        x,
        y,
        title: title.to_owned(),
        path: format!("{title}.md"),
        top_terms: Vec::new(),
        cluster,
        word_count: None,
        reading_time: None,
        tags: Vec::new(),
        mtime: None,
        ctime: None,
        content_preview: None,
        distance_to_center: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "points": [
            {
                "x": 0.5, "y": -1.25,
                "title": "Machine Learning", "path": "ml.md",
                "top_terms": ["model", "training"],
                "cluster": 0,
                "wordCount": 420, "readingTime": 3,
                "tags": ["ai"],
                "mtime": 1714000000000,
                "contentPreview": "Notes on ML...",
                "distanceToCenter": 0.12
            },
            { "x": 2.0, "y": 3.0, "title": "Groceries", "path": "g.md",
              "top_terms": [], "cluster": -1 }
        ],
        "feature_names": ["model", "training"],
        "clusters": 1,
        "cluster_terms": {
            "0": [ {"term": "model", "score": 1.5}, {"term": "training", "score": 0.9} ]
        }
    }"#;

    #[test]
    fn parses_sidecar_result() {
        let result = parse_projection(SAMPLE).unwrap();
        assert_eq!(result.points.len(), 2);
        assert_eq!(result.clusters, 1);

        let first = &result.points[0];
        assert_eq!(first.cluster, 0);
        assert_eq!(first.word_count, Some(420));
        assert_eq!(first.distance_to_center, Some(0.12));

        let second = &result.points[1];
        assert!(second.is_noise());
        assert_eq!(second.mtime, None);
    }

    #[test]
    fn optional_point_fields_default() {
        let result = parse_projection(
            r#"{"points": [{"x": 1.0, "y": 2.0, "title": "a", "path": "a.md"}]}"#,
        )
        .unwrap();
        let point = &result.points[0];
        assert_eq!(point.cluster, -1);
        assert!(point.top_terms.is_empty());
        assert!(point.content_preview.is_none());
    }

    #[test]
    fn rejects_error_body() {
        let error = parse_projection(r#"{"error": "too few notes"}"#).unwrap_err();
        assert!(error.to_string().contains("too few notes"));
    }

    #[test]
    fn rejects_missing_points() {
        assert!(parse_projection(r#"{"clusters": 0}"#).is_err());
    }

    #[test]
    fn cluster_label_terms_joins_top_three() {
        let result = parse_projection(SAMPLE).unwrap();
        assert_eq!(
            result.cluster_label_terms(0).as_deref(),
            Some("model, training")
        );
        assert_eq!(result.cluster_label_terms(7), None);
        assert_eq!(result.cluster_label_terms(-1), None);
    }

    #[test]
    fn cluster_count_falls_back_to_point_scan() {
        let result = parse_projection(
            r#"{"points": [
                {"x": 0, "y": 0, "title": "a", "path": "a.md", "cluster": 0},
                {"x": 1, "y": 0, "title": "b", "path": "b.md", "cluster": 2},
                {"x": 2, "y": 0, "title": "c", "path": "c.md", "cluster": -1}
            ]}"#,
        )
        .unwrap();
        assert_eq!(result.cluster_count(), 2);
    }
}
