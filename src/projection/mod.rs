mod client;
mod result;

pub use client::{AnalysisSettings, collect_notes, fetch_projection, load_projection_file};
pub use result::{ClusterTerm, ClusterTermMap, Point, ProjectionResult, terms_for_cluster};

#[cfg(test)]
pub(crate) use result::test_point;
