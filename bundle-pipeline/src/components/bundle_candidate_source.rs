use async_trait::async_trait;
use std::sync::Arc;

use bundle_engine::BundleEngine;

use crate::source::Source;
use crate::types::{BundleCandidate, BundleQuery};

/// Produces one priced bundle per low-seller for every branch in scope.
///
/// Proposals include loss-making pairs; the unprofitable-bundle filter
/// drops them. Branch fan-out runs on the rayon pool inside a blocking
/// task so the async runtime is never stalled.
pub struct BundleCandidateSource {
    engine: Arc<BundleEngine>,
}

impl BundleCandidateSource {
    pub fn new(engine: Arc<BundleEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Source<BundleQuery, BundleCandidate> for BundleCandidateSource {
    fn enable(&self, query: &BundleQuery) -> bool {
        !query.branch_ids.is_empty()
    }

    async fn get_candidates(&self, query: &BundleQuery) -> Result<Vec<BundleCandidate>, String> {
        let engine = Arc::clone(&self.engine);
        let branch_ids = query.branch_ids.clone();
        let proposals = tokio::task::spawn_blocking(move || engine.propose_branches(&branch_ids))
            .await
            .map_err(|e| format!("candidate generation task failed: {}", e))?;

        Ok(proposals.into_iter().map(BundleCandidate::from_suggestion).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_engine::{BundleConfig, RawTable};

    fn engine() -> Arc<BundleEngine> {
        let sales = RawTable::from_rows(
            &["branch_id", "item_id", "units_sold", "price", "unit_cost"],
            &[
                &["1", "ANCHOR", "500", "5", "3"],
                &["1", "MID1", "100", "4", "3"],
                &["1", "MID2", "120", "4", "3"],
                &["1", "MID3", "150", "5", "3"],
                &["1", "LOW", "5", "3", "2"],
                &["1", "LOSS", "5", "3", "9"],
                &["2", "ANCHOR", "500", "5", "3"],
                &["2", "LOW", "5", "3", "2"],
            ],
        );
        Arc::new(BundleEngine::from_tables(&sales, None, BundleConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn proposes_per_branch_in_scope() {
        let source = BundleCandidateSource::new(engine());
        let query = BundleQuery::new("r1", BundleConfig::default()).with_branches(vec!["1".into()]);
        let candidates = source.get_candidates(&query).await.unwrap();
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 2, "got {:?}", ids);
        assert!(ids.contains(&"1:ANCHOR+LOW"));
        assert!(ids.contains(&"1:ANCHOR+LOSS"));
        assert!(candidates.iter().all(|c| c.ranking_score.is_none()));
    }

    #[tokio::test]
    async fn disabled_without_branches() {
        let source = BundleCandidateSource::new(engine());
        assert!(!source.enable(&BundleQuery::new("r2", BundleConfig::default())));
    }
}
