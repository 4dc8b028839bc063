use async_trait::async_trait;

use crate::filter::{Filter, FilterResult};
use crate::types::{BundleCandidate, BundleQuery};

/// Removes bundles whose expected profit is not strictly positive.
pub struct UnprofitableBundleFilter;

#[async_trait]
impl Filter<BundleQuery, BundleCandidate> for UnprofitableBundleFilter {
    async fn filter(
        &self,
        query: &BundleQuery,
        candidates: Vec<BundleCandidate>,
    ) -> Result<FilterResult<BundleCandidate>, String> {
        let result = FilterResult::partition(candidates, |c| c.suggestion.expected_profit > 0.0);
        for c in &result.removed {
            log::debug!(
                "request_id={} rejected {} expected_profit={:.2}",
                query.request_id,
                c.id,
                c.suggestion.expected_profit
            );
        }
        Ok(result)
    }
}
