use async_trait::async_trait;
use std::sync::Arc;

use bundle_engine::BundleRow;

use crate::cache::BundleCache;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{BundleCandidate, BundleQuery};

/// Publishes the final selection into a shared [`BundleCache`], replacing
/// whatever the previous run left there.
pub struct BundleCacheSideEffect {
    cache: Arc<BundleCache>,
}

impl BundleCacheSideEffect {
    pub fn new(cache: Arc<BundleCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl SideEffect<BundleQuery, BundleCandidate> for BundleCacheSideEffect {
    async fn run(
        &self,
        input: Arc<SideEffectInput<BundleQuery, BundleCandidate>>,
    ) -> Result<(), String> {
        let rows: Vec<BundleRow> = input
            .selected_candidates
            .iter()
            .map(|c| BundleRow::from(&c.suggestion))
            .collect();
        log::info!(
            "request_id={} cached {} bundles",
            input.query.request_id,
            rows.len()
        );
        self.cache.replace(rows);
        Ok(())
    }
}
