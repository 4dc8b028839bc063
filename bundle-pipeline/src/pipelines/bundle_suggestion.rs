use async_trait::async_trait;
use std::sync::Arc;

use bundle_engine::BundleEngine;

use crate::cache::BundleCache;
use crate::candidate_pipeline::CandidatePipeline;
use crate::components::branch_scope_query_hydrator::BranchScopeQueryHydrator;
use crate::components::branch_top_k_selector::BranchTopKSelector;
use crate::components::bundle_cache_side_effect::BundleCacheSideEffect;
use crate::components::bundle_candidate_source::BundleCandidateSource;
use crate::components::ranking_scorer::RankingScorer;
use crate::components::unprofitable_bundle_filter::UnprofitableBundleFilter;
use crate::filter::Filter;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::SideEffect;
use crate::source::Source;
use crate::types::{BundleCandidate, BundleQuery};

/// Bundle suggestions for a set of branches.
///
/// Pipeline flow:
/// 1. BranchScopeQueryHydrator resolves the branch list
/// 2. BundleCandidateSource pairs each low-seller with its best anchor and prices it
/// 3. UnprofitableBundleFilter drops bundles with no positive expected profit
/// 4. RankingScorer assigns the ranking score
/// 5. BranchTopKSelector keeps the best K per branch
/// 6. BundleCacheSideEffect publishes the selection
pub struct BundleSuggestionPipeline {
    query_hydrators: Vec<Box<dyn QueryHydrator<BundleQuery>>>,
    sources: Vec<Box<dyn Source<BundleQuery, BundleCandidate>>>,
    filters: Vec<Box<dyn Filter<BundleQuery, BundleCandidate>>>,
    scorers: Vec<Box<dyn Scorer<BundleQuery, BundleCandidate>>>,
    selector: BranchTopKSelector,
    side_effects: Arc<Vec<Box<dyn SideEffect<BundleQuery, BundleCandidate>>>>,
}

impl BundleSuggestionPipeline {
    pub fn new(engine: Arc<BundleEngine>, cache: Arc<BundleCache>) -> Self {
        let query_hydrators: Vec<Box<dyn QueryHydrator<BundleQuery>>> =
            vec![Box::new(BranchScopeQueryHydrator::new(engine.branch_ids()))];

        let sources: Vec<Box<dyn Source<BundleQuery, BundleCandidate>>> =
            vec![Box::new(BundleCandidateSource::new(engine))];

        let filters: Vec<Box<dyn Filter<BundleQuery, BundleCandidate>>> =
            vec![Box::new(UnprofitableBundleFilter)];

        let scorers: Vec<Box<dyn Scorer<BundleQuery, BundleCandidate>>> = vec![Box::new(RankingScorer)];

        let side_effects: Arc<Vec<Box<dyn SideEffect<BundleQuery, BundleCandidate>>>> =
            Arc::new(vec![Box::new(BundleCacheSideEffect::new(cache))]);

        Self {
            query_hydrators,
            sources,
            filters,
            scorers,
            selector: BranchTopKSelector,
            side_effects,
        }
    }
}

#[async_trait]
impl CandidatePipeline<BundleQuery, BundleCandidate> for BundleSuggestionPipeline {
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<BundleQuery>>] {
        &self.query_hydrators
    }

    fn sources(&self) -> &[Box<dyn Source<BundleQuery, BundleCandidate>>] {
        &self.sources
    }

    fn filters(&self) -> &[Box<dyn Filter<BundleQuery, BundleCandidate>>] {
        &self.filters
    }

    fn scorers(&self) -> &[Box<dyn Scorer<BundleQuery, BundleCandidate>>] {
        &self.scorers
    }

    fn selector(&self) -> &dyn Selector<BundleQuery, BundleCandidate> {
        &self.selector
    }

    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<BundleQuery, BundleCandidate>>>> {
        Arc::clone(&self.side_effects)
    }
}
