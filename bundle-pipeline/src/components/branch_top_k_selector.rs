use std::cmp::Ordering;

use crate::selector::Selector;
use crate::types::{BundleCandidate, BundleQuery};

/// Keeps the best `top_k_per_branch` bundles of each branch.
///
/// Ties on ranking score go to the smaller anchor id, then the smaller
/// low-seller id.
pub struct BranchTopKSelector;

impl Selector<BundleQuery, BundleCandidate> for BranchTopKSelector {
    fn score(&self, candidate: &BundleCandidate) -> f64 {
        candidate.ranking_score.unwrap_or(f64::NEG_INFINITY)
    }

    fn tie_break(&self, a: &BundleCandidate, b: &BundleCandidate) -> Ordering {
        a.suggestion
            .anchor_id
            .cmp(&b.suggestion.anchor_id)
            .then_with(|| a.suggestion.low_id.cmp(&b.suggestion.low_id))
    }

    fn partition(&self, candidate: &BundleCandidate) -> Option<String> {
        Some(candidate.branch_id().to_string())
    }

    fn size(&self, query: &BundleQuery) -> Option<usize> {
        Some(query.config.top_k_per_branch)
    }
}
