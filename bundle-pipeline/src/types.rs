use bundle_engine::{BundleConfig, BundleSuggestion};
use serde::Serialize;

use crate::candidate_pipeline::HasRequestId;
use crate::util;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// One bundle-suggestion request.
#[derive(Clone, Debug)]
pub struct BundleQuery {
    pub request_id: String,
    /// Branches to analyze. Empty means every branch in the sales data.
    pub branch_ids: Vec<String>,
    /// Governs ranking weights and per-branch truncation.
    pub config: BundleConfig,
}

impl BundleQuery {
    pub fn new(request_id: impl Into<String>, config: BundleConfig) -> Self {
        Self {
            request_id: request_id.into(),
            branch_ids: Vec::new(),
            config,
        }
    }

    pub fn with_branches(mut self, branch_ids: Vec<String>) -> Self {
        self.branch_ids = branch_ids;
        self
    }
}

impl HasRequestId for BundleQuery {
    fn request_id(&self) -> &str {
        &self.request_id
    }
}

// ---------------------------------------------------------------------------
// Candidate types
// ---------------------------------------------------------------------------

/// A priced bundle moving through the pipeline.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BundleCandidate {
    /// `"<branch>:<anchor>+<low>"`.
    pub id: String,
    pub suggestion: BundleSuggestion,
    /// Set by the ranking scorer.
    pub ranking_score: Option<f64>,
}

impl BundleCandidate {
    pub fn from_suggestion(suggestion: BundleSuggestion) -> Self {
        Self {
            id: util::candidate_id(&suggestion.branch_id, &suggestion.anchor_id, &suggestion.low_id),
            suggestion,
            ranking_score: None,
        }
    }

    pub fn branch_id(&self) -> &str {
        &self.suggestion.branch_id
    }

    /// The suggestion with the pipeline's ranking score written back.
    pub fn into_suggestion(self) -> BundleSuggestion {
        let mut suggestion = self.suggestion;
        suggestion.ranking_score = self.ranking_score.unwrap_or(0.0);
        suggestion
    }
}
