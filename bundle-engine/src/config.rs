//! Run configuration and scoring policy.
//!
//! The scoring weights are a policy surface rather than derived constants.
//! The defaults reproduce the production formula exactly; change them only
//! with a re-baselined evaluation.

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, BundleResult};

/// Fraction of each branch's sales distribution treated as low-sellers.
pub const DEFAULT_LOW_SALES_QUANTILE: f64 = 0.30;
/// Sales quantile an item must reach to act as an anchor.
pub const DEFAULT_ANCHOR_SALES_QUANTILE: f64 = 0.70;
/// Minimum unit margin for an anchor.
pub const DEFAULT_MIN_UNIT_MARGIN: f64 = 0.10;
/// Margin the discounted bundle must still earn.
pub const DEFAULT_TARGET_BUNDLE_MARGIN: f64 = 0.15;
/// Upper bound on any proposed discount.
pub const DEFAULT_MAX_DISCOUNT_PCT: f64 = 0.25;
/// Suggestions kept per branch after ranking.
pub const DEFAULT_TOP_K_PER_BRANCH: usize = 10;
/// Anchors retained per branch after strength pruning.
pub const DEFAULT_MAX_ANCHORS_PER_BRANCH: usize = 30;
/// Discounts below this are snapped to 0 (plain cross-sell).
pub const DEFAULT_MIN_DISCOUNT_PCT: f64 = 0.01;

/// Linear weights for the candidate and ranking scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub anchor_units: f64,
    pub candidate_lift: f64,
    pub candidate_support: f64,
    pub low_units_penalty: f64,
    pub rank_profit: f64,
    pub rank_lift: f64,
    pub rank_support: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            anchor_units: 0.5,
            candidate_lift: 10.0,
            candidate_support: 20.0,
            low_units_penalty: 0.1,
            rank_profit: 1.0,
            rank_lift: 2.0,
            rank_support: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub low_sales_quantile: f64,
    pub anchor_sales_quantile: f64,
    pub min_unit_margin: f64,
    pub target_bundle_margin: f64,
    pub max_discount_pct: f64,
    pub top_k_per_branch: usize,
    pub max_anchors_per_branch: usize,
    pub min_discount_pct: f64,
    pub weights: ScoringWeights,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            low_sales_quantile: DEFAULT_LOW_SALES_QUANTILE,
            anchor_sales_quantile: DEFAULT_ANCHOR_SALES_QUANTILE,
            min_unit_margin: DEFAULT_MIN_UNIT_MARGIN,
            target_bundle_margin: DEFAULT_TARGET_BUNDLE_MARGIN,
            max_discount_pct: DEFAULT_MAX_DISCOUNT_PCT,
            top_k_per_branch: DEFAULT_TOP_K_PER_BRANCH,
            max_anchors_per_branch: DEFAULT_MAX_ANCHORS_PER_BRANCH,
            min_discount_pct: DEFAULT_MIN_DISCOUNT_PCT,
            weights: ScoringWeights::default(),
        }
    }
}

impl BundleConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> BundleResult<Self> {
        let config: BundleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &str) -> BundleResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> BundleResult<()> {
        unit_interval("low_sales_quantile", self.low_sales_quantile)?;
        unit_interval("anchor_sales_quantile", self.anchor_sales_quantile)?;
        unit_interval("min_unit_margin", self.min_unit_margin)?;
        unit_interval("target_bundle_margin", self.target_bundle_margin)?;
        unit_interval("max_discount_pct", self.max_discount_pct)?;
        unit_interval("min_discount_pct", self.min_discount_pct)?;

        if self.top_k_per_branch == 0 {
            return Err(BundleError::invalid("top_k_per_branch", "must be at least 1"));
        }
        if self.max_anchors_per_branch == 0 {
            return Err(BundleError::invalid(
                "max_anchors_per_branch",
                "must be at least 1",
            ));
        }

        let w = &self.weights;
        let all_finite = [
            w.anchor_units,
            w.candidate_lift,
            w.candidate_support,
            w.low_units_penalty,
            w.rank_profit,
            w.rank_lift,
            w.rank_support,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(BundleError::invalid("weights", "every weight must be finite"));
        }
        Ok(())
    }
}

fn unit_interval(field: &'static str, value: f64) -> BundleResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BundleError::invalid(
            field,
            format!("expected a value in [0, 1], got {}", value),
        ))
    }
}
