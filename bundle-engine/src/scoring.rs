//! Anchor choice and suggestion ranking.
//!
//! ```text
//! candidate_score = 0.5*anchor.units + 10*lift + 20*support - 0.1*low.units
//! ranking_score   = expected_profit + 2*lift + 50*support
//! ```
//!
//! The weights come from [`ScoringWeights`]; the values above are the defaults.
//! The ranking score reads profit, lift and support at their output
//! precision, so rows that print identically rank as ties.

use std::cmp::Ordering;

use crate::association::AssociationModel;
use crate::config::ScoringWeights;
use crate::math::{finite_or_zero, round_to};
use crate::types::{
    BundleSuggestion, ItemSalesRecord, LIFT_DECIMALS, MONEY_DECIMALS, REASON_BOOST_LOW_SELLER,
    REASON_LOSS_MAKING, SUPPORT_DECIMALS,
};

pub fn candidate_score(
    anchor: &ItemSalesRecord,
    low: &ItemSalesRecord,
    support: f64,
    lift: f64,
    w: &ScoringWeights,
) -> f64 {
    finite_or_zero(
        w.anchor_units * anchor.units_sold + w.candidate_lift * lift + w.candidate_support * support
            - w.low_units_penalty * low.units_sold,
    )
}

pub fn ranking_score(expected_profit: f64, lift: f64, support: f64, w: &ScoringWeights) -> f64 {
    let profit = round_to(expected_profit, MONEY_DECIMALS);
    let lift = round_to(lift, LIFT_DECIMALS);
    let support = round_to(support, SUPPORT_DECIMALS);
    finite_or_zero(w.rank_profit * profit + w.rank_lift * lift + w.rank_support * support)
}

pub fn reason_for(low: &ItemSalesRecord) -> &'static str {
    if low.unit_margin < 0.0 {
        REASON_LOSS_MAKING
    } else {
        REASON_BOOST_LOW_SELLER
    }
}

/// The anchor chosen for one low-seller.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorChoice<'a> {
    pub anchor: &'a ItemSalesRecord,
    pub score: f64,
    pub support: f64,
    pub lift: f64,
}

/// Highest `candidate_score` anchor for `low`; ties go to the smaller
/// anchor id. An anchor is never paired with itself.
pub fn best_anchor<'a>(
    low: &ItemSalesRecord,
    anchors: &[&'a ItemSalesRecord],
    association: &AssociationModel,
    weights: &ScoringWeights,
) -> Option<AnchorChoice<'a>> {
    anchors
        .iter()
        .filter(|a| a.item_id != low.item_id)
        .map(|&anchor| {
            let (support, lift) = association.lookup(&low.branch_id, &low.item_id, &anchor.item_id);
            AnchorChoice {
                anchor,
                score: candidate_score(anchor, low, support, lift, weights),
                support,
                lift,
            }
        })
        .max_by(|x, y| {
            x.score
                .partial_cmp(&y.score)
                .unwrap_or(Ordering::Equal)
                // max_by keeps the last maximum, so reverse the id order.
                .then_with(|| y.anchor.item_id.cmp(&x.anchor.item_id))
        })
}

/// Ranking order: score descending, then anchor and low-seller id ascending.
pub fn ranking_order(a: &BundleSuggestion, b: &BundleSuggestion) -> Ordering {
    b.ranking_score
        .partial_cmp(&a.ranking_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.anchor_id.cmp(&b.anchor_id))
        .then_with(|| a.low_id.cmp(&b.low_id))
}

/// Sort one branch's suggestions and keep the best `top_k`.
pub fn rank_branch(mut suggestions: Vec<BundleSuggestion>, top_k: usize) -> Vec<BundleSuggestion> {
    suggestions.sort_by(ranking_order);
    suggestions.truncate(top_k);
    suggestions
}
