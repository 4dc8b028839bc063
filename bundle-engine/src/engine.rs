//! Bundle generation over all branches.
//!
//! Each branch owns its slice of the item records and is processed on its
//! own rayon task; results are concatenated in branch order, so the output
//! is deterministic regardless of scheduling.

use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::association::AssociationModel;
use crate::candidates::select_candidates;
use crate::config::BundleConfig;
use crate::economics::{normalize_item_sales, NormalizedSales};
use crate::error::BundleResult;
use crate::pricing::price_bundle;
use crate::scoring::{best_anchor, rank_branch, ranking_score, reason_for};
use crate::table::RawTable;
use crate::types::{BundleSuggestion, ItemSalesRecord};

/// Per-branch outcome counts, for reporting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BranchReport {
    pub branch_id: String,
    pub items: usize,
    pub low_sellers: usize,
    pub anchors: usize,
    pub proposed: usize,
    pub rejected: usize,
    pub emitted: usize,
}

/// Normalized inputs and association model for one run.
pub struct BundleEngine {
    config: BundleConfig,
    sales: NormalizedSales,
    association: AssociationModel,
    branches: BTreeMap<String, Vec<ItemSalesRecord>>,
}

impl BundleEngine {
    /// Normalize inputs and pick the association model.
    ///
    /// This is where configuration errors surface; nothing after
    /// construction fails.
    pub fn from_tables(
        item_sales: &RawTable,
        transactions: Option<&RawTable>,
        config: BundleConfig,
    ) -> BundleResult<Self> {
        config.validate()?;
        let sales = normalize_item_sales(item_sales)?;
        let association = AssociationModel::from_inputs(&sales, transactions)?;
        Ok(Self::new(sales, association, config))
    }

    pub fn new(sales: NormalizedSales, association: AssociationModel, config: BundleConfig) -> Self {
        let mut branches: BTreeMap<String, Vec<ItemSalesRecord>> = BTreeMap::new();
        for record in &sales.records {
            branches
                .entry(record.branch_id.clone())
                .or_default()
                .push(record.clone());
        }
        Self {
            config,
            sales,
            association,
            branches,
        }
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    pub fn sales(&self) -> &NormalizedSales {
        &self.sales
    }

    pub fn association(&self) -> &AssociationModel {
        &self.association
    }

    /// Branch ids in ascending order.
    pub fn branch_ids(&self) -> Vec<String> {
        self.branches.keys().cloned().collect()
    }

    /// One priced proposal per low-seller, before the profit check and
    /// ranking, so `ranking_score` is still 0. Loss-making proposals are
    /// included so callers can count rejections. An unknown branch yields
    /// nothing.
    pub fn propose_for_branch(&self, branch_id: &str) -> Vec<BundleSuggestion> {
        self.propose(branch_id).0
    }

    fn propose(&self, branch_id: &str) -> (Vec<BundleSuggestion>, BranchReport) {
        let mut report = BranchReport {
            branch_id: branch_id.to_string(),
            ..BranchReport::default()
        };
        let Some(rows) = self.branches.get(branch_id) else {
            return (Vec::new(), report);
        };
        let sets = select_candidates(rows, &self.config);
        report.items = rows.len();
        report.low_sellers = sets.low_sellers.len();
        report.anchors = sets.anchors.len();
        if sets.is_empty() {
            log::debug!(
                "branch_id={} skipped: low_sellers={} anchors={}",
                branch_id,
                report.low_sellers,
                report.anchors
            );
            return (Vec::new(), report);
        }

        let weights = &self.config.weights;
        let proposals: Vec<BundleSuggestion> = sets
            .low_sellers
            .iter()
            .filter_map(|low| {
                let choice = best_anchor(low, &sets.anchors, &self.association, weights)?;
                let quote = price_bundle(choice.anchor, low, &self.config);
                Some(BundleSuggestion {
                    branch_id: branch_id.to_string(),
                    anchor_id: choice.anchor.item_id.clone(),
                    low_id: low.item_id.clone(),
                    discount_pct: quote.discount_pct,
                    bundle_price: quote.bundle_price,
                    full_cost: quote.full_cost,
                    expected_profit: quote.expected_profit,
                    support: choice.support,
                    lift: choice.lift,
                    reason: reason_for(low).to_string(),
                    candidate_score: choice.score,
                    ranking_score: 0.0,
                })
            })
            .collect();
        report.proposed = proposals.len();
        (proposals, report)
    }

    /// Proposals for several branches, computed in parallel and concatenated
    /// in the order given.
    pub fn propose_branches(&self, branch_ids: &[String]) -> Vec<BundleSuggestion> {
        let per_branch: Vec<Vec<BundleSuggestion>> = branch_ids
            .par_iter()
            .map(|id| self.propose_for_branch(id))
            .collect();
        per_branch.into_iter().flatten().collect()
    }

    /// Profitable, ranked, truncated suggestions for one branch.
    pub fn suggest_for_branch(&self, branch_id: &str) -> (Vec<BundleSuggestion>, BranchReport) {
        let (proposed, mut report) = self.propose(branch_id);
        let (kept, rejected): (Vec<_>, Vec<_>) = proposed
            .into_iter()
            .partition(|s| s.expected_profit > 0.0);
        for r in &rejected {
            log::debug!(
                "branch_id={} rejected {} expected_profit={:.2}",
                branch_id,
                r.bundle_items(),
                r.expected_profit
            );
        }

        let weights = &self.config.weights;
        let scored = kept
            .into_iter()
            .map(|mut s| {
                s.ranking_score = ranking_score(s.expected_profit, s.lift, s.support, weights);
                s
            })
            .collect();
        let ranked = rank_branch(scored, self.config.top_k_per_branch);

        report.rejected = rejected.len();
        report.emitted = ranked.len();
        (ranked, report)
    }

    /// Run every branch in parallel and concatenate in branch order.
    pub fn run(&self) -> (Vec<BundleSuggestion>, Vec<BranchReport>) {
        let ids = self.branch_ids();
        self.run_branches(&ids)
    }

    /// Run the given branches in parallel. Unknown ids contribute nothing.
    pub fn run_branches(&self, branch_ids: &[String]) -> (Vec<BundleSuggestion>, Vec<BranchReport>) {
        let per_branch: Vec<(Vec<BundleSuggestion>, BranchReport)> = branch_ids
            .par_iter()
            .map(|id| self.suggest_for_branch(id))
            .collect();

        let mut suggestions = Vec::new();
        let mut reports = Vec::with_capacity(per_branch.len());
        for (rows, report) in per_branch {
            suggestions.extend(rows);
            reports.push(report);
        }
        (suggestions, reports)
    }
}

/// One-shot entry point: normalize, mine, price, rank.
pub fn generate_bundle_suggestions(
    item_sales: &RawTable,
    transactions: Option<&RawTable>,
    config: &BundleConfig,
) -> BundleResult<Vec<BundleSuggestion>> {
    let engine = BundleEngine::from_tables(item_sales, transactions, config.clone())?;
    Ok(engine.run().0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales(rows: &[&[&str]]) -> RawTable {
        RawTable::from_rows(&["branch_id", "item_id", "units_sold", "price", "unit_cost"], rows)
    }

    #[test]
    fn unknown_branch_is_empty() {
        let engine =
            BundleEngine::from_tables(&sales(&[&["1", "A", "1", "1", "0.5"]]), None, BundleConfig::default())
                .unwrap();
        assert!(engine.propose_for_branch("nope").is_empty());
        let (rows, report) = engine.suggest_for_branch("nope");
        assert!(rows.is_empty());
        assert_eq!(report.items, 0);
    }

    #[test]
    fn rejected_proposals_are_counted() {
        // Low-seller costs far more than it sells for; anchor cannot cover it.
        let engine = BundleEngine::from_tables(
            &sales(&[&["1", "ANC", "500", "5", "3"], &["1", "LOW", "5", "3", "9"]]),
            None,
            BundleConfig::default(),
        )
        .unwrap();
        assert_eq!(engine.propose_for_branch("1").len(), 1);
        let (rows, report) = engine.suggest_for_branch("1");
        assert!(rows.is_empty());
        assert_eq!(report.rejected, 1);
        assert_eq!(report.emitted, 0);
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let config = BundleConfig {
            max_discount_pct: 2.0,
            ..BundleConfig::default()
        };
        assert!(BundleEngine::from_tables(&sales(&[]), None, config).is_err());
    }

    #[test]
    fn branch_ids_are_sorted() {
        let engine = BundleEngine::from_tables(
            &sales(&[&["b", "A", "1", "1", "0.5"], &["a", "A", "1", "1", "0.5"]]),
            None,
            BundleConfig::default(),
        )
        .unwrap();
        assert_eq!(engine.branch_ids(), vec!["a".to_string(), "b".to_string()]);
    }
}
