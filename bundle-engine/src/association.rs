//! Pair association lookup: mined basket statistics when transactions are
//! available, the comovement heuristic otherwise.

use std::collections::{BTreeMap, HashMap};

use crate::baskets::baskets_from_table;
use crate::comovement::{fallback_association, BranchSeries};
use crate::economics::NormalizedSales;
use crate::error::BundleResult;
use crate::pairs::{mine_pair_stats, PairIndex};
use crate::table::RawTable;
use crate::types::{BasketKeyMode, SalesObservation};

/// Lift assumed for a pair that never co-occurred in any basket.
pub const NEUTRAL_LIFT: f64 = 1.0;

#[derive(Clone, Debug)]
pub enum AssociationModel {
    /// Support and lift mined from baskets.
    Transactions {
        mode: BasketKeyMode,
        baskets: usize,
        pairs: PairIndex,
    },
    /// Pseudo support from sales-series correlation, per branch.
    Comovement { series: HashMap<String, BranchSeries> },
}

impl AssociationModel {
    /// Pick the model for a run. An absent or empty transaction table
    /// selects the comovement fallback.
    pub fn from_inputs(sales: &NormalizedSales, transactions: Option<&RawTable>) -> BundleResult<Self> {
        match transactions {
            Some(table) if !table.is_empty() => {
                let (mode, baskets) = baskets_from_table(table)?;
                let pairs = mine_pair_stats(&baskets);
                log::info!(
                    "association=transactions mode={:?} baskets={} pairs={}",
                    mode,
                    baskets.len(),
                    pairs.len()
                );
                Ok(AssociationModel::Transactions {
                    mode,
                    baskets: baskets.len(),
                    pairs,
                })
            }
            _ => {
                log::info!(
                    "association=comovement series_rows={} (no transactions supplied)",
                    sales.series.len()
                );
                Ok(Self::comovement(&sales.series))
            }
        }
    }

    pub fn comovement(observations: &[SalesObservation]) -> Self {
        let mut by_branch: BTreeMap<&str, Vec<&SalesObservation>> = BTreeMap::new();
        for o in observations {
            by_branch.entry(o.branch_id.as_str()).or_default().push(o);
        }
        let series = by_branch
            .into_iter()
            .map(|(branch, obs)| (branch.to_string(), BranchSeries::from_observations(obs)))
            .collect();
        AssociationModel::Comovement { series }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AssociationModel::Comovement { .. })
    }

    /// `(support, lift)` of an unordered pair within a branch.
    pub fn lookup(&self, branch_id: &str, x: &str, y: &str) -> (f64, f64) {
        match self {
            AssociationModel::Transactions { pairs, .. } => pairs
                .get(branch_id, x, y)
                .map(|p| (p.support, p.lift))
                .unwrap_or((0.0, NEUTRAL_LIFT)),
            AssociationModel::Comovement { series } => {
                fallback_association(series.get(branch_id), x, y)
            }
        }
    }
}
