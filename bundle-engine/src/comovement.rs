//! Comovement fallback for runs without transactions.
//!
//! Approximates "bought together" from how two items' sales move across
//! time buckets. The Pearson correlation `r` of the two series is mapped to
//! a pseudo support `(r + 1) / 2`, and the pseudo lift is `1 + support`.
//! This is a heuristic and a weaker signal than mined basket statistics.

use std::collections::{BTreeSet, HashMap};

use crate::math::pearson;
use crate::types::SalesObservation;

/// Sales series of every item in one branch, pivoted by time bucket.
/// Missing (item, bucket) cells read as 0 units.
#[derive(Clone, Debug, Default)]
pub struct BranchSeries {
    buckets: usize,
    by_item: HashMap<String, Vec<f64>>,
}

impl BranchSeries {
    pub fn from_observations<'a, I>(observations: I) -> Self
    where
        I: IntoIterator<Item = &'a SalesObservation>,
    {
        let observations: Vec<&SalesObservation> = observations.into_iter().collect();
        let periods: BTreeSet<&str> = observations.iter().map(|o| o.period.as_str()).collect();
        let slot: HashMap<&str, usize> = periods.iter().enumerate().map(|(i, p)| (*p, i)).collect();

        let mut by_item: HashMap<String, Vec<f64>> = HashMap::new();
        for o in &observations {
            let series = by_item
                .entry(o.item_id.clone())
                .or_insert_with(|| vec![0.0; periods.len()]);
            if let Some(&i) = slot.get(o.period.as_str()) {
                series[i] += o.units_sold;
            }
        }

        Self {
            buckets: periods.len(),
            by_item,
        }
    }

    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Pseudo support in [0, 1]; 0 when either series is missing or the
    /// correlation is undefined.
    pub fn pseudo_support(&self, item_a: &str, item_b: &str) -> f64 {
        if self.buckets < 2 {
            return 0.0;
        }
        let (Some(a), Some(b)) = (self.by_item.get(item_a), self.by_item.get(item_b)) else {
            return 0.0;
        };
        match pearson(a, b) {
            Some(r) => ((r + 1.0) / 2.0).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}

/// `(support, lift)` for the fallback path.
pub fn fallback_association(series: Option<&BranchSeries>, item_a: &str, item_b: &str) -> (f64, f64) {
    let support = series
        .map(|s| s.pseudo_support(item_a, item_b))
        .unwrap_or(0.0);
    (support, 1.0 + support)
}
