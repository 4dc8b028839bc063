//! Low-seller / anchor partitioning per branch.

use std::cmp::Ordering;

use crate::config::BundleConfig;
use crate::math::quantile;
use crate::types::ItemSalesRecord;

/// Units-sold quantile of a branch's rows. Pure; exposed for testing.
pub fn sales_threshold(rows: &[ItemSalesRecord], q: f64) -> f64 {
    let units: Vec<f64> = rows.iter().map(|r| r.units_sold).collect();
    quantile(&units, q)
}

/// A branch's promotion candidates.
#[derive(Clone, Debug, Default)]
pub struct CandidateSets<'a> {
    pub low_threshold: f64,
    pub anchor_threshold: f64,
    /// In input order.
    pub low_sellers: Vec<&'a ItemSalesRecord>,
    /// Strongest first, at most `max_anchors_per_branch`.
    pub anchors: Vec<&'a ItemSalesRecord>,
}

impl CandidateSets<'_> {
    /// A branch with no low-sellers or no anchors produces nothing.
    pub fn is_empty(&self) -> bool {
        self.low_sellers.is_empty() || self.anchors.is_empty()
    }
}

/// Partition one branch's items.
///
/// Low-sellers: `units_sold <= Q(low_sales_quantile)`.
/// Anchors: `units_sold >= Q(anchor_sales_quantile)` and
/// `unit_margin >= min_unit_margin`, ranked by `units_sold * unit_margin`
/// (ties by item id) and truncated.
pub fn select_candidates<'a>(rows: &'a [ItemSalesRecord], config: &BundleConfig) -> CandidateSets<'a> {
    let low_threshold = sales_threshold(rows, config.low_sales_quantile);
    let anchor_threshold = sales_threshold(rows, config.anchor_sales_quantile);

    let low_sellers: Vec<&ItemSalesRecord> = rows
        .iter()
        .filter(|r| r.units_sold <= low_threshold)
        .collect();

    let mut anchors: Vec<&ItemSalesRecord> = rows
        .iter()
        .filter(|r| r.units_sold >= anchor_threshold && r.unit_margin >= config.min_unit_margin)
        .collect();
    anchors.sort_by(|a, b| {
        b.anchor_strength()
            .partial_cmp(&a.anchor_strength())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    anchors.truncate(config.max_anchors_per_branch);

    CandidateSets {
        low_threshold,
        anchor_threshold,
        low_sellers,
        anchors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, units: f64, price: f64, cost: f64) -> ItemSalesRecord {
        ItemSalesRecord::new("1", id, units, price, cost)
    }

    #[test]
    fn two_item_branch_splits_into_low_and_anchor() {
        let rows = vec![item("ANC", 500.0, 5.0, 3.0), item("LOW", 5.0, 3.0, 2.9)];
        let sets = select_candidates(&rows, &BundleConfig::default());
        // Q(0.3) = 5 + 0.3 * 495, Q(0.7) = 5 + 0.7 * 495
        assert!((sets.low_threshold - 153.5).abs() < 1e-9);
        assert!((sets.anchor_threshold - 351.5).abs() < 1e-9);
        assert_eq!(sets.low_sellers.len(), 1);
        assert_eq!(sets.low_sellers[0].item_id, "LOW");
        assert_eq!(sets.anchors.len(), 1);
        assert_eq!(sets.anchors[0].item_id, "ANC");
    }

    #[test]
    fn thin_margin_items_cannot_anchor() {
        let rows = vec![item("HOT", 500.0, 5.0, 4.9), item("LOW", 5.0, 3.0, 2.0)];
        let sets = select_candidates(&rows, &BundleConfig::default());
        assert!(sets.anchors.is_empty());
        assert!(sets.is_empty());
    }

    #[test]
    fn anchors_pruned_by_strength() {
        let mut rows: Vec<ItemSalesRecord> = (0..40)
            .map(|i| item(&format!("A{:02}", i), 1000.0 + i as f64, 10.0, 5.0))
            .collect();
        rows.push(item("LOW", 1.0, 10.0, 5.0));
        let config = BundleConfig {
            anchor_sales_quantile: 0.0,
            ..BundleConfig::default()
        };
        let sets = select_candidates(&rows, &config);
        assert_eq!(sets.anchors.len(), 30);
        assert_eq!(sets.anchors[0].item_id, "A39");
    }

    #[test]
    fn threshold_is_a_pure_function_of_rows() {
        let rows = vec![item("A", 1.0, 1.0, 0.5), item("B", 3.0, 1.0, 0.5)];
        assert_eq!(sales_threshold(&rows, 0.5), 2.0);
        assert_eq!(sales_threshold(&[], 0.5), 0.0);
    }
}
