//! Margin-constrained bundle pricing.
//!
//! The bundle must keep `target_bundle_margin` after discount:
//!
//! ```text
//! price * (1 - d) - cost >= m * price * (1 - d)
//! (1 - d) >= cost / ((1 - m) * price)
//! ```
//!
//! The largest admissible `d`, capped at `max_discount_pct`, is proposed.
//! Discounts under `min_discount_pct` become a plain cross-sell at 0%.

use crate::config::BundleConfig;
use crate::math::finite_or_zero;
use crate::types::ItemSalesRecord;

/// A priced pair, before scoring.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleQuote {
    pub full_price: f64,
    pub full_cost: f64,
    pub discount_pct: f64,
    pub bundle_price: f64,
    pub expected_profit: f64,
}

impl BundleQuote {
    /// A loss-making or break-even bundle is never proposed.
    pub fn is_profitable(&self) -> bool {
        self.expected_profit > 0.0
    }
}

/// Largest discount that keeps the target margin, before the cap.
pub fn max_discount_for_margin(full_price: f64, full_cost: f64, target_margin: f64) -> f64 {
    let denom = (1.0 - target_margin) * full_price;
    let min_keep = if denom > 0.0 {
        finite_or_zero(full_cost / denom)
    } else {
        1.0
    };
    (1.0 - min_keep).max(0.0)
}

/// Price an (anchor, low-seller) pair.
///
/// Always returns a quote; callers drop it when [`BundleQuote::is_profitable`]
/// is false.
pub fn price_bundle(anchor: &ItemSalesRecord, low: &ItemSalesRecord, config: &BundleConfig) -> BundleQuote {
    let full_price = anchor.price + low.price;
    let full_cost = anchor.unit_cost + low.unit_cost;

    let allowed = max_discount_for_margin(full_price, full_cost, config.target_bundle_margin);
    let mut discount_pct = config.max_discount_pct.min(allowed).max(0.0);
    if discount_pct < config.min_discount_pct {
        discount_pct = 0.0;
    }

    let bundle_price = finite_or_zero(full_price * (1.0 - discount_pct));
    BundleQuote {
        full_price,
        full_cost,
        discount_pct,
        bundle_price,
        expected_profit: finite_or_zero(bundle_price - full_cost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, cost: f64) -> ItemSalesRecord {
        ItemSalesRecord::new("1", id, 1.0, price, cost)
    }

    #[test]
    fn discount_follows_margin_formula() {
        // price 8, cost 5.9: min_keep = 5.9 / (0.85 * 8) = 0.867647…
        let quote = price_bundle(&item("A", 5.0, 3.0), &item("L", 3.0, 2.9), &BundleConfig::default());
        let expected = 1.0 - 5.9 / (0.85 * 8.0);
        assert!((quote.discount_pct - expected).abs() < 1e-12);
        assert!((quote.bundle_price - 8.0 * (1.0 - expected)).abs() < 1e-12);
        assert!(quote.is_profitable());
        // Bundle margin lands exactly on target.
        let margin = quote.expected_profit / quote.bundle_price;
        assert!((margin - 0.15).abs() < 1e-9);
    }

    #[test]
    fn discount_is_capped() {
        let quote = price_bundle(&item("A", 10.0, 1.0), &item("L", 10.0, 1.0), &BundleConfig::default());
        assert_eq!(quote.discount_pct, 0.25);
        assert!((quote.bundle_price - 15.0).abs() < 1e-12);
    }

    #[test]
    fn tiny_discounts_snap_to_zero() {
        // min_keep = 6.75 / (0.85 * 8) = 0.99264… → allowed ≈ 0.0074
        let quote = price_bundle(&item("A", 5.0, 4.0), &item("L", 3.0, 2.75), &BundleConfig::default());
        assert_eq!(quote.discount_pct, 0.0);
        assert_eq!(quote.bundle_price, 8.0);
        assert!(quote.is_profitable());
    }

    #[test]
    fn loss_making_pair_is_flagged() {
        let quote = price_bundle(&item("A", 5.0, 4.0), &item("L", 3.0, 6.0), &BundleConfig::default());
        assert_eq!(quote.discount_pct, 0.0);
        assert!(!quote.is_profitable());
    }

    #[test]
    fn zero_price_keeps_everything() {
        assert_eq!(max_discount_for_margin(0.0, 1.0, 0.15), 0.0);
        let quote = price_bundle(&item("A", 0.0, 0.0), &item("L", 0.0, 0.0), &BundleConfig::default());
        assert_eq!(quote.discount_pct, 0.0);
        assert!(!quote.is_profitable());
    }
}
