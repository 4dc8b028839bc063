use serde::Serialize;

use crate::math::{round_to, safe_div};

/// Per-branch, per-item economics after normalization.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemSalesRecord {
    pub branch_id: String,
    pub item_id: String,
    pub units_sold: f64,
    pub price: f64,
    pub unit_cost: f64,
    pub unit_profit: f64,
    /// `unit_profit / price`, or 0 when the price is 0.
    pub unit_margin: f64,
}

impl ItemSalesRecord {
    /// Build a record, deriving profit and margin from price and cost.
    pub fn new(
        branch_id: impl Into<String>,
        item_id: impl Into<String>,
        units_sold: f64,
        price: f64,
        unit_cost: f64,
    ) -> Self {
        let unit_profit = price - unit_cost;
        Self {
            branch_id: branch_id.into(),
            item_id: item_id.into(),
            units_sold,
            price,
            unit_cost,
            unit_profit,
            unit_margin: safe_div(unit_profit, price),
        }
    }

    /// Units weighted by margin; used to prune the anchor set.
    pub fn anchor_strength(&self) -> f64 {
        self.units_sold * self.unit_margin
    }
}

/// Units sold by one item in one time bucket. Feeds the comovement fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct SalesObservation {
    pub branch_id: String,
    pub item_id: String,
    pub period: String,
    pub units_sold: f64,
}

/// How transaction rows were grouped into baskets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BasketKeyMode {
    /// One basket per order id.
    Order,
    /// One basket per customer per day.
    CustomerDay,
    /// One basket per branch-day. Coarsest grouping and a degraded signal:
    /// every same-day purchase in a branch lands in one basket.
    BranchDay,
}

/// One transaction line with its resolved basket key.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionRow {
    pub branch_id: String,
    pub item_id: String,
    pub basket_key: String,
}

/// Distinct items bought together. Items are kept sorted.
#[derive(Clone, Debug, PartialEq)]
pub struct Basket {
    pub branch_id: String,
    pub basket_id: String,
    pub items: Vec<String>,
}

/// Co-occurrence statistics for one unordered item pair in one branch.
/// `item_a < item_b` always holds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairStat {
    pub branch_id: String,
    pub item_a: String,
    pub item_b: String,
    pub support: f64,
    pub lift: f64,
}

pub const REASON_LOSS_MAKING: &str = "Loss-making item covered by bundle";
pub const REASON_BOOST_LOW_SELLER: &str = "Boost low-seller using strong anchor";

/// A priced two-item offer for one branch.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BundleSuggestion {
    pub branch_id: String,
    pub anchor_id: String,
    pub low_id: String,
    /// Fraction in [0, max_discount_pct].
    pub discount_pct: f64,
    pub bundle_price: f64,
    pub full_cost: f64,
    pub expected_profit: f64,
    pub support: f64,
    pub lift: f64,
    pub reason: String,
    pub candidate_score: f64,
    pub ranking_score: f64,
}

impl BundleSuggestion {
    /// `"anchor+low"`, the output identifier of the bundle.
    pub fn bundle_items(&self) -> String {
        format!("{}+{}", self.anchor_id, self.low_id)
    }

    pub fn to_row(&self) -> BundleRow {
        BundleRow::from(self)
    }
}

/// Decimal places kept in output rows.
pub const MONEY_DECIMALS: i32 = 2;
pub const SUPPORT_DECIMALS: i32 = 4;
pub const LIFT_DECIMALS: i32 = 3;

/// Output record with display rounding applied.
#[derive(Clone, Debug, PartialEq, Serialize, serde::Deserialize)]
pub struct BundleRow {
    pub branch_id: String,
    pub bundle_items: String,
    /// Percent with one decimal, e.g. 12.5 for a 12.5% discount.
    pub discount_pct: f64,
    pub bundle_price: f64,
    pub expected_profit: f64,
    pub support: f64,
    pub lift: f64,
    pub reason: String,
}

impl From<&BundleSuggestion> for BundleRow {
    fn from(s: &BundleSuggestion) -> Self {
        Self {
            branch_id: s.branch_id.clone(),
            bundle_items: s.bundle_items(),
            discount_pct: round_to(s.discount_pct * 100.0, 1),
            bundle_price: round_to(s.bundle_price, MONEY_DECIMALS),
            expected_profit: round_to(s.expected_profit, MONEY_DECIMALS),
            support: round_to(s.support, SUPPORT_DECIMALS),
            lift: round_to(s.lift, LIFT_DECIMALS),
            reason: s.reason.clone(),
        }
    }
}
