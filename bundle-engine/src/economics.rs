//! Item economics normalization.
//!
//! Resolves the heterogeneous item-sales schemas into one
//! [`ItemSalesRecord`] per (branch, item):
//!
//! - item id: `item_id`, else `product_id`
//! - units: `units_sold`, else `units` (absent ⇒ 0 for every row)
//! - price: `price`, else `unit_price`, else `revenue / units_sold`
//! - unit cost: `unit_cost`, else total cost (`cost`, else `revenue - profit`)
//!   divided by units when a units column exists
//!
//! Rows sharing a (branch, item) are collapsed with units-weighted price and
//! cost. Per time bucket rows (`date` or `month`) are kept as the sales series.

use std::collections::BTreeMap;

use crate::error::{BundleError, BundleResult};
use crate::math::{finite_or_zero, safe_div};
use crate::table::{cell, parse_number, RawTable};
use crate::types::{ItemSalesRecord, SalesObservation};

const TABLE: &str = "item_sales";

pub const BRANCH_ALIASES: &[&str] = &["branch_id"];
pub const ITEM_ALIASES: &[&str] = &["item_id", "product_id"];
pub const UNITS_ALIASES: &[&str] = &["units_sold", "units"];
pub const PERIOD_ALIASES: &[&str] = &["date", "month"];

/// Normalizer output: collapsed records plus the per-bucket sales series.
#[derive(Clone, Debug, Default)]
pub struct NormalizedSales {
    /// Sorted by (branch_id, item_id).
    pub records: Vec<ItemSalesRecord>,
    pub series: Vec<SalesObservation>,
    /// Input rows read, including ones later collapsed.
    pub rows_read: usize,
}

impl NormalizedSales {
    pub fn branch_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.iter().map(|r| r.branch_id.clone()).collect();
        ids.dedup();
        ids
    }

    pub fn has_series(&self) -> bool {
        !self.series.is_empty()
    }
}

enum PriceSource {
    Column(usize),
    RevenuePerUnit { revenue: usize, units: usize },
}

enum CostSource {
    UnitColumn(usize),
    Total(TotalCost),
}

enum TotalCost {
    Column(usize),
    RevenueMinusProfit { revenue: usize, profit: usize },
}

struct Schema {
    branch: usize,
    item: usize,
    units: Option<usize>,
    period: Option<usize>,
    price: PriceSource,
    cost: CostSource,
}

impl Schema {
    fn resolve(table: &RawTable) -> BundleResult<Self> {
        let branch = table
            .find_column(BRANCH_ALIASES)
            .ok_or_else(|| BundleError::missing(TABLE, "need branch_id"))?;
        let item = table
            .find_column(ITEM_ALIASES)
            .ok_or_else(|| BundleError::missing(TABLE, "need item_id or product_id"))?;
        let units = table.find_column(UNITS_ALIASES);
        let revenue = table.find_column(&["revenue"]);

        let price = if let Some(col) = table.find_column(&["price", "unit_price"]) {
            PriceSource::Column(col)
        } else if let (Some(revenue), Some(units)) = (revenue, units) {
            PriceSource::RevenuePerUnit { revenue, units }
        } else {
            return Err(BundleError::missing(
                TABLE,
                "need price, unit_price, or (revenue and units_sold)",
            ));
        };

        let cost = if let Some(col) = table.find_column(&["unit_cost"]) {
            CostSource::UnitColumn(col)
        } else if let Some(col) = table.find_column(&["cost"]) {
            CostSource::Total(TotalCost::Column(col))
        } else if let (Some(revenue), Some(profit)) = (revenue, table.find_column(&["profit"])) {
            CostSource::Total(TotalCost::RevenueMinusProfit { revenue, profit })
        } else {
            return Err(BundleError::missing(
                TABLE,
                "need cost, unit_cost, or (revenue and profit)",
            ));
        };

        Ok(Self {
            branch,
            item,
            units,
            period: table.find_column(PERIOD_ALIASES),
            price,
            cost,
        })
    }

    fn num(row: &[String], col: usize) -> f64 {
        parse_number(cell(row, col))
    }

    fn units(&self, row: &[String]) -> f64 {
        self.units.map(|c| Self::num(row, c)).unwrap_or(0.0)
    }

    fn price(&self, row: &[String]) -> f64 {
        match self.price {
            PriceSource::Column(c) => Self::num(row, c),
            PriceSource::RevenuePerUnit { revenue, units } => {
                safe_div(Self::num(row, revenue), Self::num(row, units))
            }
        }
    }

    fn unit_cost(&self, row: &[String]) -> f64 {
        match &self.cost {
            CostSource::UnitColumn(c) => Self::num(row, *c),
            CostSource::Total(total) => {
                let total = match *total {
                    TotalCost::Column(c) => Self::num(row, c),
                    TotalCost::RevenueMinusProfit { revenue, profit } => {
                        Self::num(row, revenue) - Self::num(row, profit)
                    }
                };
                match self.units {
                    Some(u) => safe_div(total, Self::num(row, u)),
                    None => total,
                }
            }
        }
    }
}

#[derive(Default)]
struct Accumulator {
    units: f64,
    weighted_price: f64,
    weighted_cost: f64,
    price_sum: f64,
    cost_sum: f64,
    rows: usize,
}

impl Accumulator {
    fn add(&mut self, units: f64, price: f64, cost: f64) {
        self.units += units;
        self.weighted_price += units * price;
        self.weighted_cost += units * cost;
        self.price_sum += price;
        self.cost_sum += cost;
        self.rows += 1;
    }

    fn finish(&self, branch_id: &str, item_id: &str) -> ItemSalesRecord {
        let (price, cost) = if self.units > 0.0 {
            (
                safe_div(self.weighted_price, self.units),
                safe_div(self.weighted_cost, self.units),
            )
        } else {
            let n = self.rows as f64;
            (safe_div(self.price_sum, n), safe_div(self.cost_sum, n))
        };
        ItemSalesRecord::new(branch_id, item_id, self.units, price, cost)
    }
}

/// Normalize an item-sales table.
///
/// Fails only when a required column path cannot be resolved. Bad cells
/// read as 0 and rows without a branch or item id are skipped.
pub fn normalize_item_sales(table: &RawTable) -> BundleResult<NormalizedSales> {
    let schema = Schema::resolve(table)?;
    if schema.units.is_none() {
        log::warn!("item_sales has no units_sold/units column; treating every row as 0 units");
    }

    let mut groups: BTreeMap<(String, String), Accumulator> = BTreeMap::new();
    let mut series = Vec::new();
    let mut skipped = 0usize;

    for row in table.rows() {
        let branch_id = cell(row, schema.branch);
        let item_id = cell(row, schema.item);
        if branch_id.is_empty() || item_id.is_empty() {
            skipped += 1;
            continue;
        }

        let units = finite_or_zero(schema.units(row));
        let price = finite_or_zero(schema.price(row));
        let cost = finite_or_zero(schema.unit_cost(row));

        groups
            .entry((branch_id.to_string(), item_id.to_string()))
            .or_default()
            .add(units, price, cost);

        if let Some(p) = schema.period {
            let period = cell(row, p);
            if !period.is_empty() {
                series.push(SalesObservation {
                    branch_id: branch_id.to_string(),
                    item_id: item_id.to_string(),
                    period: period.to_string(),
                    units_sold: units,
                });
            }
        }
    }

    if skipped > 0 {
        log::debug!("item_sales skipped {} rows without branch or item id", skipped);
    }

    let records = groups
        .iter()
        .map(|((branch_id, item_id), acc)| acc.finish(branch_id, item_id))
        .collect();

    Ok(NormalizedSales {
        records,
        series,
        rows_read: table.len(),
    })
}
