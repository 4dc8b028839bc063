//! Basket building from transaction lines.
//!
//! Basket key precedence: `order_id` > (`customer_id`, `date`) > `date`.
//! The date-only mode groups a whole branch-day into one basket. It is kept
//! as a coarse fallback and reported through [`BasketKeyMode::BranchDay`].

use std::collections::{BTreeMap, BTreeSet};

use crate::economics::{BRANCH_ALIASES, ITEM_ALIASES};
use crate::error::{BundleError, BundleResult};
use crate::table::{cell, RawTable};
use crate::types::{Basket, BasketKeyMode, TransactionRow};

const TABLE: &str = "transactions";

enum KeySource {
    Order(usize),
    CustomerDay { customer: usize, date: usize },
    BranchDay(usize),
}

impl KeySource {
    fn resolve(table: &RawTable) -> BundleResult<Self> {
        let date = table.find_column(&["date"]);
        if let Some(order) = table.find_column(&["order_id"]) {
            Ok(KeySource::Order(order))
        } else if let (Some(customer), Some(date)) = (table.find_column(&["customer_id"]), date) {
            Ok(KeySource::CustomerDay { customer, date })
        } else if let Some(date) = date {
            Ok(KeySource::BranchDay(date))
        } else {
            Err(BundleError::missing(
                TABLE,
                "need order_id, (customer_id and date), or date to group baskets",
            ))
        }
    }

    fn mode(&self) -> BasketKeyMode {
        match self {
            KeySource::Order(_) => BasketKeyMode::Order,
            KeySource::CustomerDay { .. } => BasketKeyMode::CustomerDay,
            KeySource::BranchDay(_) => BasketKeyMode::BranchDay,
        }
    }

    fn key(&self, row: &[String]) -> String {
        match *self {
            KeySource::Order(c) => cell(row, c).to_string(),
            KeySource::CustomerDay { customer, date } => {
                format!("{}_{}", cell(row, customer), cell(row, date))
            }
            KeySource::BranchDay(c) => cell(row, c).to_string(),
        }
    }
}

/// Resolve the basket key of every transaction line.
pub fn transaction_rows(table: &RawTable) -> BundleResult<(BasketKeyMode, Vec<TransactionRow>)> {
    let branch = table
        .find_column(BRANCH_ALIASES)
        .ok_or_else(|| BundleError::missing(TABLE, "need branch_id"))?;
    let item = table
        .find_column(ITEM_ALIASES)
        .ok_or_else(|| BundleError::missing(TABLE, "need item_id or product_id"))?;
    let keys = KeySource::resolve(table)?;

    let rows = table
        .rows()
        .filter_map(|row| {
            let branch_id = cell(row, branch);
            let item_id = cell(row, item);
            if branch_id.is_empty() || item_id.is_empty() {
                return None;
            }
            Some(TransactionRow {
                branch_id: branch_id.to_string(),
                item_id: item_id.to_string(),
                basket_key: keys.key(row),
            })
        })
        .collect();

    Ok((keys.mode(), rows))
}

/// Group transaction lines into deduplicated baskets.
///
/// Output is ordered by (branch_id, basket_id); each basket's items are
/// sorted, so input row order never shows through.
pub fn build_baskets(rows: &[TransactionRow]) -> Vec<Basket> {
    let mut grouped: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    for row in rows {
        grouped
            .entry((row.branch_id.as_str(), row.basket_key.as_str()))
            .or_default()
            .insert(row.item_id.as_str());
    }

    grouped
        .into_iter()
        .map(|((branch_id, basket_id), items)| Basket {
            branch_id: branch_id.to_string(),
            basket_id: basket_id.to_string(),
            items: items.into_iter().map(String::from).collect(),
        })
        .collect()
}

/// Resolve keys and build baskets in one step.
pub fn baskets_from_table(table: &RawTable) -> BundleResult<(BasketKeyMode, Vec<Basket>)> {
    let (mode, rows) = transaction_rows(table)?;
    if mode == BasketKeyMode::BranchDay {
        log::warn!("transactions have no order or customer key; grouping baskets by branch-day");
    }
    Ok((mode, build_baskets(&rows)))
}
