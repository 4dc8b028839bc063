//! Pairwise association mining.
//!
//! For a branch with `T` baskets:
//!
//! ```text
//! support(i)   = count(i) / T
//! support(a,b) = count(a,b) / T
//! lift(a,b)    = support(a,b) / (support(a) * support(b))
//! ```
//!
//! Only pairs that co-occur at least once are emitted. Pair keys are
//! canonical (`a < b`), so basket item order never changes the result.

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::math::safe_div;
use crate::types::{Basket, PairStat};

/// Order two ids so the lexicographically smaller comes first.
pub fn canonical_pair<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Pair statistics of every branch, keyed for constant-time lookup.
#[derive(Clone, Debug, Default)]
pub struct PairIndex {
    by_branch: HashMap<String, HashMap<(String, String), PairStat>>,
}

impl PairIndex {
    /// Look up the stats of an unordered pair. Argument order is irrelevant.
    pub fn get(&self, branch_id: &str, x: &str, y: &str) -> Option<&PairStat> {
        let (a, b) = canonical_pair(x, y);
        self.by_branch
            .get(branch_id)?
            .get(&(a.to_string(), b.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_branch.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All rows sorted by (branch, a, b).
    pub fn to_rows(&self) -> Vec<PairStat> {
        let mut rows: Vec<PairStat> = self
            .by_branch
            .values()
            .flat_map(|m| m.values().cloned())
            .collect();
        rows.sort_by(|p, q| {
            (&p.branch_id, &p.item_a, &p.item_b).cmp(&(&q.branch_id, &q.item_a, &q.item_b))
        });
        rows
    }
}

impl FromIterator<PairStat> for PairIndex {
    fn from_iter<I: IntoIterator<Item = PairStat>>(iter: I) -> Self {
        let mut by_branch: HashMap<String, HashMap<(String, String), PairStat>> = HashMap::new();
        for stat in iter {
            by_branch
                .entry(stat.branch_id.clone())
                .or_default()
                .insert((stat.item_a.clone(), stat.item_b.clone()), stat);
        }
        Self { by_branch }
    }
}

/// Mine pair stats for one branch's baskets.
pub fn branch_pair_stats(branch_id: &str, baskets: &[&Basket]) -> Vec<PairStat> {
    let total = baskets.len() as f64;
    if baskets.is_empty() {
        return Vec::new();
    }

    let mut item_count: HashMap<&str, usize> = HashMap::new();
    let mut pair_count: BTreeMap<(&str, &str), usize> = BTreeMap::new();

    for basket in baskets {
        // Dedup again so hand-built baskets cannot double count.
        let items: BTreeSet<&str> = basket.items.iter().map(String::as_str).collect();
        let items: Vec<&str> = items.into_iter().collect();
        for &it in &items {
            *item_count.entry(it).or_insert(0) += 1;
        }
        for (i, &a) in items.iter().enumerate() {
            for &b in &items[i + 1..] {
                *pair_count.entry(canonical_pair(a, b)).or_insert(0) += 1;
            }
        }
    }

    pair_count
        .into_iter()
        .map(|((a, b), c_ab)| {
            let support_ab = safe_div(c_ab as f64, total);
            let support_a = safe_div(item_count.get(a).copied().unwrap_or(0) as f64, total);
            let support_b = safe_div(item_count.get(b).copied().unwrap_or(0) as f64, total);
            PairStat {
                branch_id: branch_id.to_string(),
                item_a: a.to_string(),
                item_b: b.to_string(),
                support: support_ab,
                lift: safe_div(support_ab, support_a * support_b),
            }
        })
        .collect()
}

/// Mine every branch in parallel. Branches share nothing.
pub fn mine_pair_stats(baskets: &[Basket]) -> PairIndex {
    let mut by_branch: BTreeMap<&str, Vec<&Basket>> = BTreeMap::new();
    for basket in baskets {
        by_branch.entry(basket.branch_id.as_str()).or_default().push(basket);
    }
    let branches: Vec<(&str, Vec<&Basket>)> = by_branch.into_iter().collect();

    branches
        .par_iter()
        .map(|(branch_id, group)| branch_pair_stats(branch_id, group))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
