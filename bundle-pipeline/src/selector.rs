use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::util;

/// Selectors sort and truncate the candidate list after scoring.
///
/// When `partition` returns a key, sorting and truncation happen within
/// each partition and partitions are emitted in ascending key order.
pub trait Selector<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn select(&self, query: &Q, candidates: Vec<C>) -> Vec<C> {
        let limit = self.size(query);
        let mut groups: BTreeMap<Option<String>, Vec<C>> = BTreeMap::new();
        for c in candidates {
            groups.entry(self.partition(&c)).or_default().push(c);
        }

        let mut selected = Vec::new();
        for (_, group) in groups {
            let mut sorted = self.sort(group);
            if let Some(limit) = limit {
                sorted.truncate(limit);
            }
            selected.extend(sorted);
        }
        selected
    }

    /// Decide if this selector should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Extract the score from a candidate to use for sorting.
    fn score(&self, candidate: &C) -> f64;

    /// Order between equal scores. Defaults to keeping input order.
    fn tie_break(&self, _a: &C, _b: &C) -> Ordering {
        Ordering::Equal
    }

    /// Grouping key for per-partition selection. `None` selects globally.
    fn partition(&self, _candidate: &C) -> Option<String> {
        None
    }

    /// Sort candidates by score, descending. NaN scores sink to the end.
    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| {
            let sa = self.score(a);
            let sb = self.score(b);
            let by_score = match (sa.is_nan(), sb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => sb.partial_cmp(&sa).unwrap_or(Ordering::Equal),
            };
            by_score.then_with(|| self.tie_break(a, b))
        });
        sorted
    }

    /// Maximum number of candidates kept per partition. `None` keeps all.
    fn size(&self, _query: &Q) -> Option<usize> {
        None
    }

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
