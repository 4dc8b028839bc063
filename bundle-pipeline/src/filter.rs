use async_trait::async_trait;

use crate::util;

/// Candidates split by a filter. Removed candidates are reported back to
/// the caller but never scored.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

impl<C> FilterResult<C> {
    /// Partition with a predicate; `true` keeps.
    pub fn partition<F>(candidates: Vec<C>, keep: F) -> Self
    where
        F: FnMut(&C) -> bool,
    {
        let (kept, removed) = candidates.into_iter().partition(keep);
        Self { kept, removed }
    }
}

/// Filters run sequentially, each seeing only what the previous one kept.
#[async_trait]
pub trait Filter<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this filter should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn filter(&self, query: &Q, candidates: Vec<C>) -> Result<FilterResult<C>, String>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
