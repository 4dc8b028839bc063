use async_trait::async_trait;

use crate::util;

/// Scorers run sequentially over the kept candidates.
///
/// `score` returns one partial candidate per input, in input order, holding
/// only the fields this scorer owns; `update` copies those fields back.
/// A result of the wrong length is discarded by the pipeline.
#[async_trait]
pub trait Scorer<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this scorer should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn score(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    /// Copy the scored fields onto the pipeline's candidate.
    fn update(&self, candidate: &mut C, scored: C);

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
