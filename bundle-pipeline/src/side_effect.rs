use async_trait::async_trait;
use std::sync::Arc;

use crate::util;

/// The hydrated query and the final per-branch selection.
#[derive(Clone)]
pub struct SideEffectInput<Q, C> {
    pub query: Arc<Q>,
    pub selected_candidates: Vec<C>,
}

/// Post-selection hook that cannot alter the result. The bundle pipeline
/// uses `BundleCacheSideEffect` to publish the selected bundles into the
/// shared `BundleCache`. Failures are logged and do not fail the run.
#[async_trait]
pub trait SideEffect<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: Arc<Q>) -> bool {
        true
    }

    async fn run(&self, input: Arc<SideEffectInput<Q, C>>) -> Result<(), String>;

    /// Stage name used in `stage=` log fields.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
