use async_trait::async_trait;

use crate::util;

/// Produces the raw candidate set for a query. In the bundle pipeline this
/// is `BundleCandidateSource`: one priced (anchor, low-seller) proposal per
/// low-seller of every branch in scope, loss-making ones included.
///
/// Enabled sources run one after another in registration order and their
/// outputs are concatenated before filtering. A failing source is logged
/// and contributes nothing.
#[async_trait]
pub trait Source<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Skip this source for the query, e.g. when no branch is in scope.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn get_candidates(&self, query: &Q) -> Result<Vec<C>, String>;

    /// Stage name used in `stage=` log fields.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
