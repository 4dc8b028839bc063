use async_trait::async_trait;

use crate::util;

/// Fills in query fields the caller left implicit before any source runs.
/// `BranchScopeQueryHydrator` turns an empty branch list into every branch
/// present in the sales data.
///
/// `hydrate` works on a copy; `update` copies back only the fields the
/// hydrator owns, so hydrators never clobber each other's work.
#[async_trait]
pub trait QueryHydrator<Q>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn hydrate(&self, query: &Q) -> Result<Q, String>;

    fn update(&self, query: &mut Q, hydrated: Q);

    /// Stage name used in `stage=` log fields.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
