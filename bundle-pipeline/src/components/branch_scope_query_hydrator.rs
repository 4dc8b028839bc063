use async_trait::async_trait;

use crate::query_hydrator::QueryHydrator;
use crate::types::BundleQuery;

/// Resolves which branches a query covers.
///
/// An empty branch list means every branch in the sales data; an explicit
/// list is deduplicated and sorted. Unknown ids are kept and simply yield
/// no candidates.
pub struct BranchScopeQueryHydrator {
    known_branches: Vec<String>,
}

impl BranchScopeQueryHydrator {
    pub fn new(known_branches: Vec<String>) -> Self {
        Self { known_branches }
    }
}

#[async_trait]
impl QueryHydrator<BundleQuery> for BranchScopeQueryHydrator {
    async fn hydrate(&self, query: &BundleQuery) -> Result<BundleQuery, String> {
        let mut branch_ids = if query.branch_ids.is_empty() {
            self.known_branches.clone()
        } else {
            query.branch_ids.clone()
        };
        branch_ids.sort();
        branch_ids.dedup();

        for id in branch_ids.iter().filter(|id| !self.known_branches.contains(id)) {
            log::warn!("request_id={} unknown branch_id={}", query.request_id, id);
        }

        Ok(BundleQuery {
            branch_ids,
            ..query.clone()
        })
    }

    fn update(&self, query: &mut BundleQuery, hydrated: BundleQuery) {
        query.branch_ids = hydrated.branch_ids;
    }
}
