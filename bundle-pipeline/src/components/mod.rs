pub mod branch_scope_query_hydrator;
pub mod branch_top_k_selector;
pub mod bundle_cache_side_effect;
pub mod bundle_candidate_source;
pub mod ranking_scorer;
pub mod unprofitable_bundle_filter;
