/// Last path segment of a type name, used as a stage's display name.
///
/// `"bundle_pipeline::components::ranking_scorer::RankingScorer"` becomes
/// `"RankingScorer"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Stable candidate id: `"<branch>:<anchor>+<low>"`.
pub fn candidate_id(branch_id: &str, anchor_id: &str, low_id: &str) -> String {
    format!("{}:{}+{}", branch_id, anchor_id, low_id)
}
