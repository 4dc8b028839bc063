use async_trait::async_trait;

use bundle_engine::scoring::ranking_score;

use crate::scorer::Scorer;
use crate::types::{BundleCandidate, BundleQuery};

/// `profit + 2·lift + 50·support` under the query's scoring weights.
pub struct RankingScorer;

#[async_trait]
impl Scorer<BundleQuery, BundleCandidate> for RankingScorer {
    async fn score(
        &self,
        query: &BundleQuery,
        candidates: &[BundleCandidate],
    ) -> Result<Vec<BundleCandidate>, String> {
        let weights = &query.config.weights;
        Ok(candidates
            .iter()
            .map(|c| {
                let s = &c.suggestion;
                BundleCandidate {
                    ranking_score: Some(ranking_score(s.expected_profit, s.lift, s.support, weights)),
                    ..BundleCandidate::default()
                }
            })
            .collect())
    }

    fn update(&self, candidate: &mut BundleCandidate, scored: BundleCandidate) {
        candidate.ranking_score = scored.ranking_score;
        candidate.suggestion.ranking_score = scored.ranking_score.unwrap_or(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_engine::{BundleConfig, BundleSuggestion};

    #[tokio::test]
    async fn scores_with_query_weights() {
        let c = BundleCandidate::from_suggestion(BundleSuggestion {
            expected_profit: 3.0,
            lift: 1.5,
            support: 0.1,
            ..BundleSuggestion::default()
        });
        let query = BundleQuery::new("r1", BundleConfig::default());
        let scored = RankingScorer.score(&query, &[c.clone()]).await.unwrap();
        // 3 + 2*1.5 + 50*0.1
        let score = scored[0].ranking_score.unwrap();
        assert!((score - 11.0).abs() < 1e-9, "score was {}", score);

        let mut target = c;
        RankingScorer.update(&mut target, scored[0].clone());
        assert_eq!(target.ranking_score, Some(score));
        assert_eq!(target.suggestion.ranking_score, score);
    }
}
