//! Generic staged candidate pipeline.
//!
//! ```text
//! query hydrators → sources → filters → scorers → selector → side effects
//! ```
//!
//! A stage that fails is logged and skipped; the run continues with what
//! the remaining stages produce.

use async_trait::async_trait;
use std::sync::Arc;

use crate::filter::Filter;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::source::Source;

pub trait HasRequestId {
    fn request_id(&self) -> &str;
}

/// Everything a run produced, stage by stage.
pub struct PipelineResult<Q, C> {
    pub query: Arc<Q>,
    /// Candidates as returned by the sources.
    pub retrieved_candidates: Vec<C>,
    /// Candidates removed by filters.
    pub filtered_candidates: Vec<C>,
    /// Final selection, after scoring and selection.
    pub selected_candidates: Vec<C>,
}

#[async_trait]
pub trait CandidatePipeline<Q, C>: Send + Sync
where
    Q: HasRequestId + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<Q>>];
    fn sources(&self) -> &[Box<dyn Source<Q, C>>];
    fn filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn scorers(&self) -> &[Box<dyn Scorer<Q, C>>];
    fn selector(&self) -> &dyn Selector<Q, C>;
    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<Q, C>>>>;

    async fn execute(&self, query: Q) -> PipelineResult<Q, C> {
        let query = self.hydrate_query(query).await;
        let retrieved = self.fetch_candidates(&query).await;
        let (kept, filtered) = self.filter(&query, retrieved.clone()).await;
        let scored = self.score(&query, kept).await;

        let selector = self.selector();
        let selected = if selector.enable(&query) {
            selector.select(&query, scored)
        } else {
            scored
        };
        log::info!(
            "request_id={} retrieved={} filtered={} selected={}",
            query.request_id(),
            retrieved.len(),
            filtered.len(),
            selected.len()
        );

        let query = Arc::new(query);
        self.run_side_effects(Arc::new(SideEffectInput {
            query: Arc::clone(&query),
            selected_candidates: selected.clone(),
        }))
        .await;

        PipelineResult {
            query,
            retrieved_candidates: retrieved,
            filtered_candidates: filtered,
            selected_candidates: selected,
        }
    }

    async fn hydrate_query(&self, query: Q) -> Q {
        let mut query = query;
        for hydrator in self.query_hydrators() {
            if !hydrator.enable(&query) {
                continue;
            }
            match hydrator.hydrate(&query).await {
                Ok(hydrated) => hydrator.update(&mut query, hydrated),
                Err(err) => log::warn!(
                    "request_id={} stage={} failed: {}",
                    query.request_id(),
                    hydrator.name(),
                    err
                ),
            }
        }
        query
    }

    async fn fetch_candidates(&self, query: &Q) -> Vec<C> {
        let mut candidates = Vec::new();
        for source in self.sources().iter().filter(|s| s.enable(query)) {
            match source.get_candidates(query).await {
                Ok(found) => {
                    log::debug!(
                        "request_id={} stage={} fetched={}",
                        query.request_id(),
                        source.name(),
                        found.len()
                    );
                    candidates.extend(found);
                }
                Err(err) => log::warn!(
                    "request_id={} stage={} failed: {}",
                    query.request_id(),
                    source.name(),
                    err
                ),
            }
        }
        candidates
    }

    /// Returns `(kept, removed)`.
    async fn filter(&self, query: &Q, candidates: Vec<C>) -> (Vec<C>, Vec<C>) {
        let mut kept = candidates;
        let mut removed = Vec::new();
        for filter in self.filters().iter().filter(|f| f.enable(query)) {
            let backup = kept.clone();
            match filter.filter(query, kept).await {
                Ok(result) => {
                    kept = result.kept;
                    removed.extend(result.removed);
                }
                Err(err) => {
                    log::warn!(
                        "request_id={} stage={} failed: {}",
                        query.request_id(),
                        filter.name(),
                        err
                    );
                    kept = backup;
                }
            }
        }
        (kept, removed)
    }

    async fn score(&self, query: &Q, candidates: Vec<C>) -> Vec<C> {
        let mut candidates = candidates;
        for scorer in self.scorers().iter().filter(|s| s.enable(query)) {
            match scorer.score(query, &candidates).await {
                Ok(scored) if scored.len() == candidates.len() => {
                    for (candidate, partial) in candidates.iter_mut().zip(scored) {
                        scorer.update(candidate, partial);
                    }
                }
                Ok(scored) => log::warn!(
                    "request_id={} stage={} returned {} scores for {} candidates",
                    query.request_id(),
                    scorer.name(),
                    scored.len(),
                    candidates.len()
                ),
                Err(err) => log::warn!(
                    "request_id={} stage={} failed: {}",
                    query.request_id(),
                    scorer.name(),
                    err
                ),
            }
        }
        candidates
    }

    async fn run_side_effects(&self, input: Arc<SideEffectInput<Q, C>>) {
        let side_effects = self.side_effects();
        for effect in side_effects.iter() {
            if !effect.enable(Arc::clone(&input.query)) {
                continue;
            }
            if let Err(err) = effect.run(Arc::clone(&input)).await {
                log::warn!(
                    "request_id={} stage={} failed: {}",
                    input.query.request_id(),
                    effect.name(),
                    err
                );
            }
        }
    }
}
