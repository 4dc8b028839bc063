//! Async candidate pipeline around the bundle engine, plus CSV I/O and the
//! shared result cache.

pub mod cache;
pub mod candidate_pipeline;
pub mod components;
pub mod filter;
pub mod loader;
pub mod pipelines;
pub mod query_hydrator;
pub mod scorer;
pub mod selector;
pub mod side_effect;
pub mod source;
pub mod types;
pub mod util;

pub use cache::{BundleCache, CacheStatus};
pub use candidate_pipeline::{CandidatePipeline, HasRequestId, PipelineResult};
pub use pipelines::bundle_suggestion::BundleSuggestionPipeline;
pub use types::{BundleCandidate, BundleQuery};
