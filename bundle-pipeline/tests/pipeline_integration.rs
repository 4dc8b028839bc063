use std::sync::Arc;

use bundle_engine::{BundleConfig, BundleEngine, BundleRow, RawTable};
use bundle_pipeline::candidate_pipeline::CandidatePipeline;
use bundle_pipeline::components::bundle_cache_side_effect::BundleCacheSideEffect;
use bundle_pipeline::loader::{load_table, read_bundles_csv, write_bundles_csv};
use bundle_pipeline::side_effect::{SideEffect, SideEffectInput};
use bundle_pipeline::{BundleCache, BundleCandidate, BundleQuery, BundleSuggestionPipeline};

// ---------------------------------------------------------------------------
// Test data fixtures
// ---------------------------------------------------------------------------

/// Two branches. `north` has three low-sellers, one of which (RAZOR) loses
/// money even after bundling; `south` has a margin-thin best seller and no
/// qualifying anchor.
const SALES_CSV: &str = "\
Branch ID,Item ID,Units Sold,Unit Price,Unit Cost
north,COFFEE,900,4.50,1.20
north,BAGEL,880,2.50,0.90
north,JUICE,300,3.00,1.50
north,TEA,250,2.00,0.80
north,SCONE,12,3.00,2.10
north,MUFFIN,8,2.75,1.80
north,RAZOR,4,3.00,12.00
north,WATER,200,1.00,0.40
south,SODA,800,1.00,0.98
south,CHIPS,10,2.00,1.00
south,GUM,5,1.00,0.50
";

/// MUFFIN is bought with BAGEL, SCONE with COFFEE.
const TRANSACTIONS_CSV: &str = "\
branch_id,item_id,order_id
north,MUFFIN,o1
north,BAGEL,o1
north,MUFFIN,o2
north,BAGEL,o2
north,SCONE,o3
north,COFFEE,o3
north,COFFEE,o4
north,JUICE,o4
north,BAGEL,o5
north,TEA,o5
south,SODA,o6
south,CHIPS,o6
";

fn engine(tx: Option<&RawTable>, config: &BundleConfig) -> Arc<BundleEngine> {
    let sales = load_table(SALES_CSV.as_bytes()).unwrap();
    Arc::new(BundleEngine::from_tables(&sales, tx, config.clone()).unwrap())
}

fn transactions() -> RawTable {
    load_table(TRANSACTIONS_CSV.as_bytes()).unwrap()
}

async fn run(
    config: BundleConfig,
    branches: Vec<String>,
) -> (bundle_pipeline::PipelineResult<BundleQuery, BundleCandidate>, Arc<BundleCache>) {
    let tx = transactions();
    let cache = Arc::new(BundleCache::new());
    let pipeline = BundleSuggestionPipeline::new(engine(Some(&tx), &config), Arc::clone(&cache));
    let query = BundleQuery::new("test-001", config).with_branches(branches);
    (pipeline.execute(query).await, cache)
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pipeline_matches_engine_run() {
    let config = BundleConfig::default();
    let (result, _) = run(config.clone(), Vec::new()).await;

    let tx = transactions();
    let (expected, _) = engine(Some(&tx), &config).run();
    let actual: Vec<_> = result
        .selected_candidates
        .into_iter()
        .map(BundleCandidate::into_suggestion)
        .collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn association_steers_anchor_choice() {
    let (result, _) = run(BundleConfig::default(), Vec::new()).await;
    let anchor_of = |low: &str| {
        result
            .selected_candidates
            .iter()
            .find(|c| c.suggestion.low_id == low)
            .map(|c| c.suggestion.anchor_id.clone())
    };
    assert_eq!(anchor_of("MUFFIN").as_deref(), Some("BAGEL"));
    assert_eq!(anchor_of("SCONE").as_deref(), Some("COFFEE"));
}

#[tokio::test]
async fn loss_makers_are_reported_as_filtered() {
    let (result, _) = run(BundleConfig::default(), Vec::new()).await;
    assert!(result
        .filtered_candidates
        .iter()
        .any(|c| c.suggestion.low_id == "RAZOR"));
    assert!(result
        .selected_candidates
        .iter()
        .all(|c| c.suggestion.expected_profit > 0.0));
    assert_eq!(
        result.retrieved_candidates.len(),
        result.filtered_candidates.len() + result.selected_candidates.len(),
        "default top-k should not truncate this fixture"
    );
}

#[tokio::test]
async fn branch_without_anchor_contributes_nothing() {
    let (result, _) = run(BundleConfig::default(), Vec::new()).await;
    assert_eq!(result.query.branch_ids, vec!["north", "south"]);
    assert!(result.selected_candidates.iter().all(|c| c.branch_id() == "north"));
}

#[tokio::test]
async fn top_k_is_applied_per_branch() {
    let config = BundleConfig {
        top_k_per_branch: 1,
        ..BundleConfig::default()
    };
    let (result, _) = run(config, Vec::new()).await;
    assert_eq!(result.selected_candidates.len(), 1);
    let best = &result.selected_candidates[0];
    assert!(result
        .filtered_candidates
        .iter()
        .chain(result.retrieved_candidates.iter())
        .all(|c| c.branch_id() == "north"));
    assert!(best.ranking_score.is_some());
}

#[tokio::test]
async fn explicit_scope_limits_branches() {
    let (result, _) = run(BundleConfig::default(), vec!["south".into()]).await;
    assert_eq!(result.query.branch_ids, vec!["south"]);
    assert!(result.retrieved_candidates.is_empty());
    assert!(result.selected_candidates.is_empty());
}

// ---------------------------------------------------------------------------
// Cache and output
// ---------------------------------------------------------------------------

#[tokio::test]
async fn selection_is_published_to_cache() {
    let (result, cache) = run(BundleConfig::default(), Vec::new()).await;
    let status = cache.status();
    assert_eq!(status.rows, result.selected_candidates.len());
    assert_eq!(status.branches, 1);
    assert!(cache.for_branch("south").is_empty());

    let first = cache.for_branch("north").into_iter().next().unwrap();
    let expected = BundleRow::from(&result.selected_candidates[0].suggestion);
    assert_eq!(first, expected);
}

#[tokio::test]
async fn cache_side_effect_replaces_previous_run() {
    let cache = Arc::new(BundleCache::new());
    cache.record_error("stale");
    let effect = BundleCacheSideEffect::new(Arc::clone(&cache));
    let input = Arc::new(SideEffectInput {
        query: Arc::new(BundleQuery::new("r9", BundleConfig::default())),
        selected_candidates: Vec::<BundleCandidate>::new(),
    });
    effect.run(input).await.unwrap();
    assert_eq!(cache.status().last_error, None);
}

#[tokio::test]
async fn written_csv_reloads_into_cache() {
    let (result, _) = run(BundleConfig::default(), Vec::new()).await;
    let rows: Vec<BundleRow> = result
        .selected_candidates
        .iter()
        .map(|c| BundleRow::from(&c.suggestion))
        .collect();
    let mut buf = Vec::new();
    write_bundles_csv(&mut buf, &rows).unwrap();

    let cache = BundleCache::new();
    let status = cache.reload(|| read_bundles_csv(buf.as_slice())).unwrap();
    assert_eq!(status.rows, rows.len());
    assert_eq!(cache.all(), rows);
}
