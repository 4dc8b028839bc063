use std::env;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use bundle_engine::{BundleConfig, BundleEngine, BundleRow};
use bundle_pipeline::candidate_pipeline::{CandidatePipeline, PipelineResult};
use bundle_pipeline::loader::{load_table_file, write_bundles_file};
use bundle_pipeline::{BundleCache, BundleCandidate, BundleQuery, BundleSuggestionPipeline};

const USAGE: &str = "\
Usage: bundle-server <item_sales.csv> [options]

Options:
  --transactions FILE   Transaction lines (branch_id, item_id, order_id | customer_id+date | date)
  --branches a,b,...    Branch ids to analyze (default: all)
  --config FILE         JSON configuration; unspecified fields keep their defaults
  --top N               Bundles kept per branch (default: 10)
  --max-discount X      Discount cap as a fraction (default: 0.25)
  --target-margin X     Margin the discounted bundle must keep (default: 0.15)
  --out FILE            CSV output path (default: bundles.csv)
  --json                Print JSON instead of the text digest

Example:
  bundle-server data/item_sales.csv --transactions data/transactions.csv --top 5 --json";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Args {
    sales_path: String,
    transactions_path: Option<String>,
    branches: Vec<String>,
    config_path: Option<String>,
    top_k: Option<usize>,
    max_discount: Option<f64>,
    target_margin: Option<f64>,
    out_path: String,
    json: bool,
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, raw))
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let sales_path = args.get(1).ok_or_else(|| USAGE.to_string())?;
    if sales_path.starts_with("--") {
        return Err(USAGE.to_string());
    }

    let mut parsed = Args {
        sales_path: sales_path.clone(),
        out_path: "bundles.csv".into(),
        ..Args::default()
    };
    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--json" => {
                parsed.json = true;
                i += 1;
                continue;
            }
            "--transactions" => parsed.transactions_path = Some(flag_value(args, i, flag)?.to_string()),
            "--config" => parsed.config_path = Some(flag_value(args, i, flag)?.to_string()),
            "--out" => parsed.out_path = flag_value(args, i, flag)?.to_string(),
            "--branches" => {
                parsed.branches = flag_value(args, i, flag)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }
            "--top" => parsed.top_k = Some(parse_number(flag_value(args, i, flag)?, flag)?),
            "--max-discount" => parsed.max_discount = Some(parse_number(flag_value(args, i, flag)?, flag)?),
            "--target-margin" => parsed.target_margin = Some(parse_number(flag_value(args, i, flag)?, flag)?),
            other => return Err(format!("Unknown argument: {}\n\n{}", other, USAGE)),
        }
        i += 2;
    }
    Ok(parsed)
}

/// File config, then command-line overrides, then validation.
fn resolve_config(args: &Args) -> Result<BundleConfig, String> {
    let mut config = match &args.config_path {
        Some(path) => BundleConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => BundleConfig::default(),
    };
    if let Some(top_k) = args.top_k {
        config.top_k_per_branch = top_k;
    }
    if let Some(d) = args.max_discount {
        config.max_discount_pct = d;
    }
    if let Some(m) = args.target_margin {
        config.target_bundle_margin = m;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SuggestionsJson {
    generated_at: String,
    branch_filter: Vec<String>,
    association: &'static str,
    pipeline_ms: u128,
    bundles: Vec<BundleRow>,
    summary: SummaryJson,
}

#[derive(Serialize)]
struct SummaryJson {
    branches_analyzed: usize,
    records_processed: usize,
    bundles_proposed: usize,
    bundles_rejected: usize,
    bundles_selected: usize,
    total_expected_profit: f64,
}

fn summarize(result: &PipelineResult<BundleQuery, BundleCandidate>, rows_read: usize) -> SummaryJson {
    SummaryJson {
        branches_analyzed: result.query.branch_ids.len(),
        records_processed: rows_read,
        bundles_proposed: result.retrieved_candidates.len(),
        bundles_rejected: result.filtered_candidates.len(),
        bundles_selected: result.selected_candidates.len(),
        total_expected_profit: result
            .selected_candidates
            .iter()
            .map(|c| c.suggestion.expected_profit)
            .sum(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

fn print_human(summary: &SummaryJson, association: &str, rows: &[BundleRow], load_ms: u128, pipeline_ms: u128) {
    println!();
    println!("  BUNDLE SUGGESTIONS  \u{00b7}  {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!();
    println!(
        "  {} branches analyzed  \u{00b7}  {} records processed  \u{00b7}  association: {}",
        summary.branches_analyzed, summary.records_processed, association
    );
    println!(
        "  {} proposed  \u{00b7}  {} rejected as unprofitable  \u{00b7}  {} selected  \u{00b7}  ${:.2} expected profit",
        summary.bundles_proposed,
        summary.bundles_rejected,
        summary.bundles_selected,
        summary.total_expected_profit
    );
    println!();

    if rows.is_empty() {
        println!("  No profitable bundles found.");
    } else {
        let mut current: Option<&str> = None;
        for row in rows {
            if current != Some(row.branch_id.as_str()) {
                println!("  {:\u{2500}<72}", "");
                println!("  Branch {}", row.branch_id);
                current = Some(row.branch_id.as_str());
            }
            println!(
                "    {:28} {:>5.1}% off  ${:>8.2}  profit ${:>7.2}  lift {:.3}",
                row.bundle_items, row.discount_pct, row.bundle_price, row.expected_profit, row.lift
            );
            println!("      {}", row.reason);
        }
        println!("  {:\u{2500}<72}", "");
    }

    println!();
    println!(
        "  CSV loaded in {}ms \u{00b7} Pipeline ran in {}ms \u{00b7} Total {}ms",
        load_ms,
        pipeline_ms,
        load_ms + pipeline_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

async fn run(args: Args) -> Result<(), String> {
    let config = resolve_config(&args)?;

    let load_start = Instant::now();
    let sales = load_table_file(&args.sales_path)?;
    let transactions = match &args.transactions_path {
        Some(path) => Some(load_table_file(path)?),
        None => None,
    };
    let engine = BundleEngine::from_tables(&sales, transactions.as_ref(), config.clone())
        .map_err(|e| e.to_string())?;
    let load_ms = load_start.elapsed().as_millis();

    let rows_read = engine.sales().rows_read;
    let association = if engine.association().is_fallback() {
        "comovement"
    } else {
        "transactions"
    };
    tracing::info!(
        "loaded {} sales rows, {} branches, association={}",
        rows_read,
        engine.branch_ids().len(),
        association
    );

    let pipeline_start = Instant::now();
    let cache = Arc::new(BundleCache::new());
    let pipeline = BundleSuggestionPipeline::new(Arc::new(engine), Arc::clone(&cache));
    let request_id = format!("bundles-{}", Utc::now().format("%Y%m%dT%H%M%S"));
    let query = BundleQuery::new(request_id, config).with_branches(args.branches.clone());
    let result = pipeline.execute(query).await;
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    let rows = cache.all();
    write_bundles_file(&args.out_path, &rows)?;
    tracing::info!("wrote {} bundles to {}", rows.len(), args.out_path);

    let summary = summarize(&result, rows_read);
    if args.json {
        let out = SuggestionsJson {
            generated_at: Utc::now().to_rfc3339(),
            branch_filter: args.branches,
            association,
            pipeline_ms,
            bundles: rows,
            summary,
        };
        let text = serde_json::to_string_pretty(&out).map_err(|e| format!("JSON encode error: {}", e))?;
        println!("{}", text);
    } else {
        print_human(&summary, association, &rows, load_ms, pipeline_ms);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = env::args().collect();
    let args = match parse_args(&argv) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    };

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn parses_flags_and_overrides() {
        let args = parse_args(&argv(
            "bundle-server sales.csv --transactions tx.csv --branches 7,12 --top 3 --max-discount 0.2 --json",
        ))
        .unwrap();
        assert_eq!(args.sales_path, "sales.csv");
        assert_eq!(args.transactions_path.as_deref(), Some("tx.csv"));
        assert_eq!(args.branches, vec!["7", "12"]);
        assert!(args.json);
        assert_eq!(args.out_path, "bundles.csv");

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.top_k_per_branch, 3);
        assert_eq!(config.max_discount_pct, 0.2);
        assert_eq!(config.target_bundle_margin, 0.15);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&argv("bundle-server")).is_err());
        assert!(parse_args(&argv("bundle-server sales.csv --top")).is_err());
        assert!(parse_args(&argv("bundle-server sales.csv --top many")).is_err());
        assert!(parse_args(&argv("bundle-server sales.csv --verbose")).is_err());
    }

    #[test]
    fn out_of_range_override_fails_validation() {
        let args = parse_args(&argv("bundle-server sales.csv --max-discount 1.5")).unwrap();
        assert!(resolve_config(&args).is_err());
    }
}
