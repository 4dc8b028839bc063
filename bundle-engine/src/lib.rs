//! Two-item bundle suggestions for multi-branch retail.
//!
//! Pairs slow-selling items with high-volume, profitable anchors, prices
//! the pair at the deepest discount that still meets a target margin, and
//! ranks the result per branch.

pub mod association;
pub mod baskets;
pub mod candidates;
pub mod comovement;
pub mod config;
pub mod economics;
pub mod engine;
pub mod error;
pub mod math;
pub mod pairs;
pub mod pricing;
pub mod scoring;
pub mod table;
pub mod types;

pub use association::AssociationModel;
pub use config::{BundleConfig, ScoringWeights};
pub use economics::{normalize_item_sales, NormalizedSales};
pub use engine::{generate_bundle_suggestions, BranchReport, BundleEngine};
pub use error::{BundleError, BundleResult};
pub use pairs::{mine_pair_stats, PairIndex};
pub use table::RawTable;
pub use types::{
    Basket, BasketKeyMode, BundleRow, BundleSuggestion, ItemSalesRecord, PairStat,
    SalesObservation, TransactionRow,
};
