//! Shared cache of the latest bundle run.
//!
//! Readers take a read lock and clone out what they need; a writer swaps the
//! whole state at once, so readers never observe a half-written run.

use bundle_engine::BundleRow;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct CacheState {
    rows: Vec<BundleRow>,
    last_error: Option<String>,
}

/// Snapshot of what the cache holds.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CacheStatus {
    pub rows: usize,
    pub branches: usize,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct BundleCache {
    state: RwLock<CacheState>,
}

impl BundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|poisoned| {
            log::warn!("BundleCache read lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|poisoned| {
            log::warn!("BundleCache write lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Swap in a new run and clear any recorded error.
    pub fn replace(&self, rows: Vec<BundleRow>) {
        let mut state = self.write();
        state.rows = rows;
        state.last_error = None;
    }

    /// Drop cached rows and remember why the last load failed.
    pub fn record_error(&self, message: impl Into<String>) {
        let mut state = self.write();
        state.rows.clear();
        state.last_error = Some(message.into());
    }

    /// Repopulate from `loader`. On failure the cache is emptied and the
    /// error recorded; the error is also returned to the caller.
    pub fn reload<F, E>(&self, loader: F) -> Result<CacheStatus, String>
    where
        F: FnOnce() -> Result<Vec<BundleRow>, E>,
        E: Display,
    {
        match loader() {
            Ok(rows) => {
                self.replace(rows);
                let status = self.status();
                log::info!(
                    "bundle cache reloaded rows={} branches={}",
                    status.rows,
                    status.branches
                );
                Ok(status)
            }
            Err(err) => {
                let message = err.to_string();
                log::warn!("bundle cache reload failed: {}", message);
                self.record_error(message.clone());
                Err(message)
            }
        }
    }

    pub fn invalidate(&self) {
        *self.write() = CacheState::default();
    }

    /// Cached rows of one branch, in cached order. Unknown branches and an
    /// empty cache both give an empty list.
    pub fn for_branch(&self, branch_id: &str) -> Vec<BundleRow> {
        self.read()
            .rows
            .iter()
            .filter(|r| r.branch_id == branch_id)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<BundleRow> {
        self.read().rows.clone()
    }

    pub fn status(&self) -> CacheStatus {
        let state = self.read();
        let branches: BTreeSet<&str> = state.rows.iter().map(|r| r.branch_id.as_str()).collect();
        CacheStatus {
            rows: state.rows.len(),
            branches: branches.len(),
            last_error: state.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(branch: &str, items: &str) -> BundleRow {
        BundleRow {
            branch_id: branch.into(),
            bundle_items: items.into(),
            discount_pct: 10.0,
            bundle_price: 5.0,
            expected_profit: 1.0,
            support: 0.0,
            lift: 1.0,
            reason: "Boost low-seller using strong anchor".into(),
        }
    }

    #[test]
    fn for_branch_filters_and_tolerates_unknown() {
        let cache = BundleCache::new();
        assert!(cache.for_branch("1").is_empty());
        cache.replace(vec![row("1", "A+B"), row("2", "C+D"), row("1", "E+F")]);
        let items: Vec<String> = cache.for_branch("1").into_iter().map(|r| r.bundle_items).collect();
        assert_eq!(items, vec!["A+B", "E+F"]);
        assert!(cache.for_branch("9").is_empty());
        assert_eq!(cache.status().branches, 2);
    }

    #[test]
    fn failed_reload_clears_rows_and_records_error() {
        let cache = BundleCache::new();
        cache.replace(vec![row("1", "A+B")]);
        let err = cache
            .reload(|| Err::<Vec<BundleRow>, _>("bundles.csv missing"))
            .unwrap_err();
        assert_eq!(err, "bundles.csv missing");
        let status = cache.status();
        assert_eq!(status.rows, 0);
        assert_eq!(status.last_error.as_deref(), Some("bundles.csv missing"));
    }

    #[test]
    fn successful_reload_clears_error() {
        let cache = BundleCache::new();
        cache.record_error("boom");
        let status = cache.reload(|| Ok::<_, String>(vec![row("3", "X+Y")])).unwrap();
        assert_eq!(status.rows, 1);
        assert_eq!(status.last_error, None);
    }

    #[test]
    fn invalidate_empties_everything() {
        let cache = BundleCache::new();
        cache.replace(vec![row("1", "A+B")]);
        cache.invalidate();
        assert_eq!(cache.status(), CacheStatus::default());
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let cache = std::sync::Arc::new(BundleCache::new());
        cache.replace(vec![row("1", "A+B")]);
        let c = std::sync::Arc::clone(&cache);
        let _ = std::thread::spawn(move || {
            let _guard = c.state.write().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert_eq!(cache.for_branch("1").len(), 1);
    }
}
