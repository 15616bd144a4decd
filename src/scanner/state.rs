//! Scan-in-progress flag and last-results cache

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use crate::types::ArbitrageRoute;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub completed: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Shared by the scanner and anything that reads its results.
#[derive(Debug, Default)]
pub struct ScannerState {
    scanning: AtomicBool,
    last_results: RwLock<Vec<ArbitrageRoute>>,
    last_completed_at: RwLock<Option<DateTime<Utc>>>,
    completed: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Held for the duration of one scan; dropping it returns the state to idle.
pub struct ScanGuard<'a> {
    state: &'a ScannerState,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.state.scanning.store(false, Ordering::Release);
    }
}

impl ScannerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips idle to scanning. `None` when a scan is already running.
    pub fn try_begin(&self) -> Option<ScanGuard<'_>> {
        self.scanning
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ScanGuard { state: self })
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    pub async fn last_results(&self) -> Vec<ArbitrageRoute> {
        self.last_results.read().await.clone()
    }

    pub async fn last_completed_at(&self) -> Option<DateTime<Utc>> {
        *self.last_completed_at.read().await
    }

    pub(crate) async fn record_completed(&self, routes: &[ArbitrageRoute]) {
        *self.last_results.write().await = routes.to_vec();
        *self.last_completed_at.write().await = Some(Utc::now());
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> ScanStats {
        ScanStats {
            completed: self.completed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
