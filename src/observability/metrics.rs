//! Catalog counters
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Reset only when the catalog is constructed

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operation counters for one catalog
///
/// Counters are atomics so a shared reference can record reads.
#[derive(Debug, Default)]
pub struct CatalogMetrics {
    inserts: AtomicU64,
    rejected_inserts: AtomicU64,
    removes: AtomicU64,
    queries: AtomicU64,
    sorts: AtomicU64,
    invariant_checks: AtomicU64,
}

impl CatalogMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_inserts(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected_inserts(&self) {
        self.rejected_inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_removes(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sorts(&self) {
        self.sorts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_invariant_checks(&self) {
        self.invariant_checks.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            rejected_inserts: self.rejected_inserts.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            sorts: self.sorts.load(Ordering::Relaxed),
            invariant_checks: self.invariant_checks.load(Ordering::Relaxed),
        }
    }
}

impl Clone for CatalogMetrics {
    fn clone(&self) -> Self {
        let snapshot = self.snapshot();
        Self {
            inserts: AtomicU64::new(snapshot.inserts),
            rejected_inserts: AtomicU64::new(snapshot.rejected_inserts),
            removes: AtomicU64::new(snapshot.removes),
            queries: AtomicU64::new(snapshot.queries),
            sorts: AtomicU64::new(snapshot.sorts),
            invariant_checks: AtomicU64::new(snapshot.invariant_checks),
        }
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub inserts: u64,
    pub rejected_inserts: u64,
    pub removes: u64,
    pub queries: u64,
    pub sorts: u64,
    pub invariant_checks: u64,
}
