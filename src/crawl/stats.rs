// src/crawl/stats.rs
// =============================================================================
// Counters describing a crawl while it runs and after it finishes.
//
// Every counter is an AtomicUsize, bumped by whichever task observes the
// event. They are for reporting only; no crawl decision ever reads them.
// =============================================================================

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

#[derive(Debug, Default)]
pub struct CrawlStats {
    admitted: AtomicUsize,
    out_of_scope: AtomicUsize,
    duplicates: AtomicUsize,
    fetched: AtomicUsize,
    failed: AtomicUsize,
    links_found: AtomicUsize,
    in_flight: AtomicUsize,
}

/// Plain copy of the counters at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub admitted: usize,
    pub out_of_scope: usize,
    pub duplicates: usize,
    pub fetched: usize,
    pub failed: usize,
    pub links_found: usize,
    pub in_flight: usize,
}

impl CrawlStats {
    pub(crate) fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_out_of_scope(&self) {
        self.out_of_scope.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetched(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_links(&self, count: usize) {
        self.links_found.fetch_add(count, Ordering::Relaxed);
    }

    // Held by a branch for its whole lifetime, children included
    pub(crate) fn branch_started(self: &Arc<Self>) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            stats: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            out_of_scope: self.out_of_scope.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            links_found: self.links_found.load(Ordering::Relaxed),
            in_flight: self.in_flight(),
        }
    }
}

pub(crate) struct InFlightGuard {
    stats: Arc<CrawlStats>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl StatsSnapshot {
    pub fn write_to_stderr(&self) {
        let stderr = io::stderr();
        let mut handle = stderr.lock();

        let _ = writeln!(handle, "\n=== Crawl Statistics ===");
        let _ = writeln!(handle, "URLs admitted:        {}", self.admitted);
        let _ = writeln!(handle, "Pages fetched:        {}", self.fetched);
        let _ = writeln!(handle, "Pages failed:         {}", self.failed);
        let _ = writeln!(handle, "Links found:          {}", self.links_found);
        let _ = writeln!(handle, "Rejected (scope):     {}", self.out_of_scope);
        let _ = writeln!(handle, "Rejected (duplicate): {}", self.duplicates);
        let _ = writeln!(handle, "========================\n");
    }
}
