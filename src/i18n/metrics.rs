//! Lookup and detection metrics.
//!
//! Counts how lookups were satisfied (requested locale, default-locale
//! fallback, or raw key placeholder) and how geolocation detection fared.
//! Untranslated text shows up here before anyone has to grep the pages.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

pub struct LookupMetrics {
    /// Lookups answered in the requested locale
    direct_hits: AtomicUsize,

    /// Lookups answered by the default locale
    default_fallbacks: AtomicUsize,

    /// Lookups that rendered the key path itself
    placeholders: AtomicUsize,

    /// Geolocation provider requests issued
    geo_requests: AtomicUsize,

    /// Geolocation provider requests that failed
    geo_failures: AtomicUsize,
}

static METRICS: OnceLock<LookupMetrics> = OnceLock::new();

impl LookupMetrics {
    pub(crate) fn new() -> Self {
        Self {
            direct_hits: AtomicUsize::new(0),
            default_fallbacks: AtomicUsize::new(0),
            placeholders: AtomicUsize::new(0),
            geo_requests: AtomicUsize::new(0),
            geo_failures: AtomicUsize::new(0),
        }
    }

    /// Get the process-wide metrics instance.
    pub fn global() -> &'static LookupMetrics {
        METRICS.get_or_init(LookupMetrics::new)
    }

    pub fn record_direct_hit(&self) {
        self.direct_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_default_fallback(&self) {
        self.default_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_placeholder(&self) {
        self.placeholders.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geo_request(&self) {
        self.geo_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geo_failure(&self) {
        self.geo_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn direct_hits(&self) -> usize {
        self.direct_hits.load(Ordering::Relaxed)
    }

    pub fn default_fallbacks(&self) -> usize {
        self.default_fallbacks.load(Ordering::Relaxed)
    }

    pub fn placeholders(&self) -> usize {
        self.placeholders.load(Ordering::Relaxed)
    }

    pub fn geo_requests(&self) -> usize {
        self.geo_requests.load(Ordering::Relaxed)
    }

    pub fn geo_failures(&self) -> usize {
        self.geo_failures.load(Ordering::Relaxed)
    }

    /// Snapshot the counters into a report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.direct_hits();
        let fallbacks = self.default_fallbacks();
        let placeholders = self.placeholders();
        let total_lookups = hits + fallbacks + placeholders;
        let direct_hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        let requests = self.geo_requests();
        let failures = self.geo_failures();
        let geo_success_rate = if requests > 0 {
            (requests.saturating_sub(failures) as f64 / requests as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            direct_hits: hits,
            default_fallbacks: fallbacks,
            placeholders,
            direct_hit_rate,
            geo_requests: requests,
            geo_failures: failures,
            geo_success_rate,
        }
    }
}

/// Point-in-time view of [`LookupMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub direct_hits: usize,
    pub default_fallbacks: usize,
    pub placeholders: usize,

    /// Share of lookups answered in the requested locale (0-100)
    pub direct_hit_rate: f64,

    pub geo_requests: usize,
    pub geo_failures: usize,

    /// Share of provider requests that succeeded (0-100)
    pub geo_success_rate: f64,
}
