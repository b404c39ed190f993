//! Metric recording helpers over the `metrics` facade.
//!
//! Recorder installation is left to the embedding process; without one these
//! calls are no-ops.

use once_cell::sync::Lazy;

pub const SEARCH_REQUESTS: &str = "catalog_search_requests_total";
pub const SEARCH_CACHE_HITS: &str = "catalog_search_cache_hits_total";
pub const SEARCH_CACHE_MISSES: &str = "catalog_search_cache_misses_total";
pub const MERGE_FLAGGED: &str = "catalog_search_merge_flagged_total";

/// Metric catalog: name and help text, in one place.
static CATALOG: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        (SEARCH_REQUESTS, "Search executions per index"),
        (SEARCH_CACHE_HITS, "Merged responses served from cache"),
        (SEARCH_CACHE_MISSES, "Merged responses computed fresh"),
        (MERGE_FLAGGED, "Merges that attached an error code"),
    ]
});

pub fn describe_all() {
    for (name, help) in CATALOG.iter() {
        ::metrics::describe_counter!(*name, *help);
    }
}

pub fn search_executed(index: &str) {
    ::metrics::counter!(SEARCH_REQUESTS, "index" => index.to_string()).increment(1);
}

pub fn cache_hit() {
    ::metrics::counter!(SEARCH_CACHE_HITS).increment(1);
}

pub fn cache_miss() {
    ::metrics::counter!(SEARCH_CACHE_MISSES).increment(1);
}

pub fn merge_flagged(code: &str) {
    ::metrics::counter!(MERGE_FLAGGED, "code" => code.to_string()).increment(1);
}
