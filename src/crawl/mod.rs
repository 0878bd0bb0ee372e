// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent, recursive crawling from a set of seed URLs
// - Stays on the target's domain (plus one level of subdomains)
// - Configurable depth limit, counted in link hops from a seed
// - Every URL is admitted exactly once, even when many tasks race for it
// - Polite crawling: one shared requests-per-second ceiling for all tasks
//
// Submodules:
// - target: validated crawl configuration and seed URLs
// - scope: the domain matcher
// - visited: atomic check-and-insert set of URL fingerprints
// - limiter: the rate limiter actor
// - stats: counters for reporting
// - engine: ties it all together and produces the result stream
// =============================================================================

mod engine;
mod limiter;
mod scope;
mod stats;
mod target;
mod visited;

pub use engine::{Crawler, Discovered, Discoveries};
pub use limiter::RateLimiter;
pub use scope::DomainScope;
pub use stats::{CrawlStats, StatsSnapshot};
pub use target::{
    Target, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_DEPTH, DEFAULT_RATE, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT,
};
pub use visited::{fingerprint, VisitedStore};
