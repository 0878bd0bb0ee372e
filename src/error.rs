// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// Only a few things can actually go wrong in a way worth a value:
// - The target URL is unusable (fatal, reported before crawling starts)
// - A single page could not be fetched or decoded (fatal to that branch only)
//
// Out-of-scope links, duplicates and unresolvable hrefs are NOT errors. The
// engine drops them silently and counts them in the crawl stats.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - #[source]: keeps the underlying cause for error chains
// =============================================================================

use thiserror::Error;

pub type Result<T, E = CrawlError> = std::result::Result<T, E>;

// Boxed cause so fake fetchers in tests can produce fetch errors too
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum CrawlError {
    /// The target URL could not be parsed or is not http(s)
    #[error("invalid target URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    /// The target URL parsed but has no host to derive a domain from
    #[error("target URL has no host: {0}")]
    MissingHost(String),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport failure or failure while reading the body
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The page body could not be transcoded to UTF-8
    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl CrawlError {
    pub fn fetch(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CrawlError::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }

    /// True for errors that abort the whole run rather than one branch
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CrawlError::InvalidTarget { .. } | CrawlError::MissingHost(_) | CrawlError::Client(_)
        )
    }
}
