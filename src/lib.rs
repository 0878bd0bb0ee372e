//! A bounded, polite, concurrent web crawler.
//!
//! Starting from one URL, link-scout streams every URL it can reach within a
//! link-depth limit while staying on the starting page's domain (and its
//! single-label subdomains). All fetches share one requests-per-second
//! ceiling, no matter how many pages are being crawled at once.
//!
//! # Usage
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use link_scout::crawl::{Crawler, Target};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), link_scout::CrawlError> {
//!     let target = Target::new("https://example.com/")?
//!         .with_max_depth(2)
//!         .with_rate(5);
//!
//!     let mut found = Crawler::with_http(target)?.run();
//!     while let Some(discovered) = found.next().await {
//!         println!("{}", discovered.url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! URLs are reported as soon as they are admitted, before they are fetched,
//! and the stream ends once every branch of the crawl has finished.

pub mod crawl;
pub mod error;
pub mod fetch;

pub use error::{CrawlError, Result};
