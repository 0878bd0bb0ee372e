// src/fetch/mod.rs
// =============================================================================
// Everything between "here is a URL" and "here are the hrefs on that page".
//
// Submodules:
// - http: downloads a page (no redirects, size ceiling, gzip)
// - charset: converts the body to UTF-8
// - html: extracts raw <a href> values
//
// The crawl engine only depends on the `Fetcher` trait from this module,
// plus the two pure functions for charset and links.
// =============================================================================

mod charset;
mod html;
mod http;

pub use charset::normalize;
pub use html::extract_hrefs;
pub use http::{Fetcher, HttpFetcher, Page};
