// src/crawl/scope.rs
// =============================================================================
// Decides whether a URL belongs to the crawl's domain.
//
// The matcher is a single anchored regex built once per crawl:
//
//   ^ (scheme://)? (userinfo@)? (label.)? <domain> (:port)? (/anything)? $
//
// Only ONE optional subdomain label is accepted. For the domain example.com:
//   example.com, www.example.com, blog.example.com   -> in scope
//   a.b.example.com, other.org, example.com.evil.net -> out of scope
//
// Scheme and host are case-insensitive, so "HTTPS://EXAMPLE.com/" is in
// scope too.
//
// Deeper subdomains are deliberately not recognized. Widening this would
// change which sites a crawl touches, so it stays a documented limitation.
//
// Rust concepts:
// - regex::escape: turns "example.com" into "example\.com"
// - Regex is compiled once and then only borrowed (&self) by every task
// =============================================================================

use regex::Regex;

use crate::error::{CrawlError, Result};

#[derive(Debug, Clone)]
pub struct DomainScope {
    domain: String,
    pattern: Regex,
}

impl DomainScope {
    pub fn new(domain: &str) -> Result<Self> {
        let source = format!(
            r"(?i)^(?:https?://)?(?:[^@/\n]+@)?(?:[a-z0-9]+\.)?{}(?::[0-9]+)?(?:/[^\n]*)?$",
            regex::escape(domain)
        );

        let pattern = Regex::new(&source).map_err(|e| CrawlError::InvalidTarget {
            url: domain.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            domain: domain.to_string(),
            pattern,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    // Malformed input (including the empty string produced by failed link
    // resolution) just doesn't match
    pub fn contains(&self, url: &str) -> bool {
        !url.is_empty() && self.pattern.is_match(url)
    }
}
