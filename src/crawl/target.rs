// src/crawl/target.rs
// =============================================================================
// The crawl's root configuration.
//
// A Target is validated once (the URL must be absolute http/https with a
// host) and never changes after the crawl starts. From the URL we derive:
// - the registrable domain: the host with one leading "www." stripped
// - the literal host, including an explicit port if one was given
// - the seed list the engine starts from
//
// Example for "https://www.example.com:8443/start":
//   domain = "example.com"
//   host   = "www.example.com:8443"
//   seeds  = the URL itself, https://example.com, http://example.com,
//            https://www.example.com:8443, http://www.example.com:8443
// =============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{CrawlError, Result};

pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_RATE: u32 = 5;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:65.0) Gecko/20100101 Firefox/65.0";

#[derive(Debug, Clone)]
pub struct Target {
    url: String,
    domain: String,
    host: String,
    max_depth: usize,
    max_body_bytes: usize,
    rate: u32,
    timeout: Duration,
    user_agent: String,
}

impl Target {
    pub fn new(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| CrawlError::InvalidTarget {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CrawlError::InvalidTarget {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let host_name = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CrawlError::MissingHost(url.to_string()))?;

        let domain = host_name
            .strip_prefix("www.")
            .unwrap_or(host_name)
            .to_string();

        // port() is None when the port is the scheme's default
        let host = match parsed.port() {
            Some(port) => format!("{host_name}:{port}"),
            None => host_name.to_string(),
        };

        Ok(Self {
            url: url.to_string(),
            domain,
            host,
            max_depth: DEFAULT_MAX_DEPTH,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            rate: DEFAULT_RATE,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// 0 means unlimited
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Requests per second, 0 means unlimited
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    // Children of a page at `depth` may be admitted only if this is true
    pub fn allows_depth(&self, depth: usize) -> bool {
        self.max_depth == 0 || depth <= self.max_depth
    }

    // The literal URL plus the bare domain (and the host, if different)
    // under both schemes, since a site's canonical form may differ from
    // what the user typed
    pub fn seeds(&self) -> Vec<String> {
        let mut seeds = vec![
            self.url.clone(),
            format!("https://{}", self.domain),
            format!("http://{}", self.domain),
        ];

        if self.host != self.domain {
            seeds.push(format!("https://{}", self.host));
            seeds.push(format!("http://{}", self.host));
        }

        seeds
    }
}
