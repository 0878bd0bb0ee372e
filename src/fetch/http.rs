// src/fetch/http.rs
// =============================================================================
// Fetches pages over HTTP for the crawl engine.
//
// Key behavior:
// - Redirects are NOT followed: the engine must know the exact URL a body
//   came from to resolve its relative links correctly
// - gzip bodies are decoded transparently (reqwest's `gzip` feature)
// - The body is read chunk by chunk and cut off at a size ceiling
// - Any status code counts as a page: a 404 body is returned like a 200 body.
//   Only transport and read failures are errors
//
// The engine talks to a `Fetcher` trait rather than reqwest directly, so a
// test can swap in an in-memory site.
//
// Rust concepts:
// - async_trait: lets a trait have async methods and still be used as
//   `dyn Fetcher` behind an Arc
// - Send + Sync bounds: required to share the fetcher across tokio tasks
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{redirect, Client};
use url::Url;

use crate::error::{CrawlError, Result};

// A fetched response, whatever its status code
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    /// The URL the body was actually served from
    pub final_url: Url,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url`, keeping at most `max_body_bytes` of the body (0 = no limit)
    async fn fetch(&self, url: &str, max_body_bytes: usize) -> Result<Page>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .gzip(true)
            .timeout(timeout)
            .build()
            .map_err(CrawlError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, max_body_bytes: usize) -> Result<Page> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::fetch(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CrawlError::fetch(url, e))?
        {
            if max_body_bytes > 0 && body.len() + chunk.len() >= max_body_bytes {
                let room = max_body_bytes - body.len();
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(url, status, bytes = body.len(), "fetched");

        Ok(Page {
            status,
            final_url,
            content_type,
            body,
        })
    }
}
