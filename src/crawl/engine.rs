// src/crawl/engine.rs
// =============================================================================
// The crawl engine: recursive, concurrent, depth-bounded link discovery.
//
// How it works:
// 1. Every seed URL goes through admit() at depth 0
// 2. admit() drops the URL if it is out of scope or already visited,
//    otherwise it emits the URL to the caller and spawns a branch task
// 3. A branch waits for the rate limiter, fetches the page, decodes it,
//    extracts hrefs, resolves them against the page's final URL and calls
//    admit() for each one at depth + 1
// 4. Each branch keeps its children in a JoinSet and only finishes once
//    they have, so the seeds' JoinSet drains exactly when the whole crawl
//    is done. At that point the last result sender is dropped and the
//    stream ends
//
// Errors stay inside their branch: a failed fetch logs a warning and that
// branch simply has no children. Its siblings never notice.
//
// Rust concepts:
// - Arc<Engine>: every task shares one read-only engine; the only mutable
//   shared pieces (visited set, limiter, stats) handle their own sync
// - JoinSet: a group of spawned tasks that can be awaited together
// - BoxFuture: a task that spawns copies of itself needs a named, boxed
//   future type, otherwise its type would contain itself
// =============================================================================

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt};
use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use url::Url;

use super::limiter::RateLimiter;
use super::scope::DomainScope;
use super::stats::{CrawlStats, InFlightGuard, StatsSnapshot};
use super::target::Target;
use super::visited::{fingerprint, VisitedStore};
use crate::error::{CrawlError, Result};
use crate::fetch::{self, Fetcher, HttpFetcher};

/// A URL the crawl admitted, reported before it is fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovered {
    pub url: String,
    /// Link hops from the nearest seed (seeds are depth 0)
    pub depth: usize,
}

pub struct Crawler {
    target: Target,
    scope: DomainScope,
    fetcher: Arc<dyn Fetcher>,
}

impl Crawler {
    pub fn new(target: Target, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let scope = DomainScope::new(target.domain())?;
        Ok(Self {
            target,
            scope,
            fetcher,
        })
    }

    /// A crawler fetching over real HTTP with the target's user agent and timeout
    pub fn with_http(target: Target) -> Result<Self> {
        let fetcher = HttpFetcher::new(target.user_agent(), target.timeout())?;
        Self::new(target, Arc::new(fetcher))
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Starts the crawl in the background and returns its result stream.
    ///
    /// Must be called from inside a tokio runtime. The crawl always runs
    /// to completion; dropping the stream only discards further results.
    pub fn run(self) -> Discoveries {
        let (results, receiver) = mpsc::unbounded_channel();
        let stats = Arc::new(CrawlStats::default());

        let engine = Arc::new(Engine {
            limiter: RateLimiter::new(self.target.rate()),
            visited: VisitedStore::new(),
            scope: self.scope,
            fetcher: self.fetcher,
            stats: Arc::clone(&stats),
            results,
            target: self.target,
        });

        tokio::spawn(engine.drive());

        Discoveries { receiver, stats }
    }
}

// The caller's side of the crawl. Yields each admitted URL once, in no
// guaranteed order, and ends when every branch has finished.
//
// The channel is unbounded so branches never wait on a slow consumer.
// Memory is the only limit on how far ahead the crawl can get.
pub struct Discoveries {
    receiver: mpsc::UnboundedReceiver<Discovered>,
    stats: Arc<CrawlStats>,
}

impl Discoveries {
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl Stream for Discoveries {
    type Item = Discovered;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

struct Engine {
    target: Target,
    scope: DomainScope,
    visited: VisitedStore,
    limiter: RateLimiter,
    fetcher: Arc<dyn Fetcher>,
    stats: Arc<CrawlStats>,
    results: mpsc::UnboundedSender<Discovered>,
}

impl Engine {
    async fn drive(self: Arc<Self>) {
        tracing::info!(
            url = self.target.url(),
            domain = self.target.domain(),
            max_depth = self.target.max_depth(),
            rate = self.target.rate(),
            "crawl started"
        );

        let mut seeds = JoinSet::new();
        for seed in self.target.seeds() {
            self.admit(seed, 0, &mut seeds);
        }
        join_all(&mut seeds).await;

        tracing::info!(stats = ?self.stats.snapshot(), "crawl finished");
    }

    // Candidate -> Rejected(scope) | Rejected(duplicate) | Admitted
    fn admit(self: &Arc<Self>, url: String, depth: usize, branches: &mut JoinSet<()>) {
        if !self.scope.contains(&url) {
            self.stats.record_out_of_scope();
            tracing::trace!(url = %url, "out of scope");
            return;
        }

        if !self.visited.try_visit(fingerprint(&url)) {
            self.stats.record_duplicate();
            tracing::trace!(url = %url, "already visited");
            return;
        }

        self.stats.record_admitted();
        tracing::debug!(url = %url, depth, "admitted");

        let discovered = Discovered {
            url: url.clone(),
            depth,
        };
        if self.results.send(discovered).is_err() {
            tracing::trace!(url = %url, "result stream dropped by consumer");
        }

        let guard = self.stats.branch_started();
        branches.spawn(Arc::clone(self).branch(url, depth, guard));
    }

    // Admitted -> FetchFailed | Fetched -> LinksExtracted -> ChildrenScheduled
    fn branch(
        self: Arc<Self>,
        url: String,
        depth: usize,
        guard: InFlightGuard,
    ) -> BoxFuture<'static, ()> {
        async move {
            let _guard = guard;

            let (final_url, hrefs) = match self.visit(&url).await {
                Ok(visited) => visited,
                Err(e) => {
                    self.stats.record_failed();
                    tracing::warn!("{e}");
                    return;
                }
            };

            if !self.target.allows_depth(depth + 1) {
                return;
            }

            let mut children = JoinSet::new();
            for href in hrefs {
                let child = resolve(&final_url, &href);
                self.admit(child, depth + 1, &mut children);
            }
            join_all(&mut children).await;
        }
        .boxed()
    }

    // Rate-limited fetch, charset fix-up and link extraction for one page
    async fn visit(&self, url: &str) -> Result<(Url, Vec<String>)> {
        self.limiter.take().await;

        let page = self
            .fetcher
            .fetch(url, self.target.max_body_bytes())
            .await?;
        self.stats.record_fetched();

        // Error pages are crawled for links like any other page
        if !(200..300).contains(&page.status) {
            tracing::debug!(url, status = page.status, "non-success status");
        }

        let text = fetch::normalize(&page.body, page.content_type.as_deref()).map_err(|reason| {
            CrawlError::Decode {
                url: url.to_string(),
                reason,
            }
        })?;

        let hrefs = fetch::extract_hrefs(&text);
        self.stats.record_links(hrefs.len());

        Ok((page.final_url, hrefs))
    }
}

async fn join_all(branches: &mut JoinSet<()>) {
    while let Some(joined) = branches.join_next().await {
        if let Err(e) = joined {
            tracing::error!("crawl branch did not complete: {e}");
        }
    }
}

// Resolves an href against the URL its page was served from.
//
// Returns an empty string (which no scope accepts) for:
// - fragment-only links like "#section"
// - hrefs that don't resolve to a URL
// - non-web schemes such as mailto:, tel:, javascript:
pub(crate) fn resolve(base: &Url, href: &str) -> String {
    if href.starts_with('#') {
        return String::new();
    }

    match base.join(href) {
        Ok(mut url) if matches!(url.scheme(), "http" | "https") => {
            url.set_fragment(None);
            url.to_string()
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    // An in-memory website. Unknown URLs fail like a refused connection.
    #[derive(Default)]
    struct StaticSite {
        pages: HashMap<String, fetch::Page>,
    }

    impl StaticSite {
        fn page(self, url: &str, html: &str) -> Self {
            self.serve(url, url, 200, html)
        }

        fn serve(mut self, url: &str, final_url: &str, status: u16, html: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                fetch::Page {
                    status,
                    final_url: Url::parse(final_url).unwrap(),
                    content_type: Some("text/html; charset=utf-8".to_string()),
                    body: html.as_bytes().to_vec(),
                },
            );
            self
        }
    }

    #[async_trait]
    impl Fetcher for StaticSite {
        async fn fetch(&self, url: &str, _max_body_bytes: usize) -> Result<fetch::Page> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| CrawlError::fetch(url, "connection refused"))
        }
    }

    async fn crawl(target: Target, site: StaticSite) -> (Vec<Discovered>, StatsSnapshot) {
        let mut stream = Crawler::new(target, Arc::new(site)).unwrap().run();
        let mut found = Vec::new();
        while let Some(discovered) = stream.next().await {
            found.push(discovered);
        }
        (found, stream.stats())
    }

    fn urls(found: &[Discovered]) -> Vec<&str> {
        let mut urls: Vec<&str> = found.iter().map(|d| d.url.as_str()).collect();
        urls.sort();
        urls
    }

    fn target(url: &str, max_depth: usize) -> Target {
        Target::new(url)
            .unwrap()
            .with_max_depth(max_depth)
            .with_rate(0)
    }

    #[tokio::test]
    async fn test_relative_link_is_resolved_and_emitted_once() {
        let site = StaticSite::default().page(
            "https://example.com/",
            r#"<a href="/about">About</a><a href="/about">About again</a>"#,
        );

        let (found, stats) = crawl(target("https://example.com/", 1), site).await;

        assert_eq!(
            urls(&found),
            vec![
                "http://example.com",
                "https://example.com",
                "https://example.com/",
                "https://example.com/about",
            ]
        );
        let about = found.iter().find(|d| d.url == "https://example.com/about").unwrap();
        assert_eq!(about.depth, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_mixed_case_target_is_crawled() {
        let site = StaticSite::default().page(
            "https://EXAMPLE.com/docs/",
            r#"<a href="child">Child</a>"#,
        );

        let (found, _) = crawl(target("https://EXAMPLE.com/docs/", 1), site).await;

        // The page's final URL is normalized, so its children are lowercase
        assert_eq!(
            urls(&found),
            vec![
                "http://example.com",
                "https://EXAMPLE.com/docs/",
                "https://example.com",
                "https://example.com/docs/child",
            ]
        );
    }

    #[tokio::test]
    async fn test_fragment_only_links_have_no_children() {
        let site = StaticSite::default().page(
            "https://example.com/",
            r##"<a href="#section">Jump</a><a href="#">Top</a>"##,
        );

        let (found, _) = crawl(target("https://example.com/", 3), site).await;

        assert_eq!(
            urls(&found),
            vec!["http://example.com", "https://example.com", "https://example.com/"]
        );
    }

    #[tokio::test]
    async fn test_out_of_domain_links_are_never_emitted() {
        let site = StaticSite::default()
            .page(
                "https://example.com/",
                r#"
                    <a href="https://other.org/page">Other</a>
                    <a href="https://a.b.example.com/">Too deep</a>
                    <a href="https://blog.example.com/">Blog</a>
                    <a href="mailto:team@example.com">Mail</a>
                "#,
            )
            .page("https://blog.example.com/", r#"<a href="/post">Post</a>"#)
            .page("https://other.org/page", r#"<a href="https://example.com/x">x</a>"#);

        let (found, stats) = crawl(target("https://example.com/", 5), site).await;
        let found = urls(&found);

        assert!(found.contains(&"https://blog.example.com/"));
        assert!(found.contains(&"https://blog.example.com/post"));
        assert!(!found.iter().any(|u| u.contains("other.org")));
        assert!(!found.iter().any(|u| u.contains("a.b.example.com")));
        assert!(!found.iter().any(|u| u.starts_with("mailto:")));
        assert!(stats.out_of_scope >= 3);
    }

    #[tokio::test]
    async fn test_depth_limits_link_hops() {
        let site = StaticSite::default()
            .page("https://example.com/a", r#"<a href="/b">b</a>"#)
            .page("https://example.com/b", r#"<a href="/c">c</a>"#)
            .page("https://example.com/c", r#"<a href="/d">d</a>"#)
            .page("https://example.com/d", r#"<a href="/e">e</a>"#);

        let (found, _) = crawl(target("https://example.com/a", 2), site).await;

        assert!(found.iter().all(|d| d.depth <= 2));
        let found = urls(&found);
        assert!(found.contains(&"https://example.com/c"));
        assert!(!found.contains(&"https://example.com/d"));
    }

    #[tokio::test]
    async fn test_zero_depth_means_unlimited() {
        let site = StaticSite::default()
            .page("https://example.com/a", r#"<a href="/b">b</a>"#)
            .page("https://example.com/b", r#"<a href="/c">c</a>"#)
            .page("https://example.com/c", r#"<a href="/d">d</a>"#)
            .page("https://example.com/d", r#"<a href="/a">back to a</a>"#);

        let (found, _) = crawl(target("https://example.com/a", 0), site).await;

        let found = urls(&found);
        assert!(found.contains(&"https://example.com/d"));
        assert_eq!(found.len(), 6);
    }

    #[tokio::test]
    async fn test_failed_fetch_only_ends_its_branch() {
        let site = StaticSite::default()
            .page(
                "https://example.com/",
                r#"<a href="/broken">broken</a><a href="/ok">ok</a>"#,
            )
            .page("https://example.com/ok", r#"<a href="/leaf">leaf</a>"#);

        let (found, stats) = crawl(target("https://example.com/", 3), site).await;

        let found = urls(&found);
        assert!(found.contains(&"https://example.com/broken"));
        assert!(found.contains(&"https://example.com/leaf"));
        assert!(stats.failed >= 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_error_pages_are_parsed_for_links() {
        let site = StaticSite::default().serve(
            "https://example.com/",
            "https://example.com/",
            404,
            r#"<a href="/home">home</a>"#,
        );

        let (found, _) = crawl(target("https://example.com/", 1), site).await;

        assert!(urls(&found).contains(&"https://example.com/home"));
    }

    #[tokio::test]
    async fn test_links_resolve_against_final_url() {
        let site = StaticSite::default().serve(
            "https://example.com/",
            "https://example.com/docs/index.html",
            200,
            r#"<a href="intro">Intro</a>"#,
        );

        let (found, _) = crawl(target("https://example.com/", 1), site).await;

        assert!(urls(&found).contains(&"https://example.com/docs/intro"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_shared_link_is_admitted_once_under_contention() {
        let hub: String = (0..50)
            .map(|i| format!(r#"<a href="/p{i}">p{i}</a>"#))
            .collect();

        let mut site = StaticSite::default().page("https://example.com/", &hub);
        for i in 0..50 {
            site = site.page(
                &format!("https://example.com/p{i}"),
                r#"<a href="/shared">shared</a><a href="/">home</a>"#,
            );
        }

        let (found, stats) = crawl(target("https://example.com/", 2), site).await;

        let shared = found
            .iter()
            .filter(|d| d.url == "https://example.com/shared")
            .count();
        assert_eq!(shared, 1);

        let unique: HashSet<&str> = found.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(unique.len(), found.len());
        assert!(stats.duplicates >= 49);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_go_through_the_rate_limiter() {
        let site = StaticSite::default().page("https://example.com/", "");
        let target = Target::new("https://example.com/")
            .unwrap()
            .with_max_depth(1)
            .with_rate(1);

        let start = tokio::time::Instant::now();
        let (found, stats) = crawl(target, site).await;

        // Three seeds at one request per second need three windows
        assert_eq!(found.len(), 3);
        assert_eq!(stats.fetched + stats.failed, 3);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_crawl_against_real_http_server() {
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<a href="/about">About</a><a href="https://other.org/x">x</a>"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/about");
                then.status(200).body("<p>about</p>");
            })
            .await;

        let target = Target::new(&server.url("/"))
            .unwrap()
            .with_max_depth(1)
            .with_rate(0)
            .with_timeout(Duration::from_secs(2));
        let mut stream = Crawler::with_http(target).unwrap().run();

        let mut found = Vec::new();
        while let Some(discovered) = stream.next().await {
            found.push(discovered.url);
        }

        let about = server.url("/about");
        assert_eq!(found.iter().filter(|u| **u == about).count(), 1);
        assert!(!found.iter().any(|u| u.contains("other.org")));
    }

    #[test]
    fn test_resolve() {
        let base = Url::parse("https://example.com/docs/page").unwrap();

        assert_eq!(resolve(&base, "/about"), "https://example.com/about");
        assert_eq!(resolve(&base, "intro"), "https://example.com/docs/intro");
        assert_eq!(resolve(&base, "../up"), "https://example.com/up");
        assert_eq!(resolve(&base, "next#part"), "https://example.com/docs/next");
        assert_eq!(resolve(&base, "//cdn.example.com/a"), "https://cdn.example.com/a");
        assert_eq!(resolve(&base, "https://other.org"), "https://other.org/");
    }

    #[test]
    fn test_resolve_rejects_unusable_hrefs() {
        let base = Url::parse("https://example.com/page").unwrap();

        assert_eq!(resolve(&base, "#section"), "");
        assert_eq!(resolve(&base, "mailto:test@example.com"), "");
        assert_eq!(resolve(&base, "javascript:void(0)"), "");
        assert_eq!(resolve(&base, "http://[::1"), "");
    }
}
