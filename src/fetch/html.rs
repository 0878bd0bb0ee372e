// src/fetch/html.rs
// =============================================================================
// This module pulls raw link targets out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so broken markup is fine
//
// Unlike a link checker we return hrefs exactly as written. Resolving them
// against the page URL is the crawl engine's job, because only the engine
// knows which URL the page was really served from.
// =============================================================================

use scraper::{Html, Selector};

// Returns the href of every <a href> in document order
//
// Example:
//   html   = "<a href='/docs'>Docs</a><a href='#top'>Top</a>"
//   result = ["/docs", "#top"]
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
