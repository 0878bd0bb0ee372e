// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using a
// Rust struct and attributes (the #[...] things). There are no subcommands:
// link-scout does one thing, so every option is a flag on the top level.
//
//   link-scout -u https://example.com -d 3 -r 10
// =============================================================================

use std::time::Duration;

use clap::Parser;
use link_scout::crawl::{
    Target, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_DEPTH, DEFAULT_RATE, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT,
};
use link_scout::Result;

#[derive(Parser, Debug)]
#[command(
    name = "link-scout",
    version,
    about = "Stream every URL of a website, up to a link depth, politely",
    long_about = "link-scout crawls a website starting from one URL and prints every URL it \
                  discovers on the same domain (or a direct subdomain), one per line, as soon \
                  as it is found. All requests share a single requests-per-second ceiling."
)]
pub struct Cli {
    /// Target URL to start crawling from (required)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url: String,

    /// Maximum depth in link hops from the starting URLs, 0 = no limit
    #[arg(short = 'd', long = "depth", default_value_t = DEFAULT_MAX_DEPTH)]
    pub depth: usize,

    /// Requests per second across the whole crawl, 0 = no limit
    #[arg(short = 'r', long = "rate", default_value_t = DEFAULT_RATE)]
    pub rate: u32,

    /// Maximum bytes read from each response body
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body: usize,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Print each discovered URL as a JSON object instead of a plain line
    #[arg(long)]
    pub json: bool,

    /// Print crawl statistics to stderr when finished
    #[arg(long)]
    pub stats: bool,
}

impl Cli {
    // Validates the URL and turns the flags into the crawl's configuration
    pub fn target(&self) -> Result<Target> {
        Ok(Target::new(&self.url)?
            .with_max_depth(self.depth)
            .with_rate(self.rate)
            .with_max_body_bytes(self.max_body)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_user_agent(self.user_agent.clone()))
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why short flags like -u instead of a positional URL?
//    - Scripts written for earlier crawlers call it as `-u <url> -d <n> -r <n>`
//    - The long forms (--url, --depth, --rate) are there for readability
//
// 2. What happens if -u is missing?
//    - clap prints a usage error and exits with code 2 before we run anything
//
// 3. Why is the URL a String and not a url::Url?
//    - Target::new does the validation so the library and the CLI reject
//      exactly the same inputs with the same error message
// -----------------------------------------------------------------------------
