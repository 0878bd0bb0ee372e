// src/main.rs
// =============================================================================
// This is the entry point of the link-scout CLI.
//
// What happens here:
// 1. Set up diagnostics (tracing) on stderr
// 2. Parse command-line arguments using clap
// 3. Start the crawl and print each URL to stdout as soon as it is found
// 4. Exit with proper code (0 = crawl finished, 2 = configuration error)
//
// stdout carries nothing but results, so the output can be piped straight
// into other tools. Status lines, warnings and stats all go to stderr.
// =============================================================================

mod cli;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use link_scout::crawl::Crawler;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run(Cli::parse()).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG controls verbosity, e.g. RUST_LOG=link_scout=debug
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false).compact())
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let target = cli.target()?;
    let crawler = Crawler::with_http(target)?;

    eprintln!("[+] link-scout running");

    let mut discoveries = crawler.run();
    let mut stdout = io::stdout().lock();

    while let Some(discovered) = discoveries.next().await {
        if cli.json {
            writeln!(stdout, "{}", serde_json::to_string(&discovered)?)?;
        } else {
            writeln!(stdout, "{}", discovered.url)?;
        }
    }
    stdout.flush()?;

    eprintln!("[+] link-scout finished");

    if cli.stats {
        discoveries.stats().write_to_stderr();
    }

    Ok(())
}
