//! cosmetic-filter entry point.
//!
//! Simulates one page load: reads an HTML document, resolves the selector
//! list (cache or network), filters the document, then feeds any extra HTML
//! fragments through the mutation watcher as dynamically added content.
//! The cleaned document goes to stdout; logs go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cosmetic_client::{FilterContext, Page, RemoteFilterList};
use cosmetic_core::{AppConfig, LocalStorage, SelectorCache};
use tracing_subscriber::EnvFilter;

/// Simulate one page load through the cosmetic filter.
#[derive(Parser, Debug)]
#[command(name = "cosmetic-filter", version, about)]
struct Cli {
    /// HTML page to filter (`-` or omitted reads stdin).
    page: Option<PathBuf>,

    /// HTML fragments appended to `<body>` after load, in order.
    fragments: Vec<PathBuf>,
}

impl Cli {
    fn page_path(&self) -> Option<&Path> {
        self.page.as_deref().filter(|p| *p != Path::new("-"))
    }

    fn read_page(&self) -> Result<String> {
        match self.page_path() {
            Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
            None => {
                let mut html = String::new();
                std::io::stdin().read_to_string(&mut html).context("reading page from stdin")?;
                Ok(html)
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let storage = LocalStorage::open(&config.db_path).await?;
    let source = RemoteFilterList::from_config(&config)?;
    let mut ctx = FilterContext::from_config(SelectorCache::new(storage), source, &config);

    let mut page = Page::parse(&cli.read_page()?);
    let outcome = ctx.init(&mut page).await?;
    tracing::info!(
        freshness = ?outcome.freshness,
        selectors = outcome.selectors,
        removed = outcome.removed,
        watching = outcome.watching,
        "page initialized"
    );

    for path in &cli.fragments {
        let fragment = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        if let Err(e) = page.append_to_body(&fragment) {
            tracing::warn!(error = %e, fragment = %path.display(), "fragment not inserted");
            continue;
        }
        page.flush_mutations();
    }

    println!("{}", page.html());

    Ok(())
}
