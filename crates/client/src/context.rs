//! Per-page-load orchestration.
//!
//! On load the cache age decides between two paths:
//! - **Stale** (no timestamp, or older than the update interval): download,
//!   parse and store a fresh selector list.
//! - **Fresh**: read the stored selector list.
//!
//! Both paths then filter the whole document once and start watching
//! `<body>` for new content, unless the resulting selector set is empty.

use chrono::{DateTime, Utc};
use cosmetic_core::{AppConfig, Error, SelectorCache, SelectorSet};

use crate::dom::{Blocker, Page, SelectorWatcher};
use crate::fetch::FilterSource;
use crate::filters::parse_selectors;

/// Which branch the cache age check selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Stale,
    Fresh,
}

/// Decide whether the cached selectors must be refetched.
///
/// A missing timestamp counts as the epoch, so it is always stale. The
/// cache stays fresh up to and including exactly `interval` of age.
pub fn freshness(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: chrono::Duration) -> Freshness {
    let last_update = last_update.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    if now - last_update > interval { Freshness::Stale } else { Freshness::Fresh }
}

/// Summary of one page-load initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOutcome {
    /// Branch taken. A corrupt cache record reports `Stale`.
    pub freshness: Freshness,
    /// Selectors in the active set.
    pub selectors: usize,
    /// Elements removed by the initial whole-document pass.
    pub removed: usize,
    /// Whether a mutation watcher was attached.
    pub watching: bool,
}

/// Explicit state for one page load: cache handle, list source and the
/// active selector set.
pub struct FilterContext<S: FilterSource> {
    cache: SelectorCache,
    source: S,
    selectors: SelectorSet,
    update_interval: chrono::Duration,
    check_added_root: bool,
}

impl<S: FilterSource> FilterContext<S> {
    /// Context with the default 24 hour interval and root checking enabled.
    pub fn new(cache: SelectorCache, source: S) -> Self {
        Self::from_config(cache, source, &AppConfig::default())
    }

    pub fn from_config(cache: SelectorCache, source: S, config: &AppConfig) -> Self {
        Self {
            cache,
            source,
            selectors: SelectorSet::new(),
            update_interval: config.update_interval(),
            check_added_root: config.check_added_root,
        }
    }

    pub fn with_update_interval(mut self, interval: chrono::Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_check_added_root(mut self, enabled: bool) -> Self {
        self.check_added_root = enabled;
        self
    }

    /// The active selector set from the last resolve.
    pub fn selectors(&self) -> &SelectorSet {
        &self.selectors
    }

    pub fn cache(&self) -> &SelectorCache {
        &self.cache
    }

    /// Download, parse and store a new selector list.
    ///
    /// Any failure is logged and yields an empty set; the stored record is
    /// only replaced on success.
    pub async fn update_filters(&self, now: DateTime<Utc>) -> SelectorSet {
        match self.fetch_and_store(now).await {
            Ok(selectors) => {
                tracing::info!(selectors = selectors.len(), "filters updated");
                selectors
            }
            Err(e) => {
                tracing::error!(error = %e, fetch = e.is_fetch_error(), "failed to update filters");
                SelectorSet::new()
            }
        }
    }

    async fn fetch_and_store(&self, now: DateTime<Utc>) -> Result<SelectorSet, Error> {
        let text = self.source.fetch_list().await?;
        let selectors = parse_selectors(&text);
        self.cache.write_at(&selectors, now).await?;
        Ok(selectors)
    }

    /// Pick the active selector set for a load at `now`.
    ///
    /// A stored list that fails to decode is treated like a stale cache.
    pub async fn resolve_selectors(&mut self, now: DateTime<Utc>) -> Result<Freshness, Error> {
        let last_update = self.cache.last_update().await?;

        let (state, selectors) = match freshness(last_update, now, self.update_interval) {
            Freshness::Stale => {
                tracing::info!("updating filters from source");
                (Freshness::Stale, self.update_filters(now).await)
            }
            Freshness::Fresh => {
                tracing::info!("loading filters from cache");
                match self.cache.read_selectors().await {
                    Ok(selectors) => (Freshness::Fresh, selectors.unwrap_or_default()),
                    Err(e @ Error::CorruptCache { .. }) => {
                        tracing::warn!(error = %e, "cached filters unreadable, refetching");
                        (Freshness::Stale, self.update_filters(now).await)
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        self.selectors = selectors;
        Ok(state)
    }

    /// Run page-load initialization now.
    pub async fn init(&mut self, page: &mut Page) -> Result<InitOutcome, Error> {
        self.init_at(page, Utc::now()).await
    }

    /// Run page-load initialization as if the current time were `now`.
    pub async fn init_at(&mut self, page: &mut Page, now: DateTime<Utc>) -> Result<InitOutcome, Error> {
        let state = self.resolve_selectors(now).await?;

        let mut outcome = InitOutcome { freshness: state, selectors: self.selectors.len(), removed: 0, watching: false };

        if self.selectors.is_empty() {
            tracing::debug!("no selectors available, page left untouched");
            return Ok(outcome);
        }

        let blocker = Blocker::new(&self.selectors);
        outcome.removed = blocker.apply(page.document_mut(), None).removed;

        if let Err(e) = page.observe(Box::new(SelectorWatcher::new(blocker, self.check_added_root))) {
            tracing::warn!(error = %e, removed = outcome.removed, "cannot observe page, dynamic content left unfiltered");
            return Ok(outcome);
        }
        outcome.watching = true;
        tracing::info!(removed = outcome.removed, "observing dynamic DOM changes");

        Ok(outcome)
    }
}
