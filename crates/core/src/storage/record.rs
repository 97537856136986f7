//! The selector cache record.
//!
//! Two well-known storage keys hold the record: the selector list as a JSON
//! array of strings, and the last update time as decimal epoch milliseconds.

use super::connection::LocalStorage;
use crate::{Error, SelectorSet};
use chrono::{DateTime, TimeZone, Utc};

/// Storage key holding the JSON-encoded selector list.
pub const STORAGE_KEY: &str = "adguard_filters";

/// Storage key holding the last update timestamp (epoch milliseconds).
pub const LAST_UPDATE_KEY: &str = "adguard_filters_last_update";

/// A cached selector list together with the time it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub selectors: SelectorSet,
    /// `None` when no timestamp was stored; callers treat it as the epoch.
    pub last_update: Option<DateTime<Utc>>,
}

/// Typed view over the two selector cache keys in [`LocalStorage`].
#[derive(Clone, Debug)]
pub struct SelectorCache {
    storage: LocalStorage,
}

impl SelectorCache {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Time of the last successful write.
    ///
    /// A missing or unparsable timestamp yields `None`.
    pub async fn last_update(&self) -> Result<Option<DateTime<Utc>>, Error> {
        let raw = self.storage.get_item(LAST_UPDATE_KEY).await?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }

    /// Read the cached selector list.
    ///
    /// Returns `Ok(None)` if nothing has been stored and
    /// [`Error::CorruptCache`] if the stored value is not a JSON string array.
    pub async fn read_selectors(&self) -> Result<Option<SelectorSet>, Error> {
        let Some(raw) = self.storage.get_item(STORAGE_KEY).await? else {
            return Ok(None);
        };

        let selectors: SelectorSet = serde_json::from_str(&raw)
            .map_err(|e| Error::CorruptCache { key: STORAGE_KEY.to_string(), reason: e.to_string() })?;

        Ok(Some(selectors))
    }

    /// Read the full record. Returns `Ok(None)` when no selector list is stored.
    pub async fn read(&self) -> Result<Option<CacheRecord>, Error> {
        let Some(selectors) = self.read_selectors().await? else {
            return Ok(None);
        };
        let last_update = self.last_update().await?;
        Ok(Some(CacheRecord { selectors, last_update }))
    }

    /// Store `selectors` and stamp the current time.
    pub async fn write(&self, selectors: &SelectorSet) -> Result<(), Error> {
        self.write_at(selectors, Utc::now()).await
    }

    /// Store `selectors` with an explicit update time.
    pub async fn write_at(&self, selectors: &SelectorSet, now: DateTime<Utc>) -> Result<(), Error> {
        let json = serde_json::to_string(selectors)
            .map_err(|e| Error::InvalidInput(format!("failed to encode selectors: {}", e)))?;

        self.storage.set_item(STORAGE_KEY, &json).await?;
        self.storage
            .set_item(LAST_UPDATE_KEY, &now.timestamp_millis().to_string())
            .await?;

        tracing::debug!(selectors = selectors.len(), "selector cache written");
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.trim().parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn cache() -> SelectorCache {
        SelectorCache::new(LocalStorage::open_in_memory().await.unwrap())
    }

    fn set(items: &[&str]) -> SelectorSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_cache() {
        let cache = cache().await;
        assert!(cache.read().await.unwrap().is_none());
        assert!(cache.last_update().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order() {
        let cache = cache().await;
        let selectors = set(&[".ad-banner", "#sponsor", ".ad-banner", "div[data-ad]"]);

        cache.write(&selectors).await.unwrap();

        let record = cache.read().await.unwrap().unwrap();
        assert_eq!(record.selectors, selectors);
        assert!(record.last_update.is_some());
    }

    #[tokio::test]
    async fn test_write_at_stamps_millis() {
        let cache = cache().await;
        let when = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

        cache.write_at(&set(&[".x"]), when).await.unwrap();

        let raw = cache.storage().get_item(LAST_UPDATE_KEY).await.unwrap();
        assert_eq!(raw.as_deref(), Some("1700000000123"));
        assert_eq!(cache.last_update().await.unwrap(), Some(when));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_record() {
        let cache = cache().await;
        let earlier = Utc::now() - Duration::hours(30);
        cache.write_at(&set(&[".old"]), earlier).await.unwrap();
        cache.write(&set(&[".new"])).await.unwrap();

        let record = cache.read().await.unwrap().unwrap();
        assert_eq!(record.selectors, set(&[".new"]));
        assert!(record.last_update.unwrap() > earlier);
    }

    #[tokio::test]
    async fn test_corrupt_selector_json() {
        let cache = cache().await;
        cache.storage().set_item(STORAGE_KEY, "{not json").await.unwrap();

        let result = cache.read_selectors().await;
        assert!(matches!(result, Err(Error::CorruptCache { ref key, .. }) if key == STORAGE_KEY));
    }

    #[tokio::test]
    async fn test_unparsable_timestamp_is_none() {
        let cache = cache().await;
        cache.storage().set_item(LAST_UPDATE_KEY, "yesterday").await.unwrap();
        assert!(cache.last_update().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_set_round_trip() {
        let cache = cache().await;
        cache.write(&SelectorSet::new()).await.unwrap();
        let record = cache.read().await.unwrap().unwrap();
        assert!(record.selectors.is_empty());
    }
}
