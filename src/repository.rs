//! In-memory holder of the current rates snapshot
//!
//! A `CurrencyRepository` owns one snapshot for the lifetime of the process
//! and knows when it last refreshed it. It is a plain value: create as many as
//! you like and pass them where needed.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cache::{CacheManager, DEFAULT_MAX_AGE};
use crate::data::fetcher::CBR_DAILY_URL;
use crate::data::{CbrClient, CurrencyRecord, CurrencySnapshot, RatesSource};
use crate::error::Result;

/// Finds the first record whose code or name matches `identifier`
///
/// Codes compare ignoring ASCII case ("usd" finds "USD"); names compare
/// case-insensitively. Nothing is trimmed. Records are scanned in snapshot
/// order, so the earliest match wins.
pub fn find<'a>(snapshot: &'a CurrencySnapshot, identifier: &str) -> Option<&'a CurrencyRecord> {
    let lowered = identifier.to_lowercase();
    snapshot.records.iter().find(|record| {
        record.code.eq_ignore_ascii_case(identifier) || record.name.to_lowercase() == lowered
    })
}

/// Settings for where rates come from and how long they stay fresh
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryConfig {
    /// Feed URL
    pub url: String,
    /// Cache file location
    pub cache_path: PathBuf,
    /// Freshness interval for both the cache file and the in-memory snapshot
    pub max_age: Duration,
    /// Whether freshly fetched rates are written to the cache file
    pub save_cache: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: CBR_DAILY_URL.to_string(),
            cache_path: CacheManager::default_path(),
            max_age: DEFAULT_MAX_AGE,
            save_cache: true,
        }
    }
}

/// Holds the current snapshot and refreshes it through the cache
pub struct CurrencyRepository<S = CbrClient> {
    source: S,
    cache: CacheManager,
    save_cache: bool,
    snapshot: Option<CurrencySnapshot>,
    last_updated: Option<DateTime<Utc>>,
}

impl CurrencyRepository<CbrClient> {
    /// Creates a repository backed by the live feed at `config.url`
    pub fn new(config: RepositoryConfig) -> Self {
        let source = CbrClient::new(config.url.clone());
        Self::with_source(config, source)
    }
}

impl<S: RatesSource> CurrencyRepository<S> {
    /// Creates a repository with a custom rates source
    pub fn with_source(config: RepositoryConfig, source: S) -> Self {
        Self {
            source,
            cache: CacheManager::new(config.cache_path, config.max_age),
            save_cache: config.save_cache,
            snapshot: None,
            last_updated: None,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// When the held snapshot's data was retrieved
    ///
    /// For a snapshot read from the cache file this is the file's modification
    /// time, so cached data never outlives `max_age` in memory.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    fn in_memory_fresh(&self) -> bool {
        // A negative elapsed time (clock moved back) counts as fresh
        self.last_updated.is_some_and(|updated| {
            (Utc::now() - updated)
                .to_std()
                .map_or(true, |elapsed| elapsed < self.cache.max_age())
        })
    }

    /// Returns the current snapshot, reloading it once it is older than `max_age`
    ///
    /// Reloading goes through the cache file first, then the source.
    pub async fn snapshot(&mut self) -> Result<&CurrencySnapshot> {
        let reuse = self.in_memory_fresh();
        match self.snapshot.take() {
            Some(held) if reuse => {
                debug!("using in-memory rates snapshot");
                Ok(&*self.snapshot.insert(held))
            }
            _ => {
                let loaded = self
                    .cache
                    .load_or_fetch(&self.source, self.save_cache)
                    .await?;
                Ok(self.store(loaded))
            }
        }
    }

    /// Fetches from the source regardless of cache freshness
    pub async fn refresh(&mut self) -> Result<&CurrencySnapshot> {
        let records = self.source.fetch_records().await?;
        if self.save_cache {
            self.cache.write(&records)?;
        }
        Ok(self.store(CurrencySnapshot::new(records, Utc::now())))
    }

    /// Looks up a currency by code or name in the current snapshot
    ///
    /// `Ok(None)` means the snapshot simply has no such currency.
    pub async fn find(&mut self, identifier: &str) -> Result<Option<CurrencyRecord>> {
        let snapshot = self.snapshot().await?;
        Ok(find(snapshot, identifier).cloned())
    }

    fn store(&mut self, snapshot: CurrencySnapshot) -> &CurrencySnapshot {
        info!(count = snapshot.len(), retrieved_at = %snapshot.retrieved_at, "rates snapshot updated");
        self.last_updated = Some(snapshot.retrieved_at);
        self.snapshot.insert(snapshot)
    }
}
