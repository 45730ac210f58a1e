//! Cache manager for persisting the rates list to disk
//!
//! Provides a `CacheManager` that stores the record list as a JSON array and
//! judges freshness by the file's modification time.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use crate::data::{CurrencyRecord, CurrencySnapshot, RatesSource};
use crate::error::{CurrencyError, Result};

/// File name of the cache inside the cache directory
pub const CACHE_FILE_NAME: &str = "currencies.json";

/// Default freshness interval (one hour)
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Serializes records in the cache file format
///
/// A JSON array indented by four spaces, non-ASCII characters written
/// literally.
pub fn records_to_json(records: &[CurrencyRecord]) -> serde_json::Result<String> {
    let mut json = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
    records.serialize(&mut serializer)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&json).into_owned())
}

/// Manages reading and writing the cached rates file
///
/// The file is a plain JSON array of `{name, code, value, nominal}` objects so
/// it stays readable by other tools. A cache entry is fresh while
/// `now - mtime < max_age`.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Location of the cache file
    path: PathBuf,
    /// Freshness interval
    max_age: Duration,
}

impl CacheManager {
    /// Creates a CacheManager for the given file and freshness interval
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            path: path.into(),
            max_age,
        }
    }

    /// Default cache file location
    ///
    /// Uses `~/.cache/cbrates/currencies.json` on Linux, or the equivalent
    /// platform path. Falls back to `./currencies.json` when no home directory
    /// can be determined.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "cbrates")
            .map(|dirs| dirs.cache_dir().join(CACHE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CACHE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    /// Age of the cache file, or `None` if it does not exist
    ///
    /// A modification time in the future counts as age zero.
    pub fn age(&self) -> Option<Duration> {
        let modified = self.modified()?;
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Whether the cache file exists and is younger than `max_age`
    pub fn is_fresh(&self) -> bool {
        self.age().is_some_and(|age| age < self.max_age)
    }

    /// Reads the cached snapshot
    ///
    /// The snapshot's `retrieved_at` is the file's modification time.
    ///
    /// # Returns
    /// * `Ok(CurrencySnapshot)` if the file holds a valid record list
    /// * `Err(CurrencyError::Io)` if the file cannot be read
    /// * `Err(CurrencyError::CacheCorrupt)` if the JSON is malformed
    pub fn read(&self) -> Result<CurrencySnapshot> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| CurrencyError::io(&self.path, e))?;
        let records: Vec<CurrencyRecord> =
            serde_json::from_str(&content).map_err(|source| CurrencyError::CacheCorrupt {
                path: self.path.clone(),
                source,
            })?;

        let retrieved_at = self
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(Utc::now);

        Ok(CurrencySnapshot::new(records, retrieved_at))
    }

    /// Writes the record list to the cache file
    ///
    /// Creates the parent directory if needed. The content is
    /// [`records_to_json`].
    pub fn write(&self, records: &[CurrencyRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CurrencyError::io(parent, e))?;
        }

        let json = records_to_json(records).map_err(|e| {
            CurrencyError::io(&self.path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        fs::write(&self.path, json).map_err(|e| CurrencyError::io(&self.path, e))?;
        info!(path = %self.path.display(), count = records.len(), "saved rates cache");
        Ok(())
    }

    /// Removes the cache file
    ///
    /// Returns `Ok(false)` if there was nothing to remove.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CurrencyError::io(&self.path, e)),
        }
    }

    /// Returns the cached snapshot if fresh, otherwise fetches a new one
    ///
    /// # Arguments
    /// * `source` - Where fresh records come from on a cache miss
    /// * `save` - Whether a freshly fetched list is written back to the cache
    ///
    /// # Behavior
    /// - A fresh cache file is returned without touching `source`
    /// - A fresh but corrupt cache file is an error, not a miss
    /// - A missing or stale file falls through to `source`
    pub async fn load_or_fetch<S: RatesSource>(
        &self,
        source: &S,
        save: bool,
    ) -> Result<CurrencySnapshot> {
        if self.is_fresh() {
            debug!(path = %self.path.display(), "rates cache hit");
            return self.read();
        }

        debug!(path = %self.path.display(), "rates cache miss");
        let records = source.fetch_records().await?;

        if save {
            self.write(&records)?;
        }

        Ok(CurrencySnapshot::new(records, Utc::now()))
    }
}
