//! Cache module for storing the rates list to disk
//!
//! This module provides a cache manager that persists the parsed feed as a
//! JSON file and serves it back while the file is younger than a configurable
//! freshness interval, so repeated runs within that window skip the network.

mod manager;

pub use manager::{records_to_json, CacheManager, CACHE_FILE_NAME, DEFAULT_MAX_AGE};
