//! cbrates Library
//!
//! Fetches the Central Bank of Russia daily exchange-rate feed, caches it to
//! disk, looks up currencies by code or name and charts per-unit values.

pub mod cache;
pub mod chart;
pub mod cli;
pub mod data;
pub mod error;
pub mod repository;

pub use data::{CurrencyRecord, CurrencySnapshot};
pub use error::{CurrencyError, Result};
pub use repository::{find, CurrencyRepository, RepositoryConfig};
