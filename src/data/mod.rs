//! Core data models for the exchange-rate feed
//!
//! This module contains the record and snapshot types shared by the fetcher,
//! parser, cache and chart, plus the [`RatesSource`] seam the cache uses to
//! obtain fresh data.

pub mod fetcher;
pub mod parser;

pub use fetcher::CbrClient;
pub use parser::{parse, parse_feed, ParsedFeed};

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CurrencyError, Result};

/// A single currency quote as published in the feed
///
/// Fields are kept verbatim (trimmed) so the cache file mirrors the feed:
/// `value` uses a comma decimal separator and `nominal` is the lot size the
/// value applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    /// Human-readable currency name in the feed's language
    pub name: String,
    /// Three-letter currency code, e.g. "USD"
    pub code: String,
    /// Quoted value for `nominal` units, e.g. "90,50"
    pub value: String,
    /// Unit lot size, e.g. "1", "10", "100"
    pub nominal: String,
}

impl CurrencyRecord {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        value: impl Into<String>,
        nominal: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            value: value.into(),
            nominal: nominal.into(),
        }
    }

    /// Value of a single unit of this currency in the feed's base currency
    ///
    /// # Returns
    /// * `Ok(Decimal)` - `normalize_decimal(value) / nominal`, computed exactly
    /// * `Err(CurrencyError::InvalidNumber)` - if either field is not numeric
    ///   or the nominal is zero
    pub fn per_unit_value(&self) -> Result<Decimal> {
        let value = Decimal::from_str(&normalize_decimal(&self.value))
            .map_err(|_| self.invalid(&self.value))?;
        let nominal: u32 = self
            .nominal
            .trim()
            .parse()
            .map_err(|_| self.invalid(&self.nominal))?;

        value
            .checked_div(Decimal::from(nominal))
            .ok_or_else(|| self.invalid(&self.nominal))
    }

    fn invalid(&self, value: &str) -> CurrencyError {
        CurrencyError::InvalidNumber {
            code: self.code.clone(),
            value: value.to_string(),
        }
    }
}

/// Replaces a comma decimal separator with a dot ("90,50" -> "90.50")
pub fn normalize_decimal(value: &str) -> String {
    value.trim().replace(',', ".")
}

/// One retrieved-and-parsed set of currency records
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencySnapshot {
    /// Records in feed order
    pub records: Vec<CurrencyRecord>,
    /// When the records were fetched (cache file mtime for cached snapshots)
    pub retrieved_at: DateTime<Utc>,
}

impl CurrencySnapshot {
    pub fn new(records: Vec<CurrencyRecord>, retrieved_at: DateTime<Utc>) -> Self {
        Self {
            records,
            retrieved_at,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Something that can produce a fresh list of currency records
///
/// Implemented by [`CbrClient`] for the live feed; tests substitute their own
/// sources to observe whether the cache falls through to a fetch.
#[allow(async_fn_in_trait)]
pub trait RatesSource {
    async fn fetch_records(&self) -> Result<Vec<CurrencyRecord>>;
}
