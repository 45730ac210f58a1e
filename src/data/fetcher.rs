//! HTTP client for the Central Bank of Russia daily rates feed
//!
//! Issues a single GET per call. Anything other than `200 OK` is an error;
//! there are no retries.

use reqwest::{Client, StatusCode};
use tracing::{info, instrument, warn};

use super::{parser, CurrencyRecord, RatesSource};
use crate::error::{CurrencyError, Result};

/// Default feed URL: today's rates against the rouble
pub const CBR_DAILY_URL: &str = "http://www.cbr.ru/scripts/XML_daily.asp";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for fetching and parsing the daily rates feed
#[derive(Debug, Clone)]
pub struct CbrClient {
    client: Client,
    url: String,
}

impl Default for CbrClient {
    fn default() -> Self {
        Self::new(CBR_DAILY_URL)
    }
}

impl CbrClient {
    /// Create a client for the given feed URL
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self::with_client(client, url)
    }

    /// Create a client with a custom HTTP client
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw feed bytes
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The response body of a `200 OK` response
    /// * `Err(CurrencyError::HttpStatus)` - For any other status
    /// * `Err(CurrencyError::Http)` - If the request itself fails
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, "rates feed returned an error status");
            return Err(CurrencyError::HttpStatus {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.bytes().await?;
        info!(bytes = body.len(), "fetched rates feed");
        Ok(body.to_vec())
    }
}

impl RatesSource for CbrClient {
    async fn fetch_records(&self) -> Result<Vec<CurrencyRecord>> {
        let body = self.fetch().await?;
        parser::parse(&body)
    }
}
