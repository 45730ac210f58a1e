//! Command-line interface parsing for cbrates
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into the repository and chart settings used at startup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::cache::CacheManager;
use crate::chart::{RenderOptions, DEFAULT_IMAGE_PATH, DEFAULT_IMAGE_SIZE};
use crate::data::fetcher::CBR_DAILY_URL;
use crate::repository::RepositoryConfig;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The currency identifier is empty
    #[error("Invalid currency identifier: '{0}'. Use a code like USD or a currency name")]
    InvalidIdentifier(String),

    /// The feed URL is not an http(s) URL
    #[error("Invalid feed URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidUrl(String),
}

/// cbrates - Central Bank of Russia daily exchange rates
#[derive(Parser, Debug)]
#[command(name = "cbrates")]
#[command(about = "Look up and chart the Central Bank of Russia daily exchange rates")]
#[command(version)]
pub struct Cli {
    /// Feed URL to fetch rates from
    #[arg(long, global = true, value_name = "URL", default_value = CBR_DAILY_URL, value_parser = parse_url_arg)]
    pub url: String,

    /// Cache file location [default: platform cache dir]/currencies.json
    #[arg(long, global = true, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Seconds before the cached rates are fetched again
    #[arg(long, global = true, value_name = "SECS", default_value_t = 3600)]
    pub max_age: u64,

    /// Do not write fetched rates to the cache file
    #[arg(long, global = true)]
    pub no_save: bool,

    /// Fetch from the feed even if the cache is fresh
    #[arg(long, global = true)]
    pub refresh: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Look up one currency by code (USD) or name (US Dollar)
    ///
    /// Exits with status 1 if the currency is not in today's feed.
    Find {
        #[arg(value_parser = parse_identifier_arg)]
        identifier: String,
    },

    /// Print every currency in the feed
    List {
        /// Print the records as JSON, in the cache file format
        #[arg(long)]
        json: bool,
    },

    /// Draw a bar chart of the value of one unit of each currency
    Chart {
        /// Where to save the chart image
        #[arg(short, long, value_name = "PATH", default_value = DEFAULT_IMAGE_PATH)]
        output: PathBuf,

        /// Do not save the chart image
        #[arg(long)]
        no_image: bool,

        /// Do not display the chart in the terminal
        #[arg(long)]
        no_show: bool,
    },

    /// Show where the cache file lives and whether it is fresh
    CacheInfo,

    /// Delete the cache file
    ClearCache,
}

/// Validates a currency identifier argument
///
/// # Returns
/// * `Ok(String)` with surrounding whitespace removed
/// * `Err(CliError::InvalidIdentifier)` if nothing is left
pub fn parse_identifier_arg(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CliError::InvalidIdentifier(s.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Validates a feed URL argument
pub fn parse_url_arg(s: &str) -> Result<String, CliError> {
    let lower = s.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("http://")
        .or_else(|| lower.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(s.to_string()),
        _ => Err(CliError::InvalidUrl(s.to_string())),
    }
}

impl RepositoryConfig {
    /// Creates a RepositoryConfig from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            url: cli.url.clone(),
            cache_path: cli
                .cache_file
                .clone()
                .unwrap_or_else(CacheManager::default_path),
            max_age: Duration::from_secs(cli.max_age),
            save_cache: !cli.no_save,
        }
    }
}

impl RenderOptions {
    /// Creates RenderOptions from the `chart` subcommand's arguments
    ///
    /// Returns `None` for any other subcommand.
    pub fn from_command(command: &Command) -> Option<Self> {
        match command {
            Command::Chart {
                output,
                no_image,
                no_show,
            } => Some(Self {
                save_to_file: !no_image,
                file_path: output.clone(),
                image_size: DEFAULT_IMAGE_SIZE,
                show: !no_show,
            }),
            _ => None,
        }
    }
}
