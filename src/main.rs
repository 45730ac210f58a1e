//! cbrates - Central Bank of Russia daily exchange rates
//!
//! Looks up a currency, lists the whole feed or draws a bar chart of
//! per-unit values. Rates are cached on disk for an hour by default.

use std::error::Error;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use cbrates::cache::{self, CacheManager};
use cbrates::chart::{self, RenderOptions};
use cbrates::cli::{Cli, Command};
use cbrates::{find, CurrencyRepository, CurrencySnapshot, RepositoryConfig};

/// Initializes logging to stderr
///
/// Controlled by `RUST_LOG`; defaults to warnings from this crate only so
/// normal output on stdout stays clean.
fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cbrates=warn".into()),
        )
        .init();
}

fn print_record_table(snapshot: &CurrencySnapshot) {
    println!("Rates retrieved {}", snapshot.retrieved_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("{:<5} {:>8} {:>12}  {}", "Code", "Nominal", "Value", "Name");
    for record in &snapshot.records {
        println!(
            "{:<5} {:>8} {:>12}  {}",
            record.code, record.nominal, record.value, record.name
        );
    }
}

fn print_cache_info(cache: &CacheManager) {
    println!("Cache file: {}", cache.path().display());
    println!("Max age:    {}s", cache.max_age().as_secs());
    match cache.age() {
        Some(age) => {
            let state = if cache.is_fresh() { "fresh" } else { "stale" };
            println!("Age:        {}s ({})", age.as_secs(), state);
        }
        None => println!("Age:        no cache file"),
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let mut repo = CurrencyRepository::new(RepositoryConfig::from_cli(&cli));

    match &cli.command {
        Command::CacheInfo => {
            print_cache_info(repo.cache());
            return Ok(ExitCode::SUCCESS);
        }
        Command::ClearCache => {
            if repo.cache().clear()? {
                println!("Removed {}", repo.cache().path().display());
            } else {
                println!("No cache file at {}", repo.cache().path().display());
            }
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let snapshot = if cli.refresh {
        repo.refresh().await?
    } else {
        repo.snapshot().await?
    };
    debug!(count = snapshot.len(), "rates ready");

    match &cli.command {
        Command::Find { identifier } => match find(snapshot, identifier) {
            Some(record) => println!(
                "Name: {}, Code: {}, Value: {}, Nominal: {}",
                record.name, record.code, record.value, record.nominal
            ),
            None => {
                println!("Currency not found: {}", identifier);
                return Ok(ExitCode::from(1));
            }
        },
        Command::List { json: true } => {
            println!("{}", cache::records_to_json(&snapshot.records)?);
        }
        Command::List { json: false } => print_record_table(snapshot),
        command => {
            if let Some(options) = RenderOptions::from_command(command) {
                chart::render(snapshot, &options)?;
                if options.save_to_file {
                    println!("Chart saved to {}", options.file_path.display());
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
