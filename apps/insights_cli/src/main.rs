use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use client_core::{HttpTransport, InsightsSource, RemoteDataClient};
use insights::{select_background, InsightsSession, LoadState};
use shared::domain::FiscalYear;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "insights", about = "Audit insights from the firm's spreadsheet endpoint")]
struct Cli {
    /// Endpoint URL; overrides insights.toml and the environment.
    #[arg(long, global = true)]
    endpoint: Option<String>,
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the fiscal years the endpoint offers.
    Years,
    /// Load the dashboard for the default year, or for `--year`.
    Dashboard {
        #[arg(long)]
        year: Option<String>,
    },
    /// Show which hero artwork applies on a date (today by default).
    Hero {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(endpoint) = cli.endpoint.clone() {
        settings.endpoint_url = Some(endpoint);
    }
    if let Some(timeout) = cli.timeout_secs {
        settings.request_timeout_secs = timeout;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Years => {
            let client = build_client(&settings)?;
            let years = client.list_available_years().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&years)?);
            } else {
                print!("{}", render::render_years(&years));
            }
        }
        Command::Dashboard { year } => {
            let session = InsightsSession::new(Arc::new(build_client(&settings)?));
            let mut state = session.activate().await;

            if let Some(year) = year.map(FiscalYear::new) {
                if needs_fetch(&state, &year)? {
                    state = session.select_year(year).await;
                }
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print!("{}", render::render_state(&state));
            }
            if let LoadState::Error { message } = state {
                bail!(message);
            }
        }
        Command::Hero { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let variant = select_background(date);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&variant)?);
            } else {
                print!("{}", render::render_hero(date, variant));
            }
        }
    }

    Ok(())
}

/// Whether `--year` asks for something other than what `activate` already loaded.
fn needs_fetch(state: &LoadState, year: &FiscalYear) -> Result<bool> {
    let LoadState::Loaded(dashboard) = state else {
        return Ok(true);
    };
    if !dashboard.years.contains(year) {
        bail!("fiscal year {year} is not offered by the endpoint");
    }
    Ok(dashboard.selected_year.as_ref() != Some(year))
}

fn build_client(settings: &Settings) -> Result<RemoteDataClient<HttpTransport>> {
    let endpoint = settings.endpoint()?;
    info!(%endpoint, "using insights endpoint");
    RemoteDataClient::http(endpoint, settings.request_timeout())
        .context("failed to build http client")
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
