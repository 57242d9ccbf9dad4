//! Extract a profile for one person from a list of URLs.
//!
//! Reads `OPENAI_API_KEY` (and optionally `OPENAI_BASE_URL` plus the
//! `PROFILE_*` overrides) from the environment or a `.env` file.
//!
//! ```bash
//! cargo run --example extract_profile -- https://example.com/about https://example.org/bio
//! ```

use anyhow::{bail, Context, Result};
use profile_extraction::{ExtractionFailure, HttpFetcher, OpenAI, ProfileConfig, Profiler};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,profile_extraction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        bail!("usage: extract_profile <url> [url...]");
    }

    let config = ProfileConfig::from_env().context("Failed to load configuration")?;
    let ai = OpenAI::from_env().context("Failed to configure completion client")?;
    let profiler = Profiler::new(HttpFetcher::new(), ai, config);

    match profiler
        .extract_profile_with_deadline(&urls, Duration::from_secs(600))
        .await
    {
        Ok(report) => {
            tracing::info!(
                attempts_used = report.outcome.attempts_used,
                pages = report.corpus.page_count(),
                "Profile extracted"
            );
            println!("{}", serde_json::to_string_pretty(report.record())?);
            Ok(())
        }
        Err(ExtractionFailure::BudgetExhausted {
            last_raw_response,
            last_error,
            attempts_used,
        }) => {
            eprintln!("No valid profile after {} attempt(s): {}", attempts_used, last_error);
            if let Some(raw) = last_raw_response {
                eprintln!("Last response:\n{}", raw);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
