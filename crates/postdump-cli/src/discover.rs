//! `discover` command: sitemap walk to a URL list.
//!
//! Rows are appended after every day so an interrupted walk keeps what it
//! found. URLs already in the output file are not written again.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use postdump_csv::{append_rows, read_rows, DiscoveredUrl, WriteMode};
use postdump_scraper::MediumClient;

/// Walk the daily sitemaps from `from` to `to` and append new article URLs
/// to `output`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the output file
/// cannot be read or written. A day whose sitemap fails is logged and
/// skipped.
pub(crate) async fn run_discover(
    config: &postdump_core::AppConfig,
    from: NaiveDate,
    to: NaiveDate,
    output: &Path,
) -> anyhow::Result<()> {
    if from > to {
        anyhow::bail!("--from ({from}) is after --to ({to})");
    }

    let client = MediumClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Medium client: {e}"))?;

    let mut seen: HashSet<String> = if output.exists() {
        read_rows::<DiscoveredUrl>(output)?
            .into_iter()
            .map(|row| row.url)
            .collect()
    } else {
        HashSet::new()
    };
    let known = seen.len();

    let mut written = 0_usize;
    let failed_days = client
        .walk_sitemaps(from, to, &mut seen, |date, urls| {
            written += append_rows(output, &day_rows(date, urls), WriteMode::Append)?;
            Ok::<(), postdump_csv::CsvError>(())
        })
        .await?;

    tracing::info!(
        output = %output.display(),
        known,
        written,
        failed_days,
        "discovery complete"
    );
    println!("discover: {written} new URLs written to {}", output.display());
    Ok(())
}

fn day_rows(date: NaiveDate, urls: Vec<String>) -> Vec<DiscoveredUrl> {
    let day = date.format("%Y-%m-%d").to_string();
    urls.into_iter()
        .map(|url| DiscoveredUrl {
            url,
            date: day.clone(),
        })
        .collect()
}
