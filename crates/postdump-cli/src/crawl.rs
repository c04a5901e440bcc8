//! `crawl` command: fetch article pages in batches and store their raw
//! datadumps.

use std::path::Path;

use futures::future::join_all;
use postdump_csv::{append_rows, count_rows, read_rows, ArticleSource, CrawledArticle, WriteMode};
use postdump_scraper::client::FetchedArticle;
use postdump_scraper::MediumClient;

use crate::batch::pending_window;

/// Crawl the articles listed in `input`, appending one row per article to
/// `output`.
///
/// Articles already present in `output` (by row count) are skipped, so an
/// interrupted crawl resumes where it stopped. Each batch of
/// `config.batch_size` pages is fetched concurrently and written before the
/// next one starts.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or either CSV file
/// cannot be read or written. Page failures are recorded as rows without a
/// datadump, not propagated.
pub(crate) async fn run_crawl(
    config: &postdump_core::AppConfig,
    input: &Path,
    output: &Path,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let sources: Vec<ArticleSource> = read_rows(input)?;
    let done = count_rows(output)?;
    let window = pending_window(sources.len(), done, limit);
    let pending = &sources[window.clone()];

    tracing::info!(
        input = %input.display(),
        total = sources.len(),
        already_crawled = done,
        pending = pending.len(),
        "starting crawl"
    );
    if pending.is_empty() {
        println!("crawl: nothing to do");
        return Ok(());
    }

    let client = MediumClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Medium client: {e}"))?;

    let mut loaded = 0_usize;
    let mut written = 0_usize;
    for (batch_index, batch) in pending.chunks(config.batch_size).enumerate() {
        let fetched = join_all(batch.iter().map(|source| client.fetch_article(&source.url))).await;

        let rows: Vec<CrawledArticle> = batch
            .iter()
            .zip(fetched)
            .map(|(source, article)| crawled_row(source, article))
            .collect();
        loaded += rows.iter().filter(|row| row.datadump.is_some()).count();
        written += append_rows(output, &rows, WriteMode::Append)?;

        tracing::info!(
            batch = batch_index + 1,
            progress = window.start + written,
            total = sources.len(),
            "batch written"
        );
    }

    println!(
        "crawl: {written} articles written to {} ({loaded} with datadump, {} without)",
        output.display(),
        written - loaded
    );
    Ok(())
}

/// Output row for one fetched article; the store, if any, is serialized
/// back to JSON.
fn crawled_row(source: &ArticleSource, article: FetchedArticle) -> CrawledArticle {
    let datadump = article
        .store
        .ok()
        .map(|store| serde_json::Value::Object(store.into_inner()).to_string());
    CrawledArticle {
        id: article.id,
        url: article.url,
        title: source.title.clone(),
        datadump,
    }
}
