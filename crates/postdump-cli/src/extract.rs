//! `extract` command: one-off fetch and normalize of individual articles.

use postdump_scraper::MediumClient;

/// Fetch each URL in turn and print its record as one JSON line.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or a record cannot
/// be serialized. Fetch failures print the deleted record.
pub(crate) async fn run_extract(
    config: &postdump_core::AppConfig,
    urls: &[String],
) -> anyhow::Result<()> {
    let client = MediumClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Medium client: {e}"))?;

    for url in urls {
        let record = client.extract_article(url).await;
        tracing::debug!(post_id = %record.id, deleted = record.is_deleted, "article extracted");
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
