//! `parse` command: normalize stored datadumps into post records.

use std::path::Path;

use postdump_core::PostRecord;
use postdump_csv::{append_rows, count_rows, read_rows, CrawledArticle, WriteMode};
use postdump_scraper::{extract_post, normalize_post, Datadump};

use crate::batch::pending_window;

/// Normalize the crawled rows of `input` into `output`.
///
/// Without `overwrite` rows already present in `output` are skipped.
/// Records are written every `config.batch_size` rows.
///
/// # Errors
///
/// Returns an error if either CSV file cannot be read or written. Rows whose
/// datadump cannot be loaded or resolved become deleted records.
pub(crate) fn run_parse(
    config: &postdump_core::AppConfig,
    input: &Path,
    output: &Path,
    overwrite: bool,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let crawled: Vec<CrawledArticle> = read_rows(input)?;
    let done = if overwrite { 0 } else { count_rows(output)? };
    let window = pending_window(crawled.len(), done, limit);
    let pending = &crawled[window];

    tracing::info!(
        input = %input.display(),
        total = crawled.len(),
        already_parsed = done,
        pending = pending.len(),
        overwrite,
        "starting parse"
    );

    let mut mode = if overwrite {
        WriteMode::Overwrite
    } else {
        WriteMode::Append
    };
    let mut written = 0_usize;
    let mut deleted = 0_usize;
    for batch in pending.chunks(config.batch_size) {
        let records: Vec<PostRecord> = batch.iter().map(parse_row).collect();
        deleted += records.iter().filter(|r| r.is_deleted).count();
        written += append_rows(output, &records, mode)?;
        mode = WriteMode::Append;
    }

    if overwrite && pending.is_empty() {
        append_rows::<PostRecord>(output, &[], WriteMode::Overwrite)?;
    }

    println!(
        "parse: {written} records written to {} ({deleted} marked deleted)",
        output.display()
    );
    Ok(())
}

/// Normalizes one crawled row. The row's own `url` and `title` fill the
/// record's `medium_url` and `title` when the datadump does not provide
/// them, so deleted records stay traceable to their article.
fn parse_row(row: &CrawledArticle) -> PostRecord {
    let mut record = match &row.datadump {
        Some(dump) => extract_post(&row.id, &Datadump::Raw(dump.clone()).into_store()),
        None => normalize_post(&row.id, None),
    };
    if record.medium_url.is_none() {
        record.medium_url = Some(row.url.clone());
    }
    if record.title.is_none() {
        record.title.clone_from(&row.title);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, datadump: Option<&str>) -> CrawledArticle {
        CrawledArticle {
            id: id.to_owned(),
            url: format!("https://medium.com/p/post-{id}"),
            title: None,
            datadump: datadump.map(str::to_owned),
        }
    }

    const DUMP: &str = r#"{
        "Post:42": {
            "title": "Answer",
            "clapCount": 10,
            "postResponses": {"count": 3},
            "topics": null,
            "collection": null,
            "creator": {"__ref": "User:7"}
        },
        "User:7": {"id": "7", "socialStats": {"followerCount": 5, "followingCount": 1}}
    }"#;

    #[test]
    fn stored_datadump_is_normalized() {
        let record = parse_row(&row("42", Some(DUMP)));
        assert!(!record.is_deleted);
        assert_eq!(record.title.as_deref(), Some("Answer"));
        assert_eq!(record.clap_count, Some(10));
        assert_eq!(record.creator_id.as_deref(), Some("7"));
    }

    #[test]
    fn empty_datadump_becomes_deleted_record() {
        let record = parse_row(&row("42", None));
        assert!(record.is_deleted);
        assert_eq!(record.clap_count, None);
        assert_eq!(record.creator_id, None);
    }

    #[test]
    fn deleted_record_keeps_the_article_url_and_title() {
        let crawled = CrawledArticle {
            title: Some("T".to_owned()),
            ..row("42", None)
        };
        let record = parse_row(&crawled);
        assert!(record.is_deleted);
        assert_eq!(record.medium_url.as_deref(), Some("https://medium.com/p/post-42"));
        assert_eq!(record.title.as_deref(), Some("T"));
    }

    #[test]
    fn corrupt_datadump_becomes_deleted_record() {
        let record = parse_row(&row("42", Some("{not json")));
        assert!(record.is_deleted);
        assert_eq!(record.medium_url.as_deref(), Some("https://medium.com/p/post-42"));
        assert_eq!(record.title, None);
    }

    #[test]
    fn datadump_values_take_precedence_over_row_columns() {
        let crawled = CrawledArticle {
            title: Some("Listed title".to_owned()),
            ..row("42", Some(DUMP))
        };
        let record = parse_row(&crawled);
        assert_eq!(record.title.as_deref(), Some("Answer"));
        assert_eq!(record.medium_url.as_deref(), Some("https://medium.com/p/post-42"));
    }
}
