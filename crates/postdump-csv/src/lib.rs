//! CSV persistence for postdump datasets.
//!
//! Every dataset file is append-only by default: rows are added to the end
//! and the header is written only when the file is new or empty, so a run
//! can be interrupted and resumed without duplicating it.

mod rows;
mod store;

pub use rows::{ArticleSource, CrawledArticle, DiscoveredUrl};
pub use store::{append_rows, count_rows, read_rows, WriteMode};

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
