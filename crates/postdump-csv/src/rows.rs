use serde::{Deserialize, Serialize};

/// One article URL to crawl.
///
/// Input lists may carry any number of extra columns; only `url` is
/// required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A crawled article page: the raw Apollo-state JSON kept for later parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawledArticle {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    /// Serialized state object; `None` when the page could not be loaded.
    pub datadump: Option<String>,
}

/// An article URL found in a daily sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredUrl {
    pub url: String,
    /// Sitemap day, `YYYY-MM-DD`.
    pub date: String,
}
