use postdump_core::PostRecord;

use super::MediumClient;
use crate::article::article_id_from_url;
use crate::datadump::{extract_post, load_store, LoadError, ReferenceStore};

/// Result of fetching one article page: its id and the loaded store, or the
/// reason none is available.
#[derive(Debug)]
pub struct FetchedArticle {
    pub id: String,
    pub url: String,
    pub store: Result<ReferenceStore, LoadError>,
}

impl FetchedArticle {
    /// Normalizes the article's own post out of its store.
    #[must_use]
    pub fn to_record(&self) -> PostRecord {
        extract_post(&self.id, &self.store)
    }
}

impl MediumClient {
    /// Fetches an article page and loads its reference store.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Fetch`] for HTTP failures, or the parse variants
    /// of [`LoadError`] when the page carries no usable state blob.
    pub async fn fetch_article_store(&self, url: &str) -> Result<ReferenceStore, LoadError> {
        let page = self.fetch_text(url).await?;
        load_store(&page)
    }

    /// Fetches one article. Never fails: load errors are kept in
    /// [`FetchedArticle::store`].
    ///
    /// The id is derived from the URL; a URL without one uses the URL itself
    /// so the row can still be traced back.
    pub async fn fetch_article(&self, url: &str) -> FetchedArticle {
        let id = article_id_from_url(url).unwrap_or_else(|| url.to_owned());
        let store = self.fetch_article_store(url).await;
        match &store {
            Ok(s) => tracing::debug!(post_id = %id, url, entities = s.len(), "loaded datadump"),
            Err(e) => tracing::warn!(post_id = %id, url, error = %e, "failed to load datadump"),
        }
        FetchedArticle {
            id,
            url: url.to_owned(),
            store,
        }
    }

    /// Fetches and normalizes one article into its output record.
    pub async fn extract_article(&self, url: &str) -> PostRecord {
        self.fetch_article(url).await.to_record()
    }
}
