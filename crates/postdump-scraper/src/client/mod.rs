//! HTTP client for Medium article pages and sitemaps.

mod article;
mod sitemap;

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;

pub use article::FetchedArticle;

/// HTTP client for the blogging platform.
///
/// Every request is a single attempt bounded by the configured timeout.
/// Non-2xx responses come back as typed errors; nothing is retried.
pub struct MediumClient {
    client: Client,
    base_url: String,
}

impl MediumClient {
    /// Creates a `MediumClient` with the given origin, timeout and `User-Agent`.
    ///
    /// `base_url` is the platform origin (`https://medium.com`); sitemap paths
    /// are joined onto it. Article URLs are always fetched as given.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Builds a client from the application config.
    ///
    /// # Errors
    ///
    /// See [`MediumClient::new`].
    pub fn from_config(config: &postdump_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`]: HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network, TLS or timeout failure.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}
