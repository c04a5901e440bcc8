use std::collections::HashSet;
use std::convert::Infallible;

use chrono::NaiveDate;

use super::MediumClient;
use crate::dates::{date_range, format_date, sitemap_path};
use crate::error::ScraperError;
use crate::sitemap::priority_post_urls;

impl MediumClient {
    /// Article URLs listed in the posts sitemap of `date` with priority at
    /// least [`crate::sitemap::MIN_PRIORITY`].
    ///
    /// # Errors
    ///
    /// Propagates fetch errors from [`MediumClient::fetch_text`] and
    /// [`ScraperError::Xml`] for a malformed document.
    pub async fn fetch_sitemap_urls(&self, date: NaiveDate) -> Result<Vec<String>, ScraperError> {
        let url = format!("{}{}", self.base_url, sitemap_path(date));
        let body = self.fetch_text(&url).await?;
        priority_post_urls(&body)
    }

    /// Walks the daily sitemaps from `from` to `to` (inclusive), handing
    /// each day's unseen URLs to `on_day` in sitemap order.
    ///
    /// URLs already in `seen` are dropped, and every URL passed on is added
    /// to it. A day whose sitemap cannot be fetched or parsed is logged and
    /// skipped. Returns the number of skipped days.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `on_day`.
    pub async fn walk_sitemaps<F, E>(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        seen: &mut HashSet<String>,
        mut on_day: F,
    ) -> Result<usize, E>
    where
        F: FnMut(NaiveDate, Vec<String>) -> Result<(), E>,
    {
        let mut failed_days = 0_usize;

        for date in date_range(from, to) {
            let day = format_date(date);
            let found = match self.fetch_sitemap_urls(date).await {
                Ok(found) => found,
                Err(e) => {
                    failed_days += 1;
                    tracing::warn!(date = %day, error = %e, "sitemap fetch failed, skipping day");
                    continue;
                }
            };

            let fresh: Vec<String> = found
                .into_iter()
                .filter(|url| seen.insert(url.clone()))
                .collect();
            tracing::info!(date = %day, new_urls = fresh.len(), "sitemap processed");
            on_day(date, fresh)?;
        }

        Ok(failed_days)
    }

    /// Distinct article URLs of the sitemaps from `from` to `to`
    /// (inclusive), in first-seen order. Failed days are skipped.
    pub async fn discover_post_urls(&self, from: NaiveDate, to: NaiveDate) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        let Ok(_) = self
            .walk_sitemaps(from, to, &mut seen, |_, fresh| {
                urls.extend(fresh);
                Ok::<(), Infallible>(())
            })
            .await;
        urls
    }
}
