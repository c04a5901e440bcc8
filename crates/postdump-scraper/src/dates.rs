//! Calendar helpers for walking the per-day sitemap.

use chrono::NaiveDate;

/// Every day from `from` to `to`, both inclusive. Empty when `from > to`.
#[must_use]
pub fn date_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|day| *day <= to).collect()
}

/// `dd/mm/yyyy`, used in progress logs.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Path of the posts sitemap for one day, relative to the platform origin.
#[must_use]
pub fn sitemap_path(date: NaiveDate) -> String {
    date.format("/sitemap/posts/%Y/posts-%Y-%m-%d.xml").to_string()
}
