//! Medium article scraping for postdump.
//!
//! Fetches article pages and per-day sitemaps, loads the Apollo client-state
//! blob embedded in each page into a [`ReferenceStore`], and flattens a post
//! out of it into a [`postdump_core::PostRecord`].

pub mod article;
pub mod client;
pub mod datadump;
pub mod dates;
pub mod error;
pub mod sitemap;

pub use article::article_id_from_url;
pub use client::MediumClient;
pub use datadump::{
    extract_post, load_store, normalize_post, Datadump, LoadError, ReferenceStore, ResolveError,
};
pub use error::ScraperError;
