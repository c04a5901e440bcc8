//! Parsing of the per-day posts sitemap.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ScraperError;

/// Entries below this `<priority>` are not treated as article candidates.
pub const MIN_PRIORITY: f64 = 0.5;

/// One `<url>` element of a sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    /// `None` when the element is missing or not a number.
    pub priority: Option<f64>,
}

/// Parses every `<url>` entry of a sitemap document.
///
/// Entries without a `<loc>` are dropped.
///
/// # Errors
///
/// Returns [`ScraperError::Xml`] if the document is malformed.
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapEntry>, ScraperError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut in_url = false;
    let mut current_tag = String::new();
    let mut loc = String::new();
    let mut priority = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "url" {
                    in_url = true;
                    loc.clear();
                    priority.clear();
                }
                current_tag = name;
            }
            Ok(Event::End(e)) => {
                let raw = e.local_name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "url" && in_url {
                    in_url = false;
                    if !loc.is_empty() {
                        entries.push(SitemapEntry {
                            loc: loc.clone(),
                            priority: priority.parse::<f64>().ok(),
                        });
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                if in_url {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    match current_tag.as_str() {
                        "loc" => loc = text,
                        "priority" => priority = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if in_url && current_tag == "loc" {
                    loc = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ScraperError::Xml(e)),
            _ => {}
        }
    }

    Ok(entries)
}

/// Article URLs of a sitemap whose priority is at least [`MIN_PRIORITY`].
///
/// # Errors
///
/// Returns [`ScraperError::Xml`] if the document is malformed.
pub fn priority_post_urls(xml: &str) -> Result<Vec<String>, ScraperError> {
    Ok(parse_sitemap(xml)?
        .into_iter()
        .filter(|entry| entry.priority.is_some_and(|p| p >= MIN_PRIORITY))
        .map(|entry| entry.loc)
        .collect())
}
