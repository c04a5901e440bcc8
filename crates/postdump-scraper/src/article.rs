//! Article URL helpers.

/// Extracts the post id from an article URL: the last `-`-separated chunk of
/// the final path segment (`.../being-a-junior-developer-8ad73582d912` →
/// `8ad73582d912`).
///
/// Query strings, fragments and a trailing slash are ignored. Returns `None`
/// when nothing is left.
#[must_use]
pub fn article_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let id = segment.rsplit('-').next()?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_owned())
    }
}
