//! Locates and parses the Apollo state blob embedded in an article page.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::datadump::store::ReferenceStore;
use crate::error::ScraperError;

/// Assignment target that precedes the JSON literal in the page script.
pub const STATE_MARKER: &str = "window.__APOLLO_STATE__";

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("valid regex"));

/// Why no store could be produced for a page. Callers that only need a
/// record treat every variant the same way.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] ScraperError),

    #[error("no script contains the window.__APOLLO_STATE__ assignment")]
    MarkerNotFound,

    #[error("state blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("state blob is not a JSON object")]
    NotAnObject,
}

/// A datadump as it reaches the loader boundary: serialized text (for
/// example re-read from a CSV cell) or an already-parsed JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datadump {
    Raw(String),
    Parsed(Value),
}

impl Datadump {
    /// Converts either form into a [`ReferenceStore`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] if raw text does not parse, or
    /// [`LoadError::NotAnObject`] if the JSON is not an object.
    pub fn into_store(self) -> Result<ReferenceStore, LoadError> {
        let value = match self {
            Datadump::Raw(text) => serde_json::from_str(&text)?,
            Datadump::Parsed(value) => value,
        };
        match value {
            Value::Object(map) => Ok(ReferenceStore::new(map)),
            _ => Err(LoadError::NotAnObject),
        }
    }
}

/// Parses the reference store out of raw article page markup.
///
/// Uses the first `<script>` whose text contains [`STATE_MARKER`].
///
/// # Errors
///
/// - [`LoadError::MarkerNotFound`] when no script carries the assignment.
/// - [`LoadError::Json`] / [`LoadError::NotAnObject`] when the blob is malformed.
pub fn load_store(page: &str) -> Result<ReferenceStore, LoadError> {
    let json = extract_state_json(page).ok_or(LoadError::MarkerNotFound)?;
    Datadump::Raw(json.to_owned()).into_store()
}

/// Returns the JSON text assigned to [`STATE_MARKER`], without the
/// assignment prefix or a trailing `;`.
pub(crate) fn extract_state_json(page: &str) -> Option<&str> {
    let script = SCRIPT_RE
        .captures_iter(page)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
        .find(|text| text.contains(STATE_MARKER))?;

    let start = script.find(STATE_MARKER)? + STATE_MARKER.len();
    let assigned = script[start..].trim_start().strip_prefix('=')?;
    Some(assigned.trim().trim_end_matches(';').trim_end())
}
