//! The flat per-post output record and its CSV cell encoding.

use serde::{Deserialize, Serialize};

/// Column order of the persisted post table. Matches the field order of
/// [`PostRecord`], which is what `csv` uses when it writes the header.
pub const POST_COLUMNS: [&str; 28] = [
    "id",
    "title",
    "medium_url",
    "tags",
    "is_deleted",
    "clap_count",
    "voter_count",
    "post_responses",
    "reading_time",
    "curation_status",
    "seo_title",
    "seo_description",
    "is_locked",
    "first_published_at",
    "latest_published_at",
    "image_count",
    "topics",
    "collection_name",
    "collection_slug",
    "collection_subscribers",
    "creator_id",
    "creator_name",
    "creator_follower_count",
    "creator_following_count",
    "creator_medium_member_at",
    "creator_ats_qualified_at",
    "creator_has_subdomain",
    "creator_country",
];

/// One normalized post. Every column is always present; data the page did
/// not provide is `None`.
///
/// Timestamps are kept as the platform's epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub title: Option<String>,
    pub medium_url: Option<String>,
    #[serde(default, with = "list_cell")]
    pub tags: Option<Vec<String>>,
    pub is_deleted: bool,
    pub clap_count: Option<i64>,
    pub voter_count: Option<i64>,
    pub post_responses: Option<i64>,
    pub reading_time: Option<f64>,
    pub curation_status: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub is_locked: Option<bool>,
    pub first_published_at: Option<i64>,
    pub latest_published_at: Option<i64>,
    pub image_count: Option<usize>,
    #[serde(default, with = "list_cell")]
    pub topics: Option<Vec<String>>,
    pub collection_name: Option<String>,
    pub collection_slug: Option<String>,
    pub collection_subscribers: Option<i64>,
    pub creator_id: Option<String>,
    pub creator_name: Option<String>,
    pub creator_follower_count: Option<i64>,
    pub creator_following_count: Option<i64>,
    pub creator_medium_member_at: Option<i64>,
    pub creator_ats_qualified_at: Option<i64>,
    pub creator_has_subdomain: Option<bool>,
    pub creator_country: Option<String>,
}

impl PostRecord {
    /// The fallback record: only `id` is known and the post is treated as
    /// deleted.
    #[must_use]
    pub fn deleted(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            title: None,
            medium_url: None,
            tags: None,
            is_deleted: true,
            clap_count: None,
            voter_count: None,
            post_responses: None,
            reading_time: None,
            curation_status: None,
            seo_title: None,
            seo_description: None,
            is_locked: None,
            first_published_at: None,
            latest_published_at: None,
            image_count: None,
            topics: None,
            collection_name: None,
            collection_slug: None,
            collection_subscribers: None,
            creator_id: None,
            creator_name: None,
            creator_follower_count: None,
            creator_following_count: None,
            creator_medium_member_at: None,
            creator_ats_qualified_at: None,
            creator_has_subdomain: None,
            creator_country: None,
        }
    }
}

/// Encodes a list as a JSON array string, the form list columns take in a
/// CSV cell.
#[must_use]
pub fn encode_list(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}

/// Decodes a list cell written by [`encode_list`].
///
/// Also accepts the Python-style repr (`['a', 'b']`) found in older
/// datasets. Returns `None` for an empty cell or text that is not a list.
#[must_use]
pub fn decode_list(cell: &str) -> Option<Vec<String>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Some(items);
    }

    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?;
    decode_repr_items(inner)
}

/// Splits the body of a Python list repr into its items.
///
/// Commas inside a quoted item belong to the item; `\` escapes the next
/// character. Unquoted items are kept as trimmed text. Returns `None` for an
/// unterminated quote or junk after a closing quote.
fn decode_repr_items(inner: &str) -> Option<Vec<String>> {
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let item = match chars.peek().copied() {
            None => break,
            Some(quote @ ('\'' | '"')) => {
                chars.next();
                let mut item = String::new();
                loop {
                    match chars.next()? {
                        '\\' => match chars.next()? {
                            'n' => item.push('\n'),
                            't' => item.push('\t'),
                            other => item.push(other),
                        },
                        c if c == quote => break,
                        c => item.push(c),
                    }
                }
                item
            }
            Some(_) => {
                let mut item = String::new();
                while let Some(c) = chars.next_if(|c| *c != ',') {
                    item.push(c);
                }
                item.trim_end().to_owned()
            }
        };
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => {}
            Some(_) => return None,
        }
    }

    Some(items)
}

mod list_cell {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S>(value: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(items) => serializer.serialize_str(&super::encode_list(items)),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let cell = Option::<String>::deserialize(deserializer)?;
        Ok(cell.as_deref().and_then(super::decode_list))
    }
}
