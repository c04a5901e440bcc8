//! The normalized Apollo object store and typed access into it.
//!
//! Entities live under opaque keys such as `Post:8ad73582d912` or `User:7`.
//! Related entities are linked with `{"__ref": "<key>"}` pointers instead of
//! being nested, so every hop goes through [`Reference::resolve`].

use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};
use thiserror::Error;

/// Substring that marks image-metadata entity keys.
pub const IMAGE_METADATA_MARKER: &str = "ImageMetadata";

const REF_FIELD: &str = "__ref";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("entity {key} is not in the store")]
    MissingEntity { key: String },

    #[error("{owner} has no field \"{field}\"")]
    MissingField { owner: String, field: String },

    #[error("{owner}.{field} is null")]
    NullField { owner: String, field: String },

    #[error("{owner}.{field} is not a {expected}")]
    UnexpectedType {
        owner: String,
        field: String,
        expected: &'static str,
    },

    #[error("reference {key} does not point at a {expected} entity")]
    KindMismatch { key: String, expected: &'static str },

    #[error("reference {key} points at an entity missing from the store")]
    Dangling { key: String },
}

/// Marker for the entity type a reference is expected to point at.
pub trait EntityKind {
    /// Typename prefix of the store key (`User` in `User:7`).
    const TYPENAME: &'static str;
}

macro_rules! entity_kinds {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug)]
            pub enum $name {}

            impl EntityKind for $name {
                const TYPENAME: &'static str = stringify!($name);
            }
        )*
    };
}

entity_kinds!(Post, User, Collection, Tag, Topic);

/// Parsed Apollo state: entity key → entity record.
///
/// Read-only once built. The keys of image-metadata entities are indexed at
/// construction so counting them does not rescan the whole store.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceStore {
    entries: Map<String, Value>,
    image_metadata_keys: Vec<String>,
}

impl ReferenceStore {
    #[must_use]
    pub fn new(entries: Map<String, Value>) -> Self {
        let image_metadata_keys = entries
            .keys()
            .filter(|key| key.contains(IMAGE_METADATA_MARKER))
            .cloned()
            .collect();
        Self {
            entries,
            image_metadata_keys,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up the `Post:<id>` entity.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingEntity`] when the post is absent.
    pub fn post(&self, id: &str) -> Result<Entity<'_, Post>, ResolveError> {
        let key = post_key(id);
        match self.entries.get_key_value(key.as_str()) {
            Some((key, value)) => Entity::from_value(key, value, self),
            None => Err(ResolveError::MissingEntity { key }),
        }
    }

    /// Image-metadata entities, in store order.
    pub fn image_metadata(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.image_metadata_keys
            .iter()
            .filter_map(|key| self.entries.get(key).map(|value| (key.as_str(), value)))
    }

    /// Consumes the store, returning the raw entity map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.entries
    }
}

/// Store key of the post with the given id.
#[must_use]
pub fn post_key(id: &str) -> String {
    format!("{}:{id}", Post::TYPENAME)
}

/// Returns the target key when `value` has the `{"__ref": "<key>"}` shape.
#[must_use]
pub fn reference_key(value: &Value) -> Option<&str> {
    value.as_object()?.get(REF_FIELD)?.as_str()
}

/// A pointer to another entity of kind `K` in the same store.
pub struct Reference<'s, K> {
    key: &'s str,
    store: &'s ReferenceStore,
    kind: PhantomData<fn() -> K>,
}

impl<K> Clone for Reference<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Reference<'_, K> {}

impl<K> fmt::Debug for Reference<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reference").field(&self.key).finish()
    }
}

impl<'s, K: EntityKind> Reference<'s, K> {
    #[must_use]
    pub fn key(&self) -> &'s str {
        self.key
    }

    /// Identifier part of the key, after the first `:`.
    #[must_use]
    pub fn id(&self) -> &'s str {
        self.key.split_once(':').map_or(self.key, |(_, id)| id)
    }

    /// Follows the reference.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::KindMismatch`] if the key is not a `K` key.
    /// - [`ResolveError::Dangling`] if the target is missing from the store.
    /// - [`ResolveError::UnexpectedType`] if the target is not an object.
    pub fn resolve(&self) -> Result<Entity<'s, K>, ResolveError> {
        let is_kind = self
            .key
            .strip_prefix(K::TYPENAME)
            .is_some_and(|rest| rest.starts_with(':'));
        if !is_kind {
            return Err(ResolveError::KindMismatch {
                key: self.key.to_owned(),
                expected: K::TYPENAME,
            });
        }

        let value = self
            .store
            .entries
            .get(self.key)
            .ok_or_else(|| ResolveError::Dangling {
                key: self.key.to_owned(),
            })?;
        Entity::from_value(self.key, value, self.store)
    }
}

/// Read-only view over a JSON object inside the store: an entity or one of
/// its embedded sub-records.
///
/// Accessors come in two strengths. Structural ones (`value`, `record`,
/// `reference`) fail when the field is missing. Leaf ones (`str`, `i64`,
/// `f64`, `bool`) return `None` for an absent or null field and fail only on
/// a value of the wrong JSON type.
#[derive(Clone, Copy)]
pub struct Fields<'s> {
    owner: &'s str,
    map: &'s Map<String, Value>,
    store: &'s ReferenceStore,
}

impl fmt::Debug for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fields")
            .field("owner", &self.owner)
            .field("len", &self.map.len())
            .finish()
    }
}

impl<'s> Fields<'s> {
    fn missing(&self, field: &str) -> ResolveError {
        ResolveError::MissingField {
            owner: self.owner.to_owned(),
            field: field.to_owned(),
        }
    }

    fn wrong_type(&self, field: &str, expected: &'static str) -> ResolveError {
        ResolveError::UnexpectedType {
            owner: self.owner.to_owned(),
            field: field.to_owned(),
            expected,
        }
    }

    /// The raw field value; null is allowed, absence is not.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingField`] if the field is absent.
    pub fn value(&self, field: &str) -> Result<&'s Value, ResolveError> {
        self.map.get(field).ok_or_else(|| self.missing(field))
    }

    /// The field value when present and not null.
    #[must_use]
    pub fn non_null(&self, field: &str) -> Option<&'s Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// A required embedded record.
    ///
    /// # Errors
    ///
    /// Fails if the field is absent, null, or not an object.
    pub fn record(&self, field: &str) -> Result<Fields<'s>, ResolveError> {
        match self.value(field)? {
            Value::Object(map) => Ok(Fields {
                owner: self.owner,
                map,
                store: self.store,
            }),
            Value::Null => Err(ResolveError::NullField {
                owner: self.owner.to_owned(),
                field: field.to_owned(),
            }),
            _ => Err(self.wrong_type(field, "record")),
        }
    }

    /// An embedded record that may be absent or null.
    ///
    /// # Errors
    ///
    /// Fails only if the field holds something other than an object.
    pub fn optional_record(&self, field: &str) -> Result<Option<Fields<'s>>, ResolveError> {
        match self.non_null(field) {
            None => Ok(None),
            Some(_) => self.record(field).map(Some),
        }
    }

    /// A required reference.
    ///
    /// # Errors
    ///
    /// Fails if the field is absent, null, or not `{"__ref": ...}`-shaped.
    pub fn reference<K: EntityKind>(&self, field: &str) -> Result<Reference<'s, K>, ResolveError> {
        self.optional_reference(field)?
            .ok_or_else(|| match self.map.get(field) {
                None => self.missing(field),
                Some(_) => ResolveError::NullField {
                    owner: self.owner.to_owned(),
                    field: field.to_owned(),
                },
            })
    }

    /// A reference that may be absent or null.
    ///
    /// # Errors
    ///
    /// Fails if the field holds a non-null value that is not a reference.
    pub fn optional_reference<K: EntityKind>(
        &self,
        field: &str,
    ) -> Result<Option<Reference<'s, K>>, ResolveError> {
        let Some(value) = self.non_null(field) else {
            return Ok(None);
        };
        let key = reference_key(value).ok_or_else(|| self.wrong_type(field, "reference"))?;
        Ok(Some(self.store.reference(key)))
    }

    /// A list field; `None` when absent or null.
    ///
    /// # Errors
    ///
    /// Fails if the field holds a non-array value.
    pub fn list(&self, field: &str) -> Result<Option<&'s Vec<Value>>, ResolveError> {
        match self.non_null(field) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(self.wrong_type(field, "list")),
        }
    }

    /// Element `idx` of list `field`, read as a reference.
    ///
    /// # Errors
    ///
    /// Fails if the list or the element is missing, or the element is not
    /// `{"__ref": ...}`-shaped.
    pub fn list_item_reference<K: EntityKind>(
        &self,
        field: &str,
        idx: usize,
    ) -> Result<Reference<'s, K>, ResolveError> {
        let path = format!("{field}[{idx}]");
        let item = self
            .list(field)?
            .and_then(|items| items.get(idx))
            .ok_or_else(|| self.missing(&path))?;
        let key = reference_key(item).ok_or_else(|| self.wrong_type(&path, "reference"))?;
        Ok(self.store.reference(key))
    }

    /// # Errors
    ///
    /// Fails if the field holds a non-string value.
    pub fn str(&self, field: &str) -> Result<Option<String>, ResolveError> {
        self.non_null(field)
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| self.wrong_type(field, "string"))
            })
            .transpose()
    }

    /// # Errors
    ///
    /// Fails if the field holds a value that is not an integer.
    pub fn i64(&self, field: &str) -> Result<Option<i64>, ResolveError> {
        self.non_null(field)
            .map(|v| v.as_i64().ok_or_else(|| self.wrong_type(field, "integer")))
            .transpose()
    }

    /// # Errors
    ///
    /// Fails if the field holds a non-numeric value.
    pub fn f64(&self, field: &str) -> Result<Option<f64>, ResolveError> {
        self.non_null(field)
            .map(|v| v.as_f64().ok_or_else(|| self.wrong_type(field, "number")))
            .transpose()
    }

    /// # Errors
    ///
    /// Fails if the field holds a non-boolean value.
    pub fn bool(&self, field: &str) -> Result<Option<bool>, ResolveError> {
        self.non_null(field)
            .map(|v| v.as_bool().ok_or_else(|| self.wrong_type(field, "boolean")))
            .transpose()
    }
}

impl ReferenceStore {
    fn reference<'s, K>(&'s self, key: &'s str) -> Reference<'s, K> {
        Reference {
            key,
            store: self,
            kind: PhantomData,
        }
    }
}

/// A resolved entity of kind `K`. Dereferences to its [`Fields`].
pub struct Entity<'s, K> {
    key: &'s str,
    fields: Fields<'s>,
    kind: PhantomData<fn() -> K>,
}

impl<K> fmt::Debug for Entity<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entity").field(&self.key).finish()
    }
}

impl<'s, K> Entity<'s, K> {
    fn from_value(
        key: &'s str,
        value: &'s Value,
        store: &'s ReferenceStore,
    ) -> Result<Self, ResolveError> {
        let map = value.as_object().ok_or_else(|| ResolveError::UnexpectedType {
            owner: key.to_owned(),
            field: String::new(),
            expected: "record",
        })?;
        Ok(Self {
            key,
            fields: Fields {
                owner: key,
                map,
                store,
            },
            kind: PhantomData,
        })
    }

    #[must_use]
    pub fn key(&self) -> &'s str {
        self.key
    }
}

impl<'s, K> std::ops::Deref for Entity<'s, K> {
    type Target = Fields<'s>;

    fn deref(&self) -> &Fields<'s> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn store(value: Value) -> ReferenceStore {
        match value {
            Value::Object(map) => ReferenceStore::new(map),
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn reference_resolves_to_target_entity() {
        let s = store(json!({
            "Post:1": {"creator": {"__ref": "User:7"}},
            "User:7": {"id": "7", "name": "Khoa"}
        }));
        let post = s.post("1").expect("post");
        let creator = post.reference::<User>("creator").expect("ref");
        assert_eq!(creator.key(), "User:7");
        assert_eq!(creator.id(), "7");
        let user = creator.resolve().expect("resolve");
        assert_eq!(user.str("name").unwrap().as_deref(), Some("Khoa"));
    }

    #[test]
    fn dangling_reference_is_an_error_not_a_panic() {
        let s = store(json!({"Post:1": {"creator": {"__ref": "User:404"}}}));
        let post = s.post("1").expect("post");
        let err = post.reference::<User>("creator").unwrap().resolve().unwrap_err();
        assert_eq!(
            err,
            ResolveError::Dangling {
                key: "User:404".to_owned()
            }
        );
    }

    #[test]
    fn reference_of_wrong_kind_is_rejected() {
        let s = store(json!({
            "Post:1": {"creator": {"__ref": "Collection:9"}},
            "Collection:9": {"name": "Tech"}
        }));
        let post = s.post("1").expect("post");
        let err = post.reference::<User>("creator").unwrap().resolve().unwrap_err();
        assert!(matches!(err, ResolveError::KindMismatch { expected: "User", .. }));
    }

    #[test]
    fn kind_prefix_must_end_at_separator() {
        let s = store(json!({
            "Post:1": {"creator": {"__ref": "UserProfile:7"}},
            "UserProfile:7": {}
        }));
        let post = s.post("1").expect("post");
        let err = post.reference::<User>("creator").unwrap().resolve().unwrap_err();
        assert!(matches!(err, ResolveError::KindMismatch { .. }));
    }

    #[test]
    fn optional_reference_null_and_absent_are_none() {
        let s = store(json!({"Post:1": {"collection": null}}));
        let post = s.post("1").expect("post");
        assert!(post.optional_reference::<Collection>("collection").unwrap().is_none());
        assert!(post.optional_reference::<Collection>("other").unwrap().is_none());
    }

    #[test]
    fn required_reference_reports_missing_and_null() {
        let s = store(json!({"Post:1": {"creator": null}}));
        let post = s.post("1").expect("post");
        assert!(matches!(
            post.reference::<User>("creator").unwrap_err(),
            ResolveError::NullField { .. }
        ));
        assert!(matches!(
            post.reference::<User>("missing").unwrap_err(),
            ResolveError::MissingField { .. }
        ));
    }

    #[test]
    fn non_reference_value_is_a_type_error() {
        let s = store(json!({"Post:1": {"creator": "User:7"}}));
        let post = s.post("1").expect("post");
        assert!(matches!(
            post.reference::<User>("creator").unwrap_err(),
            ResolveError::UnexpectedType { expected: "reference", .. }
        ));
    }

    #[test]
    fn leaf_accessors_tolerate_absence_but_not_wrong_types() {
        let s = store(json!({"Post:1": {"clapCount": 5, "title": null, "isLocked": "no"}}));
        let post = s.post("1").expect("post");
        assert_eq!(post.i64("clapCount").unwrap(), Some(5));
        assert_eq!(post.str("title").unwrap(), None);
        assert_eq!(post.str("seoTitle").unwrap(), None);
        assert!(post.bool("isLocked").is_err());
    }

    #[test]
    fn record_requires_an_object() {
        let s = store(json!({"Post:1": {"postResponses": null, "stats": {"count": 2}}}));
        let post = s.post("1").expect("post");
        assert!(matches!(
            post.record("postResponses").unwrap_err(),
            ResolveError::NullField { .. }
        ));
        assert_eq!(post.record("stats").unwrap().i64("count").unwrap(), Some(2));
    }

    #[test]
    fn image_metadata_index_only_holds_marker_keys() {
        let s = store(json!({
            "ImageMetadata:a.png": {"originalHeight": 10},
            "Post:1": {},
            "ImageMetadata:b.png": {"originalHeight": null}
        }));
        let keys: Vec<&str> = s.image_metadata().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.contains(IMAGE_METADATA_MARKER)));
    }

    #[test]
    fn post_entity_borrows_its_key_from_the_store() {
        let s = store(json!({"User:7": {"id": "7"}, "Post:42": {"clapCount": 3}}));
        let post = s.post("42").expect("post");
        assert_eq!(post.key(), "Post:42");
        assert_eq!(post.i64("clapCount").unwrap(), Some(3));
    }

    #[test]
    fn missing_post_is_reported_with_its_key() {
        let s = store(json!({}));
        assert_eq!(
            s.post("42").unwrap_err(),
            ResolveError::MissingEntity {
                key: "Post:42".to_owned()
            }
        );
    }
}
