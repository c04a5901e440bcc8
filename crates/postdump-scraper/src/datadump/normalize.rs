//! Flattening of a `Post:<id>` entity and its neighbours into a
//! [`PostRecord`].
//!
//! Each step returns a `Result`; the first failure turns the whole post into
//! [`PostRecord::deleted`]. A partially filled record is never returned.

use postdump_core::PostRecord;

use crate::datadump::store::{
    post_key, reference_key, Collection, Entity, Post, ReferenceStore, ResolveError, Tag, Topic,
    User,
};

/// Normalizes the post `id` out of `store`.
///
/// `None` stands for a page whose store could not be loaded. A missing
/// post, or any resolution failure while reading it, yields the deleted
/// record for `id`.
#[must_use]
pub fn normalize_post(id: &str, store: Option<&ReferenceStore>) -> PostRecord {
    let Some(store) = store else {
        return PostRecord::deleted(id);
    };
    if !store.contains_key(&post_key(id)) {
        return PostRecord::deleted(id);
    }

    match build_record(id, store) {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!(post_id = id, error = %e, "post did not resolve; using deleted record");
            PostRecord::deleted(id)
        }
    }
}

fn build_record(id: &str, store: &ReferenceStore) -> Result<PostRecord, ResolveError> {
    let post = store.post(id)?;

    let collection = collection_fields(&post)?;
    let creator = creator_fields(&post)?;

    Ok(PostRecord {
        id: id.to_owned(),
        title: post.str("title")?,
        medium_url: post.str("mediumUrl")?,
        tags: tag_ids(&post)?,
        is_deleted: false,
        clap_count: post.i64("clapCount")?,
        voter_count: post.i64("voterCount")?,
        post_responses: post.record("postResponses")?.i64("count")?,
        reading_time: post.f64("readingTime")?,
        curation_status: post.str("curationStatus")?,
        seo_title: post.str("seoTitle")?,
        seo_description: post.str("seoDescription")?,
        is_locked: post.bool("isLocked")?,
        first_published_at: post.i64("firstPublishedAt")?,
        latest_published_at: post.i64("latestPublishedAt")?,
        image_count: Some(count_images(store)),
        topics: topic_names(&post)?,
        collection_name: collection.name,
        collection_slug: collection.slug,
        collection_subscribers: collection.subscribers,
        creator_id: Some(creator.id),
        creator_name: creator.name,
        creator_follower_count: creator.follower_count,
        creator_following_count: creator.following_count,
        creator_medium_member_at: creator.medium_member_at,
        creator_ats_qualified_at: creator.ats_qualified_at,
        creator_has_subdomain: creator.has_subdomain,
        creator_country: creator.country,
    })
}

/// Counts image-metadata entities with a non-null `originalHeight`.
///
/// The scan covers the whole store, so images belonging to other posts
/// present in the same page state are counted as well.
pub(crate) fn count_images(store: &ReferenceStore) -> usize {
    store
        .image_metadata()
        .filter(|(_, value)| value.get("originalHeight").is_some_and(|h| !h.is_null()))
        .count()
}

/// Topic names, or `None` when the post has no topic list. Topics are
/// usually inlined but may also be references.
fn topic_names(post: &Entity<'_, Post>) -> Result<Option<Vec<String>>, ResolveError> {
    let Some(topics) = post.list("topics")? else {
        return Ok(None);
    };

    topics
        .iter()
        .enumerate()
        .map(|(idx, topic)| {
            let name = if reference_key(topic).is_some() {
                post.list_item_reference::<Topic>("topics", idx)?
                    .resolve()?
                    .str("name")?
            } else {
                topic.get("name").and_then(|v| v.as_str()).map(str::to_owned)
            };
            name.ok_or_else(|| ResolveError::MissingField {
                owner: post.key().to_owned(),
                field: format!("topics[{idx}].name"),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Tag identifiers taken from the tag reference keys (`Tag:programming` →
/// `programming`). Tags are not resolved.
fn tag_ids(post: &Entity<'_, Post>) -> Result<Option<Vec<String>>, ResolveError> {
    let Some(tags) = post.list("tags")? else {
        return Ok(None);
    };

    (0..tags.len())
        .map(|idx| {
            post.list_item_reference::<Tag>("tags", idx)
                .map(|tag| tag.id().to_owned())
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[derive(Default)]
struct CollectionFields {
    name: Option<String>,
    slug: Option<String>,
    subscribers: Option<i64>,
}

/// Collection columns. A null or absent collection is fine; a reference to
/// a collection missing from the store is not.
fn collection_fields(post: &Entity<'_, Post>) -> Result<CollectionFields, ResolveError> {
    let Some(reference) = post.optional_reference::<Collection>("collection")? else {
        return Ok(CollectionFields::default());
    };
    let collection = reference.resolve()?;
    Ok(CollectionFields {
        name: collection.str("name")?,
        slug: collection.str("slug")?,
        subscribers: collection.i64("subscriberCount")?,
    })
}

struct CreatorFields {
    id: String,
    name: Option<String>,
    follower_count: Option<i64>,
    following_count: Option<i64>,
    medium_member_at: Option<i64>,
    ats_qualified_at: Option<i64>,
    has_subdomain: Option<bool>,
    country: Option<String>,
}

/// Creator columns. Unlike the collection, the creator must resolve and
/// carry an `id` and a `socialStats` record.
fn creator_fields(post: &Entity<'_, Post>) -> Result<CreatorFields, ResolveError> {
    let creator = post.reference::<User>("creator")?.resolve()?;

    let id = creator.str("id")?.ok_or_else(|| ResolveError::MissingField {
        owner: creator.key().to_owned(),
        field: "id".to_owned(),
    })?;
    let social_stats = creator.record("socialStats")?;

    Ok(CreatorFields {
        id,
        name: creator.str("name")?,
        follower_count: social_stats.i64("followerCount")?,
        following_count: social_stats.i64("followingCount")?,
        medium_member_at: creator.i64("mediumMemberAt")?,
        ats_qualified_at: creator.i64("atsQualifiedAt")?,
        has_subdomain: creator.bool("hasSubdomain")?,
        country: creator
            .optional_record("geolocation")?
            .map(|geo| geo.str("country"))
            .transpose()?
            .flatten(),
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
