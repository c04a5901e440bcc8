//! Apollo-state datadump: loading the reference store and normalizing posts.

pub mod loader;
pub mod normalize;
pub mod store;

use postdump_core::PostRecord;

pub use loader::{load_store, Datadump, LoadError, STATE_MARKER};
pub use normalize::normalize_post;
pub use store::{
    post_key, Collection, Entity, EntityKind, Fields, Post, Reference, ReferenceStore,
    ResolveError, Tag, Topic, User,
};

/// Normalizes `id` from the outcome of a load.
///
/// A load failure is logged with its cause and then handled like any other
/// missing data: the deleted record for `id`.
#[must_use]
pub fn extract_post(id: &str, loaded: &Result<ReferenceStore, LoadError>) -> PostRecord {
    match loaded {
        Ok(store) => normalize_post(id, Some(store)),
        Err(e) => {
            tracing::warn!(post_id = id, error = %e, "no datadump available");
            normalize_post(id, None)
        }
    }
}
