mod cache;
mod memory;

pub use cache::MemoryCache;
pub use memory::{MemorySequences, MemoryStore};

use bson::{Bson, Document as BsonDocument};
use std::time::Duration;

use crate::errors::Error;
use crate::query::{Filter, Pipeline};

/// A `$set`-style patch applied by the atomic mutation primitives.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateDoc {
    pub set: Vec<(String, Bson)>,
}

impl UpdateDoc {
    #[must_use]
    pub fn set(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.set.push((field.to_string(), value.into()));
        self
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    pub matched: u64,
    pub modified: u64,
}

/// Narrow document-store interface the core depends on. Single-document
/// atomicity of `find_and_modify`/`update_first` is the only concurrency
/// guarantee the core relies on.
pub trait Store {
    /// Counts documents matching a plain filter.
    fn count(&self, collection: &str, filter: &Filter) -> Result<i64, Error>;

    /// Counts documents emerging from an aggregation pipeline.
    fn count_agg(&self, collection: &str, pipeline: &Pipeline) -> Result<i64, Error>;

    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<BsonDocument>, Error>;

    fn find_many(&self, collection: &str, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, Error>;

    fn insert(&self, collection: &str, doc: BsonDocument) -> Result<(), Error>;

    /// Atomically patches the first matching document and returns its
    /// pre-mutation image, or `None` when nothing matched.
    fn find_and_modify(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &UpdateDoc,
    ) -> Result<Option<BsonDocument>, Error>;

    /// Patches the first matching document, reporting matched/modified counts.
    fn update_first(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &UpdateDoc,
    ) -> Result<UpdateReport, Error>;
}

/// Atomic named counter. The first allocation for an unseen name yields 1;
/// values are strictly increasing per name.
pub trait SequenceAllocator {
    fn next(&self, name: &str) -> Result<i64, Error>;
}

/// Best-effort key/value cache with per-entry TTL. Read-through callers treat
/// failures as misses rather than failing the request.
pub trait Cache {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error>;

    fn delete(&self, key: &str) -> Result<(), Error>;

    fn has_key(&self, key: &str) -> Result<bool, Error>;
}
