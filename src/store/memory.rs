use bson::Document as BsonDocument;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

use crate::errors::Error;
use crate::query::{Filter, Pipeline, apply_pipeline, eval_filter};

use super::{SequenceAllocator, Store, UpdateDoc, UpdateReport};

/// In-memory reference store: collections of BSON documents behind a
/// read/write lock, with pipelines executed via `query::eval`. Insertion
/// order is preserved, which stands in for the store's natural order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<BsonDocument>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/debug helper: number of documents in a collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

fn apply_set(doc: &mut BsonDocument, patch: &UpdateDoc) -> bool {
    let mut changed = false;
    for (k, v) in &patch.set {
        let old = doc.insert(k.clone(), v.clone());
        if old.as_ref() != Some(v) {
            changed = true;
        }
    }
    changed
}

impl Store for MemoryStore {
    fn count(&self, collection: &str, filter: &Filter) -> Result<i64, Error> {
        let guard = self.collections.read();
        let n = guard
            .get(collection)
            .map_or(0, |docs| docs.iter().filter(|d| eval_filter(d, filter)).count());
        Ok(n as i64)
    }

    fn count_agg(&self, collection: &str, pipeline: &Pipeline) -> Result<i64, Error> {
        Ok(self.find_many(collection, pipeline)?.len() as i64)
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<BsonDocument>, Error> {
        let guard = self.collections.read();
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| eval_filter(d, filter)).cloned()))
    }

    fn find_many(&self, collection: &str, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, Error> {
        let guard = self.collections.read();
        let docs = guard.get(collection).cloned().unwrap_or_default();
        Ok(apply_pipeline(docs, pipeline))
    }

    fn insert(&self, collection: &str, doc: BsonDocument) -> Result<(), Error> {
        self.collections.write().entry(collection.to_string()).or_default().push(doc);
        Ok(())
    }

    fn find_and_modify(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &UpdateDoc,
    ) -> Result<Option<BsonDocument>, Error> {
        let mut guard = self.collections.write();
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(None);
        };
        for doc in docs.iter_mut() {
            if eval_filter(doc, filter) {
                let before = doc.clone();
                apply_set(doc, patch);
                return Ok(Some(before));
            }
        }
        Ok(None)
    }

    fn update_first(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &UpdateDoc,
    ) -> Result<UpdateReport, Error> {
        let mut guard = self.collections.write();
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(UpdateReport::default());
        };
        for doc in docs.iter_mut() {
            if eval_filter(doc, filter) {
                let changed = apply_set(doc, patch);
                return Ok(UpdateReport { matched: 1, modified: u64::from(changed) });
            }
        }
        Ok(UpdateReport::default())
    }
}

/// In-memory named counters with upsert-on-first-use semantics.
#[derive(Default)]
pub struct MemorySequences {
    counters: Mutex<HashMap<String, i64>>,
}

impl MemorySequences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SequenceAllocator for MemorySequences {
    fn next(&self, name: &str) -> Result<i64, Error> {
        let mut guard = self.counters.lock();
        let seq = guard.entry(name.to_string()).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }
}
