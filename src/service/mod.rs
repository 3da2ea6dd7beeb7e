mod posts;
mod traces;
pub mod validate;

use bson::Bson;
use chrono::{DateTime, Utc};

use crate::config::ServiceConfig;
use crate::query::{CmpOp, Filter};

/// The board service core, generic over its external collaborators: the
/// document store, the sequence allocator, and the read-through cache.
pub struct PostService<S, A, C> {
    store: S,
    sequences: A,
    cache: C,
    config: ServiceConfig,
}

impl<S, A, C> PostService<S, A, C> {
    pub fn new(store: S, sequences: A, cache: C, config: ServiceConfig) -> Self {
        Self { store, sequences, cache, config }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Current instant as an epoch-millis string, the storage format for all
/// timestamps.
#[must_use]
pub fn now_millis() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Renders a stored epoch-millis string as `yyyy-MM-dd HH:mm:ss` (UTC).
/// Unparsable values fall back to the raw stored string.
#[must_use]
pub fn format_timestamp(ts: &str) -> String {
    ts.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(|| ts.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

pub(crate) fn post_id_filter(post_id: &str) -> Filter {
    Filter::Cmp {
        path: "postId".to_string(),
        op: CmpOp::Eq,
        value: Bson::String(post_id.to_string()),
    }
}

pub(crate) fn post_cache_key(post_id: &str) -> String {
    format!("post:{post_id}")
}
