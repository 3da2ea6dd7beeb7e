use std::time::Instant;

use bson::Bson;

use crate::errors::Error;
use crate::model::{
    POSTS_COLLECTION, TRACES_COLLECTION, Trace, TraceListResponse, TraceResponse, TraceSummary,
};
use crate::query::{self, CmpOp, DateRange, Filter, PageRequest, plan_list};
use crate::store::{Cache, SequenceAllocator, Store};

use super::{PostService, format_timestamp, now_millis, post_id_filter};

impl<S, A, C> PostService<S, A, C>
where
    S: Store,
    A: SequenceAllocator,
    C: Cache,
{
    /// Paginated edit-history listing for one post, with optional
    /// q-expression filtering and an inclusive `editedAt` date range.
    /// Results for a given parameter combination are cached briefly.
    ///
    /// # Errors
    /// Pagination/`InvalidDate`/`QueryNotMatched` validation errors,
    /// `NoPost` for unknown ids, plus store failures.
    pub fn list_traces(
        &self,
        post_id: &str,
        offset: i64,
        count: i64,
        q: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<TraceListResponse, Error> {
        let started = Instant::now();
        log::info!("list_traces start [postId: {post_id}, offset: {offset}, count: {count}]");

        let page = PageRequest::new(offset, count);
        page.validate()?;
        validate_date_range(start_date, end_date, &now_millis())?;
        let clauses = query::compile(q)?;

        if self.store.count(POSTS_COLLECTION, &post_id_filter(post_id))? == 0 {
            log::info!("list_traces - no post [postId: {post_id}]");
            return Err(Error::NoPost(post_id.to_string()));
        }

        let key = trace_cache_key(post_id, offset, count, q, start_date, end_date);
        if let Some(cached) = self.cached_trace_list(&key) {
            log::info!("list_traces complete from cache [postId: {post_id}]");
            return Ok(cached);
        }

        let range = DateRange::over(
            "editedAt",
            non_blank(start_date).map(str::to_string),
            non_blank(end_date).map(str::to_string),
        );
        let plan = plan_list(Some(post_id_filter(post_id)), clauses, page, Some(&range), None);

        let total = self.store.count_agg(TRACES_COLLECTION, &plan.count)?;
        let docs = self.store.find_many(TRACES_COLLECTION, &plan.list)?;
        let traces = docs
            .iter()
            .map(TraceSummary::from_document)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|mut t| {
                t.edited_at = format_timestamp(&t.edited_at);
                t
            })
            .collect();

        let response = TraceListResponse { post_id: post_id.to_string(), total, traces };
        match serde_json::to_string(&response) {
            Ok(json) => {
                if let Err(e) = self.cache.set(&key, &json, self.config.trace_list_ttl()) {
                    log::warn!("cache write failed for {key}: {e}");
                }
            }
            Err(e) => log::warn!("cache serialization failed for {key}: {e}"),
        }

        log::info!(
            "list_traces complete [postId: {post_id}, total: {total}] ({} ms)",
            started.elapsed().as_millis()
        );
        Ok(response)
    }

    /// Reads one specific edit-history version of a post.
    ///
    /// # Errors
    /// `NoTrace` when the post/version pair is unknown, plus store failures.
    pub fn get_trace(&self, post_id: &str, version: &str) -> Result<TraceResponse, Error> {
        let started = Instant::now();
        log::info!("get_trace start [postId: {post_id}, version: {version}]");

        let filter = Filter::And(vec![
            post_id_filter(post_id),
            Filter::Cmp {
                path: "version".to_string(),
                op: CmpOp::Eq,
                value: Bson::String(version.to_string()),
            },
        ]);
        let doc = self
            .store
            .find_one(TRACES_COLLECTION, &filter)?
            .ok_or_else(|| Error::NoTrace(post_id.to_string(), version.to_string()))?;
        let trace = Trace::from_document(&doc)?;

        log::info!(
            "get_trace complete [postId: {post_id}, version: {version}] ({} ms)",
            started.elapsed().as_millis()
        );
        Ok(TraceResponse {
            version: trace.version,
            title: trace.title,
            content: trace.content,
            editor: trace.editor,
            edited_at: format_timestamp(&trace.edited_at),
            post_id: trace.post_id,
        })
    }

    /// Cache probe for a trace-list page; any failure reads as a miss.
    fn cached_trace_list(&self, key: &str) -> Option<TraceListResponse> {
        let present = self.cache.has_key(key).unwrap_or_else(|e| {
            log::warn!("cache probe failed for {key}, falling through: {e}");
            false
        });
        if !present {
            return None;
        }
        self.cache
            .get(key)
            .unwrap_or_else(|e| {
                log::warn!("cache read failed for {key}, falling through: {e}");
                None
            })
            .and_then(|json| serde_json::from_str(&json).ok())
    }
}

/// Rejects a search window that starts in the future or ends before it
/// starts. Comparisons are lexicographic over epoch-millis strings, like the
/// stored values themselves.
fn validate_date_range(start_date: &str, end_date: &str, now: &str) -> Result<(), Error> {
    if non_blank(start_date).is_some() && start_date >= now {
        return Err(Error::InvalidDate);
    }
    if non_blank(end_date).is_some() && start_date >= end_date {
        return Err(Error::InvalidDate);
    }
    Ok(())
}

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}

fn trace_cache_key(
    post_id: &str,
    offset: i64,
    count: i64,
    q: &str,
    start_date: &str,
    end_date: &str,
) -> String {
    let mut key = format!("trace:{post_id}:{offset}:{count}");
    if non_blank(q).is_some() {
        key.push_str(&format!(":{q}"));
    }
    if non_blank(start_date).is_some() {
        key.push_str(&format!(":{start_date}"));
    }
    if non_blank(end_date).is_some() {
        key.push_str(&format!(":{end_date}"));
    }
    key
}
