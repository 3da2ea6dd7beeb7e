use std::time::Instant;

use crate::errors::Error;
use crate::model::{
    CreatePostRequest, POSTS_COLLECTION, Post, PostIdResponse, PostListResponse, PostResponse,
    PostSummary, PostVersionResponse, TRACES_COLLECTION, Trace, UpdatePostRequest, title_to_bson,
};
use crate::query::{self, PageRequest, plan_list};
use crate::store::{Cache, SequenceAllocator, Store, UpdateDoc};

use super::{PostService, format_timestamp, now_millis, post_cache_key, post_id_filter, validate};

/// Fields projected into the post listing.
const POST_PROJECTION: [&str; 7] =
    ["postId", "category", "title", "author", "createdAt", "updatedAt", "showedAt"];

impl<S, A, C> PostService<S, A, C>
where
    S: Store,
    A: SequenceAllocator,
    C: Cache,
{
    /// Paginated post listing filtered by a q-expression.
    ///
    /// # Errors
    /// `OffsetInvalid`/`CountInvalid` for bad pagination, `QueryNotMatched`
    /// for grammar violations, plus store failures.
    pub fn list_posts(
        &self,
        offset: i64,
        count: i64,
        q: &str,
    ) -> Result<PostListResponse, Error> {
        let started = Instant::now();
        log::info!("list_posts start [offset: {offset}, count: {count}, q: {q}]");

        let page = PageRequest::new(offset, count);
        page.validate()?;
        let clauses = query::compile(q)?;
        let plan = plan_list(None, clauses, page, None, Some(&POST_PROJECTION));

        let total = self.store.count_agg(POSTS_COLLECTION, &plan.count)?;
        let docs = self.store.find_many(POSTS_COLLECTION, &plan.list)?;
        let posts = docs
            .iter()
            .map(PostSummary::from_document)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|mut p| {
                p.created_at = format_timestamp(&p.created_at);
                p.updated_at = p.updated_at.as_deref().map(format_timestamp);
                p.showed_at = format_timestamp(&p.showed_at);
                p
            })
            .collect();

        log::info!(
            "list_posts complete [total: {total}] ({} ms)",
            started.elapsed().as_millis()
        );
        Ok(PostListResponse { total, posts })
    }

    /// Creates a post stamped with `current_time` (epoch millis).
    ///
    /// # Errors
    /// `InvalidValue` for failed field validation, `IncorrectExposureTime`
    /// when the exposure time lies before the creation instant.
    pub fn create_post(
        &self,
        req: &CreatePostRequest,
        current_time: &str,
    ) -> Result<PostIdResponse, Error> {
        let started = Instant::now();
        log::info!("create_post start");

        validate::into_error(validate::validate_create(req))?;
        if let Some(showed_at) = req.showed_at.as_deref() {
            if showed_at < current_time {
                return Err(Error::IncorrectExposureTime);
            }
        }

        let post_id = self.sequences.next(&self.config.post_sequence)?.to_string();
        let post = Post {
            post_id: post_id.clone(),
            category: req.category.clone().unwrap_or_default(),
            title: req.title.clone().unwrap_or_default(),
            content: req.content.clone().unwrap_or_default(),
            author: req.author.clone().unwrap_or_default(),
            created_at: current_time.to_string(),
            updated_at: current_time.to_string(),
            showed_at: req.showed_at.clone().unwrap_or_else(|| current_time.to_string()),
            del_yn: false,
        };
        self.store.insert(POSTS_COLLECTION, post.to_document())?;
        self.cache_post(&post, self.config.post_create_ttl());

        log::info!(
            "create_post complete [postId: {post_id}] ({} ms)",
            started.elapsed().as_millis()
        );
        Ok(PostIdResponse { post_id })
    }

    /// Single-post read through the cache.
    ///
    /// # Errors
    /// `NoPost` when the id is unknown; store failures. Cache failures are
    /// logged and treated as misses.
    pub fn get_post(&self, post_id: &str) -> Result<PostResponse, Error> {
        let started = Instant::now();
        log::info!("get_post start [postId: {post_id}]");

        let key = post_cache_key(post_id);
        let cached = self.cache.get(&key).unwrap_or_else(|e| {
            log::warn!("cache read failed for {key}, falling through: {e}");
            None
        });

        let post: Post = match cached.and_then(|json| serde_json::from_str(&json).ok()) {
            Some(post) => post,
            None => {
                let doc = self
                    .store
                    .find_one(POSTS_COLLECTION, &post_id_filter(post_id))?
                    .ok_or_else(|| Error::NoPost(post_id.to_string()))?;
                let post = Post::from_document(&doc)?;
                self.cache_post(&post, self.config.post_read_ttl());
                post
            }
        };

        log::info!("get_post complete [postId: {post_id}] ({} ms)", started.elapsed().as_millis());
        Ok(PostResponse {
            post_id: post.post_id,
            category: post.category,
            title: post.title,
            content: post.content,
            author: post.author,
            created_at: format_timestamp(&post.created_at),
            updated_at: format_timestamp(&post.updated_at),
            showed_at: format_timestamp(&post.showed_at),
            del_yn: post.del_yn,
        })
    }

    /// Applies a patch to a post, versioning the pre-mutation state.
    ///
    /// The accepted mutation first snapshots the old title/content/author
    /// into a trace tagged with a freshly allocated version, then patches
    /// the post atomically. A failure between those two steps leaves the
    /// trace in place; there is no compensating rollback.
    ///
    /// # Errors
    /// `InvalidValue`, `NoPost`, `NotModified`, plus store failures.
    pub fn update_post(
        &self,
        post_id: &str,
        req: &UpdatePostRequest,
    ) -> Result<PostVersionResponse, Error> {
        let started = Instant::now();
        log::info!("update_post start [postId: {post_id}]");

        validate::into_error(validate::validate_update(req))?;

        let current_doc = self
            .store
            .find_one(POSTS_COLLECTION, &post_id_filter(post_id))?
            .ok_or_else(|| Error::NoPost(post_id.to_string()))?;
        let current = Post::from_document(&current_doc)?;

        if is_noop(req, &current) {
            log::info!("update_post - nothing has changed [postId: {post_id}]");
            return Err(Error::NotModified(post_id.to_string()));
        }

        let version = self.sequences.next(&self.config.trace_sequence_for(post_id))?.to_string();
        let trace = Trace {
            version: version.clone(),
            title: current.title.clone(),
            content: current.content.clone(),
            editor: current.author.clone(),
            edited_at: current.updated_at.clone(),
            post_id: post_id.to_string(),
        };
        self.store.insert(TRACES_COLLECTION, trace.to_document())?;

        let mut patch = UpdateDoc::default();
        if let Some(title) = &req.title {
            patch = patch.set("title", title_to_bson(title));
        }
        if let Some(content) = &req.content {
            patch = patch.set("content", content.as_str());
        }
        patch = patch.set("author", req.author.clone().unwrap_or_default());
        if let Some(del_yn) = req.del_yn {
            patch = patch.set("delYn", del_yn);
        }
        patch = patch.set("updatedAt", now_millis());

        self.store
            .find_and_modify(POSTS_COLLECTION, &post_id_filter(post_id), &patch)?
            .ok_or_else(|| Error::NoPost(post_id.to_string()))?;

        let key = post_cache_key(post_id);
        if let Err(e) = self.cache.delete(&key) {
            log::warn!("cache invalidation failed for {key}: {e}");
        }

        log::info!(
            "update_post complete [postId: {post_id}, version: {version}] ({} ms)",
            started.elapsed().as_millis()
        );
        Ok(PostVersionResponse { post_id: post_id.to_string(), version })
    }

    /// Soft-deletes a post.
    ///
    /// # Errors
    /// `NoPost` for unknown ids, `AlreadyDeleted` when the flag was already
    /// set, plus store failures.
    pub fn delete_post(&self, post_id: &str) -> Result<PostIdResponse, Error> {
        let started = Instant::now();
        log::info!("delete_post start [postId: {post_id}]");

        let patch = UpdateDoc::default().set("delYn", true);
        let report = self.store.update_first(POSTS_COLLECTION, &post_id_filter(post_id), &patch)?;
        if report.matched == 0 {
            log::info!("delete_post failure: NoPost [postId: {post_id}]");
            return Err(Error::NoPost(post_id.to_string()));
        }
        if report.modified == 0 {
            log::info!("delete_post failure: AlreadyDeleted [postId: {post_id}]");
            return Err(Error::AlreadyDeleted(post_id.to_string()));
        }

        let key = post_cache_key(post_id);
        if let Err(e) = self.cache.delete(&key) {
            log::warn!("cache invalidation failed for {key}: {e}");
        }

        log::info!("delete_post complete [postId: {post_id}] ({} ms)", started.elapsed().as_millis());
        Ok(PostIdResponse { post_id: post_id.to_string() })
    }

    fn cache_post(&self, post: &Post, ttl: std::time::Duration) {
        let key = post_cache_key(&post.post_id);
        match serde_json::to_string(post) {
            Ok(json) => {
                if let Err(e) = self.cache.set(&key, &json, ttl) {
                    log::warn!("cache write failed for {key}: {e}");
                }
            }
            Err(e) => log::warn!("cache serialization failed for {key}: {e}"),
        }
    }
}

/// A patch is a no-op when both title and content are effectively unchanged.
///
/// Title uses a containment check (every patched entry already present);
/// content uses strict equality. The asymmetry is longstanding behavior and
/// is pinned by tests.
fn is_noop(patch: &UpdatePostRequest, current: &Post) -> bool {
    let title_empty = patch.title.as_ref().map_or(true, Vec::is_empty);
    let content_empty = patch.content.as_ref().map_or(true, String::is_empty);
    let content_same = patch.content.as_deref() == Some(current.content.as_str());
    let title_contained = patch
        .title
        .as_ref()
        .is_some_and(|title| title.iter().all(|entry| current.title.contains(entry)));

    (title_empty && content_empty)
        || (title_empty && content_same)
        || (content_empty && title_contained)
        || (content_same && title_contained)
}
