use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use boardlite::model::{CreatePostRequest, LocalizedText, UpdatePostRequest};
use boardlite::{Cache, Error, MemoryCache, MemorySequences, MemoryStore, PostService, ServiceConfig};

const T0: &str = "1700000000000";

fn service() -> PostService<MemoryStore, MemorySequences, MemoryCache> {
    PostService::new(
        MemoryStore::new(),
        MemorySequences::new(),
        MemoryCache::default(),
        ServiceConfig::default(),
    )
}

fn create_req() -> CreatePostRequest {
    CreatePostRequest {
        category: Some("C001".into()),
        title: Some(vec![LocalizedText::new("ko", "공지사항입니다")]),
        content: Some("first content".into()),
        author: Some("writer".into()),
        showed_at: None,
    }
}

fn update_req(content: &str, author: &str) -> UpdatePostRequest {
    UpdatePostRequest {
        content: Some(content.into()),
        author: Some(author.into()),
        ..Default::default()
    }
}

/// Seeds one post with two edits, leaving traces v1 (editor "writer") and
/// v2 (editor "editor").
fn seeded() -> PostService<MemoryStore, MemorySequences, MemoryCache> {
    let svc = service();
    svc.create_post(&create_req(), T0).unwrap();
    svc.update_post("1", &update_req("second content", "editor")).unwrap();
    svc.update_post("1", &update_req("third content", "reviser")).unwrap();
    svc
}

#[test]
fn lists_traces_in_insertion_order() {
    let svc = seeded();
    let page = svc.list_traces("1", 10, 1, "", "", "").unwrap();
    assert_eq!(page.post_id, "1");
    assert_eq!(page.total, 2);
    let versions: Vec<&str> = page.traces.iter().map(|t| t.version.as_str()).collect();
    assert_eq!(versions, vec!["1", "2"]);
    assert_eq!(page.traces[0].editor, "writer");
    assert_eq!(page.traces[1].editor, "editor");
    // v1 snapshots the creation-time updatedAt.
    assert_eq!(page.traces[0].edited_at, "2023-11-14 22:13:20");
}

#[test]
fn trace_listing_paginates() {
    let svc = seeded();
    let page = svc.list_traces("1", 1, 2, "", "", "").unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.traces[0].version, "2");

    assert_eq!(svc.list_traces("1", 0, 1, "", "", "").unwrap_err().code(), 4001);
    assert_eq!(svc.list_traces("1", 1, 0, "", "", "").unwrap_err().code(), 4002);
}

#[test]
fn trace_listing_filters_by_q() {
    let svc = seeded();
    let page = svc.list_traces("1", 10, 1, "editor%eq?writer", "", "").unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.traces[0].version, "1");

    assert_eq!(svc.list_traces("1", 10, 1, "???", "", "").unwrap_err().code(), 4003);
}

#[test]
fn trace_listing_respects_the_date_range() {
    let svc = seeded();
    // v1 was edited at T0; v2 at the real current time, outside this window.
    let page = svc.list_traces("1", 10, 1, "", "1600000000000", "1710000000000").unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.traces[0].version, "1");
}

#[test]
fn date_range_validation() {
    let svc = seeded();
    // Start in the future.
    let err = svc.list_traces("1", 10, 1, "", "9999999999999", "").unwrap_err();
    assert_eq!(err.code(), 4010);
    // Window ends before it starts.
    let err = svc
        .list_traces("1", 10, 1, "", "1700000000000", "1600000000000")
        .unwrap_err();
    assert_eq!(err.code(), 4010);
}

#[test]
fn listing_traces_of_an_unknown_post_fails() {
    let svc = seeded();
    let err = svc.list_traces("42", 10, 1, "", "", "").unwrap_err();
    assert_eq!(err.code(), 4008);
}

#[test]
fn get_trace_returns_the_full_snapshot() {
    let svc = seeded();
    let trace = svc.get_trace("1", "2").unwrap();
    assert_eq!(trace.version, "2");
    assert_eq!(trace.content, "second content");
    assert_eq!(trace.editor, "editor");
    assert_eq!(trace.post_id, "1");

    let err = svc.get_trace("1", "99").unwrap_err();
    assert_eq!(err.code(), 4009);
    assert_eq!(err.to_string(), "Post[1], Trace[99] does not exist");
}

/// Cache wrapper counting writes, to observe read-through behavior.
struct SpyCache {
    inner: MemoryCache,
    sets: Arc<AtomicUsize>,
}

impl Cache for SpyCache {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), Error> {
        self.inner.delete(key)
    }

    fn has_key(&self, key: &str) -> Result<bool, Error> {
        self.inner.has_key(key)
    }
}

#[test]
fn repeated_trace_listing_is_served_from_cache() {
    let sets = Arc::new(AtomicUsize::new(0));
    let cache = SpyCache { inner: MemoryCache::default(), sets: Arc::clone(&sets) };
    let svc = PostService::new(
        MemoryStore::new(),
        MemorySequences::new(),
        cache,
        ServiceConfig::default(),
    );
    svc.create_post(&create_req(), T0).unwrap();
    svc.update_post("1", &update_req("second content", "editor")).unwrap();

    let first = svc.list_traces("1", 10, 1, "", "", "").unwrap();
    let writes_after_first = sets.load(Ordering::SeqCst);
    let second = svc.list_traces("1", 10, 1, "", "", "").unwrap();
    assert_eq!(first, second);
    // The second listing hit the cached page instead of rewriting it.
    assert_eq!(sets.load(Ordering::SeqCst), writes_after_first);

    // A different parameter combination is its own cache entry.
    svc.list_traces("1", 5, 1, "", "", "").unwrap();
    assert_eq!(sets.load(Ordering::SeqCst), writes_after_first + 1);
}
