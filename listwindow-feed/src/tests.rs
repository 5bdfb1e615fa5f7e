use crate::*;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use listwindow::{Window, WindowOptions};
use parking_lot::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Repo {
    id: u64,
    name: String,
}

impl Identified for Repo {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

fn repo(id: u64) -> Repo {
    Repo {
        id,
        name: format!("repo-{id}"),
    }
}

/// Serves `total` repos per user, ids offset per user so lists never overlap.
#[derive(Default)]
struct FakeRepos {
    users: HashMap<String, (u64, usize)>,
    delays: HashMap<String, usize>,
    failures: Mutex<VecDeque<FetchError>>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl FakeRepos {
    fn with_user(mut self, name: &str, total: usize) -> Self {
        let base = (self.users.len() as u64 + 1) * 1_000;
        self.users.insert(name.to_owned(), (base, total));
        self
    }

    /// Number of scheduler yields before `name`'s requests resolve.
    fn with_delay(mut self, name: &str, yields: usize) -> Self {
        self.delays.insert(name.to_owned(), yields);
        self
    }

    fn fail_next(&self, err: FetchError) {
        self.failures.lock().push_back(err);
    }

    fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PageSource for FakeRepos {
    type Item = Repo;

    async fn fetch_page(
        &self,
        subject: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Repo>, FetchError> {
        self.requests.lock().push((subject.to_owned(), page));

        let yields = self.delays.get(subject).copied().unwrap_or(0);
        for _ in 0..yields {
            tokio::task::yield_now().await;
        }

        let failure = self.failures.lock().pop_front();
        if let Some(err) = failure {
            return Err(err);
        }

        let Some(&(base, total)) = self.users.get(subject) else {
            return Err(FetchError::from_response(404, r#"{"message":"Not Found"}"#));
        };
        let start = (page as usize - 1) * page_size as usize;
        let end = (start + page_size as usize).min(total);
        let items = (start..end.max(start)).map(|i| repo(base + i as u64)).collect();
        Ok(Page::new(items))
    }
}

fn feed(source: FakeRepos) -> (Arc<FakeRepos>, Feed<Arc<FakeRepos>>) {
    let source = Arc::new(source);
    let feed = Feed::new(Arc::clone(&source), FeedOptions::default());
    (source, feed)
}

fn loaded(page: u32, appended: usize, has_more: bool) -> PageOutcome {
    PageOutcome::Loaded {
        page,
        appended,
        has_more,
    }
}

#[tokio::test]
async fn pages_accumulate_until_a_short_page() {
    let (source, feed) = feed(FakeRepos::default().with_user("alice", 25));

    assert_eq!(feed.load_first_page("alice").await, Ok(loaded(1, 10, true)));
    assert_eq!(feed.len(), 10);
    assert_eq!(
        feed.fetch_state(),
        FetchState {
            is_fetching: false,
            has_more: true,
            current_page: 1,
        }
    );

    assert_eq!(feed.load_next_page().await, Ok(loaded(2, 10, true)));
    assert_eq!(feed.len(), 20);
    assert_eq!(feed.fetch_state().current_page, 2);

    assert_eq!(feed.load_next_page().await, Ok(loaded(3, 5, false)));
    assert_eq!(feed.len(), 25);
    assert!(!feed.fetch_state().has_more);
    assert_eq!(feed.fetch_state().current_page, 3);

    assert_eq!(
        feed.load_next_page().await,
        Ok(PageOutcome::Skipped(SkipReason::Exhausted))
    );
    assert_eq!(feed.len(), 25);
    assert_eq!(source.requests().len(), 3);

    let ids: Vec<u64> = feed.items().iter().map(|r| r.id).collect();
    let expected: Vec<u64> = (1_000..1_025).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn exact_multiple_ends_with_an_empty_page() {
    let (source, feed) = feed(FakeRepos::default().with_user("carol", 20));
    feed.load_first_page("carol").await.unwrap();
    assert_eq!(feed.load_next_page().await, Ok(loaded(2, 10, true)));
    assert_eq!(feed.load_next_page().await, Ok(loaded(3, 0, false)));
    assert_eq!(feed.len(), 20);
    assert_eq!(source.requests().len(), 3);
}

#[tokio::test]
async fn concurrent_next_page_calls_issue_one_request() {
    let (source, feed) = feed(
        FakeRepos::default()
            .with_user("alice", 25)
            .with_delay("alice", 2),
    );
    feed.load_first_page("alice").await.unwrap();

    let (a, b) = tokio::join!(feed.load_next_page(), feed.load_next_page());
    assert_eq!(a, Ok(loaded(2, 10, true)));
    assert_eq!(b, Ok(PageOutcome::Skipped(SkipReason::Fetching)));
    assert_eq!(
        source.requests(),
        vec![("alice".to_owned(), 1), ("alice".to_owned(), 2)]
    );
    assert_eq!(feed.len(), 20);
}

#[tokio::test]
async fn both_triggers_together_issue_one_request() {
    let (source, feed) = feed(
        FakeRepos::default()
            .with_user("alice", 25)
            .with_delay("alice", 2),
    );
    feed.load_first_page("alice").await.unwrap();

    let (a, b) = tokio::join!(
        feed.on_near_end(LoadTrigger::ScrollThreshold),
        feed.on_near_end(LoadTrigger::Sentinel)
    );
    assert_eq!(a, Ok(loaded(2, 10, true)));
    assert_eq!(b, Ok(PageOutcome::Skipped(SkipReason::Fetching)));
    assert_eq!(source.requests().len(), 2);
}

#[tokio::test]
async fn subject_switch_discards_the_stale_first_page() {
    let (source, feed) = feed(
        FakeRepos::default()
            .with_user("alice", 25)
            .with_user("bob", 3)
            .with_delay("alice", 3),
    );

    let (alice, bob) = tokio::join!(feed.load_first_page("alice"), async {
        tokio::task::yield_now().await;
        feed.load_first_page("bob").await
    });

    assert_eq!(alice, Ok(PageOutcome::Stale));
    assert_eq!(bob, Ok(loaded(1, 3, false)));
    assert_eq!(feed.subject().as_deref(), Some("bob"));
    let ids: Vec<u64> = feed.items().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2_000, 2_001, 2_002]);
    assert!(!feed.fetch_state().is_fetching);
    assert_eq!(source.requests().len(), 2);
}

#[tokio::test]
async fn subject_switch_discards_a_stale_next_page() {
    let (_source, feed) = feed(
        FakeRepos::default()
            .with_user("alice", 25)
            .with_user("bob", 12)
            .with_delay("alice", 3),
    );
    feed.load_first_page("alice").await.unwrap();

    let (next, bob) = tokio::join!(feed.load_next_page(), async {
        tokio::task::yield_now().await;
        feed.select_subject("bob").await
    });

    assert_eq!(next, Ok(PageOutcome::Stale));
    assert_eq!(bob, Ok(loaded(1, 10, true)));
    assert_eq!(feed.len(), 10);
    assert!(feed.items().iter().all(|r| (2_000..3_000).contains(&r.id)));
    assert_eq!(feed.fetch_state().current_page, 1);
}

#[tokio::test]
async fn failed_next_page_keeps_items_and_page_state() {
    let (source, feed) = feed(FakeRepos::default().with_user("alice", 25));
    feed.load_first_page("alice").await.unwrap();

    source.fail_next(FetchError::from_status(403, "API rate limit exceeded for 1.2.3.4"));
    let err = feed.load_next_page().await.unwrap_err();
    assert!(matches!(err, FetchError::RateLimited { .. }));

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.len, 10);
    assert_eq!(
        snapshot.fetch,
        FetchState {
            is_fetching: false,
            has_more: true,
            current_page: 1,
        }
    );
    assert_eq!(snapshot.error, Some(err));

    // Manual retry asks for the same page again and clears the error.
    assert_eq!(feed.retry().await, Ok(loaded(2, 10, true)));
    assert_eq!(feed.len(), 20);
    assert_eq!(feed.error(), None);
    assert_eq!(
        source.requests().iter().map(|r| r.1).collect::<Vec<_>>(),
        vec![1, 2, 2]
    );
}

#[tokio::test]
async fn failed_first_page_leaves_an_empty_list() {
    let (source, feed) = feed(FakeRepos::default().with_user("alice", 25));

    let err = feed.load_first_page("ghost").await.unwrap_err();
    assert_eq!(err.status(), 404);
    assert_eq!(err.to_string(), "Not Found");
    assert!(feed.is_empty());
    assert_eq!(feed.snapshot().error, Some(err.clone()));

    // Scrolling cannot page past a first page that never landed.
    assert_eq!(
        feed.load_next_page().await,
        Ok(PageOutcome::Skipped(SkipReason::NotStarted))
    );
    assert_eq!(source.requests().len(), 1);

    // Retry re-requests page 1.
    assert_eq!(feed.retry().await, Err(err));
    assert_eq!(
        source.requests(),
        vec![("ghost".to_owned(), 1), ("ghost".to_owned(), 1)]
    );
}

#[tokio::test]
async fn retry_after_transient_first_page_failure_loads_it() {
    let (source, feed) = feed(FakeRepos::default().with_user("alice", 25));
    source.fail_next(FetchError::network(""));

    let err = feed.load_first_page("alice").await.unwrap_err();
    assert_eq!(err.status(), 0);
    assert!(feed.is_empty());

    assert_eq!(feed.retry().await, Ok(loaded(1, 10, true)));
    assert_eq!(feed.len(), 10);
    assert_eq!(feed.error(), None);
}

#[tokio::test]
async fn selecting_the_current_subject_is_a_no_op() {
    let (source, feed) = feed(FakeRepos::default().with_user("alice", 25));
    feed.select_subject("alice").await.unwrap();
    assert_eq!(
        feed.select_subject("alice").await,
        Ok(PageOutcome::Skipped(SkipReason::SameSubject))
    );
    assert_eq!(source.requests().len(), 1);

    // An explicit first-page load always refetches.
    feed.load_first_page("alice").await.unwrap();
    assert_eq!(source.requests().len(), 2);
    assert_eq!(feed.len(), 10);
}

#[tokio::test]
async fn sentinel_fires_once_until_the_page_settles() {
    let (source, feed) = feed(
        FakeRepos::default()
            .with_user("alice", 25)
            .with_delay("alice", 2),
    );
    feed.load_first_page("alice").await.unwrap();

    let (a, b) = tokio::join!(feed.observe_sentinel(true), feed.observe_sentinel(true));
    assert_eq!(a, Ok(loaded(2, 10, true)));
    assert_eq!(b, Ok(PageOutcome::Skipped(SkipReason::Debounced)));

    // The settled request re-armed the sentinel.
    assert_eq!(feed.observe_sentinel(true).await, Ok(loaded(3, 5, false)));
    assert_eq!(
        feed.observe_sentinel(false).await,
        Ok(PageOutcome::Skipped(SkipReason::OutOfView))
    );
    assert_eq!(source.requests().len(), 3);
}

#[tokio::test]
async fn reset_fetching_rearms_a_latched_sentinel() {
    let (_source, feed) = feed(FakeRepos::default().with_user("alice", 25));

    // No first page yet: the sentinel fires, the pager refuses, the sentinel stays latched.
    assert_eq!(
        feed.observe_sentinel(true).await,
        Ok(PageOutcome::Skipped(SkipReason::NotStarted))
    );
    assert_eq!(
        feed.observe_sentinel(true).await,
        Ok(PageOutcome::Skipped(SkipReason::Debounced))
    );

    feed.reset_fetching();
    assert_eq!(
        feed.observe_sentinel(true).await,
        Ok(PageOutcome::Skipped(SkipReason::NotStarted))
    );
}

#[tokio::test]
async fn window_follows_the_growing_list() {
    let (_source, feed) = feed(FakeRepos::default().with_user("alice", 25));
    let mut window = Window::new(WindowOptions::new(180, 600).with_overscan(3));

    feed.load_first_page("alice").await.unwrap();
    feed.sync_window(&mut window);
    assert_eq!(window.count(), 10);
    assert_eq!(window.total_height(), 1_800);
    assert!(!feed.should_load_more(&window));

    // Bottom edge at 1800 >= 1800 - 100.
    window.apply_scroll_offset(1_200);
    assert!(feed.should_load_more(&window));
    feed.on_near_end(LoadTrigger::ScrollThreshold).await.unwrap();
    feed.sync_window(&mut window);
    assert_eq!(window.count(), 20);
    assert!(!feed.should_load_more(&window));

    let visible = feed.visible_items(&window);
    let expected: Vec<u64> = (1_003..=1_013).collect();
    assert_eq!(visible.iter().map(|r| r.id).collect::<Vec<_>>(), expected);

    window.apply_scroll_offset(window.max_scroll_offset());
    assert!(feed.should_load_more(&window));
    feed.load_next_page().await.unwrap();
    feed.sync_window(&mut window);
    window.apply_scroll_offset(window.max_scroll_offset());
    assert!(window.is_near_end());
    assert!(!feed.should_load_more(&window));
}

#[tokio::test]
async fn clear_discards_in_flight_results() {
    let (_source, feed) = feed(
        FakeRepos::default()
            .with_user("alice", 25)
            .with_delay("alice", 2),
    );
    let (first, ()) = tokio::join!(feed.load_first_page("alice"), async {
        tokio::task::yield_now().await;
        feed.clear();
    });
    assert_eq!(first, Ok(PageOutcome::Stale));
    assert!(feed.is_empty());
    assert_eq!(feed.subject(), None);
}

#[test]
fn pager_guards_next_page_requests() {
    let mut pager = Pager::<Repo>::new(FeedOptions::default());
    assert_eq!(pager.begin_next_page(), Err(SkipReason::NotStarted));

    let first = pager.begin_first_page("alice");
    assert!(first.is_first_page());
    assert_eq!(pager.begin_next_page(), Err(SkipReason::Fetching));
    assert_eq!(pager.begin_retry(), Err(SkipReason::Fetching));

    let items = (0..10).map(repo).collect();
    assert_eq!(pager.complete(first, Ok(items)), Ok(loaded(1, 10, true)));

    let next = pager.begin_next_page().unwrap();
    assert_eq!(next.page(), 2);
    assert_eq!(next.subject(), "alice");
    assert_eq!(pager.begin_next_page(), Err(SkipReason::Fetching));
}

#[test]
fn pager_drops_items_it_already_holds() {
    let mut pager = Pager::<Repo>::new(FeedOptions::default());
    let first = pager.begin_first_page("alice");
    pager.complete(first, Ok((1..=10).map(repo).collect())).unwrap();

    let next = pager.begin_next_page().unwrap();
    let outcome = pager.complete(next, Ok((8..=17).map(repo).collect()));
    // A full page still means more may follow, even if some rows were duplicates.
    assert_eq!(outcome, Ok(loaded(2, 7, true)));
    assert_eq!(pager.len(), 17);
    let ids: Vec<u64> = pager.items().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=17).collect::<Vec<_>>());
}

#[test]
fn stale_ticket_does_not_touch_the_new_session() {
    let mut pager = Pager::<Repo>::new(FeedOptions::default().with_page_size(2));
    let old = pager.begin_first_page("alice");
    let new = pager.begin_first_page("bob");
    assert!(!pager.is_current(&old));
    assert!(pager.is_current(&new));

    assert_eq!(pager.complete(old, Ok(vec![repo(1), repo(2)])), Ok(PageOutcome::Stale));
    assert!(pager.is_empty());
    assert!(pager.fetch_state().is_fetching);

    let err = FetchError::from_status(500, "");
    assert_eq!(pager.complete(new, Err(err.clone())), Err(err));
    assert!(!pager.fetch_state().is_fetching);
}

#[test]
fn refetching_the_first_page_replaces_the_list() {
    let mut pager = Pager::<Repo>::new(FeedOptions::default().with_page_size(2));
    let t = pager.begin_first_page("alice");
    pager.complete(t, Ok(vec![repo(1), repo(2)])).unwrap();
    let t = pager.begin_next_page().unwrap();
    pager.complete(t, Ok(vec![repo(3)])).unwrap();
    assert_eq!(pager.len(), 3);
    assert_eq!(pager.begin_next_page(), Err(SkipReason::Exhausted));

    let t = pager.begin_first_page("alice");
    assert!(pager.is_empty());
    assert!(pager.fetch_state().has_more);
    pager.complete(t, Ok(vec![repo(2), repo(1)])).unwrap();
    assert_eq!(
        pager.items().iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![2, 1]
    );
}

#[test]
fn page_size_is_floored_at_one() {
    assert_eq!(FeedOptions::default().page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(FeedOptions::default().with_page_size(0).page_size, 1);
    let pager = Pager::<Repo>::new(FeedOptions { page_size: 0 });
    assert_eq!(pager.page_size(), 1);
}

#[test]
fn sentinel_trigger_latches() {
    let mut s = SentinelTrigger::new();
    assert!(!s.observe(false));
    assert!(s.observe(true));
    assert!(s.is_latched());
    assert!(!s.observe(true));
    assert!(!s.fire());
    s.reset();
    assert!(s.fire());
}

#[test]
fn status_codes_map_to_error_kinds() {
    assert!(matches!(
        FetchError::from_status(0, ""),
        FetchError::Network { .. }
    ));
    assert!(matches!(
        FetchError::from_status(404, "Not Found"),
        FetchError::NotFound { .. }
    ));
    assert!(matches!(
        FetchError::from_status(403, "API rate limit exceeded"),
        FetchError::RateLimited { .. }
    ));
    assert!(matches!(
        FetchError::from_status(403, "Forbidden"),
        FetchError::Upstream { status: 403, .. }
    ));
    assert!(matches!(
        FetchError::from_status(422, "Validation Failed"),
        FetchError::ValidationFailed { .. }
    ));
    assert!(matches!(
        FetchError::from_status(502, "Bad Gateway"),
        FetchError::Upstream { status: 502, .. }
    ));
    assert!(matches!(
        FetchError::from_status(200, ""),
        FetchError::Unknown { .. }
    ));

    for status in [0u16, 403, 404, 422, 502] {
        let message = if status == 403 { "rate limit" } else { "x" };
        assert_eq!(FetchError::from_status(status, message).status(), status);
    }
    assert_eq!(FetchError::unknown("boom").status(), 500);
}

#[test]
fn empty_messages_get_defaults() {
    assert_eq!(
        FetchError::from_status(0, "").to_string(),
        "Network error or CORS issue. Please try again later."
    );
    assert_eq!(
        FetchError::from_status(403, "API rate limit exceeded for 10.0.0.1").message(),
        "GitHub rate limit exceeded. Please try again later."
    );
    assert_eq!(
        FetchError::from_status(404, "").message(),
        "Resource not found"
    );
    assert_eq!(
        FetchError::from_status(422, " ").message(),
        "Validation failed"
    );
    assert_eq!(
        FetchError::from_status(503, "").message(),
        "GitHub API error: 503"
    );
    assert_eq!(FetchError::unknown("").message(), "Request failed");
}

#[test]
fn response_bodies_supply_the_message() {
    let err = FetchError::from_response(422, r#"{"message":"Validation Failed","errors":[]}"#);
    assert_eq!(err.message(), "Validation Failed");

    let err = FetchError::from_response(404, "<html>not json</html>");
    assert_eq!(err.message(), "Resource not found");

    let err = FetchError::from_response(500, r#"{"message": 42}"#);
    assert_eq!(err.message(), "GitHub API error: 500");
}

#[test]
fn history_keeps_recent_unique_terms() {
    let mut history = SearchHistory::load(MemoryStore::new());
    assert!(history.entries().is_empty());

    for term in ["alice", "bob", " alice ", "carol", "dave", "erin", "frank"] {
        assert!(history.record(term).unwrap());
    }
    assert_eq!(history.entries(), ["frank", "erin", "dave", "carol", "alice"]);

    assert!(!history.record("   ").unwrap());
    assert_eq!(history.entries().len(), DEFAULT_HISTORY_LIMIT);
}

#[test]
fn history_persists_through_the_store() {
    let mut history = SearchHistory::load(MemoryStore::new()).with_limit(2);
    history.record("alice").unwrap();
    history.record("bob").unwrap();
    history.record("carol").unwrap();

    let store = history.into_store();
    assert_eq!(
        store.get(HISTORY_KEY).as_deref(),
        Some(r#"["carol","bob"]"#)
    );

    let reloaded = SearchHistory::load(store);
    assert_eq!(reloaded.entries(), ["carol", "bob"]);
}

#[test]
fn unreadable_history_starts_empty() {
    let mut store = MemoryStore::new();
    store.set(HISTORY_KEY, "{not json".to_owned()).unwrap();
    let history = SearchHistory::load(store);
    assert!(history.entries().is_empty());
}

struct FullStore;

impl KeyValueStore for FullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: String) -> Result<(), StoreError> {
        Err(StoreError::Backend("quota exceeded".to_owned()))
    }
}

#[test]
fn store_failures_leave_history_unchanged() {
    let mut history = SearchHistory::load(FullStore);
    let err = history.record("alice").unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
    assert!(history.entries().is_empty());
}
