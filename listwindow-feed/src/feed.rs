use listwindow::Window;
use parking_lot::Mutex;

use crate::{
    FeedOptions, FeedSnapshot, FetchError, FetchState, LoadTrigger, PageOutcome, PageSource,
    PageTicket, Pager, SentinelTrigger, SkipReason,
};

/// Drives a [`Pager`] against an async [`PageSource`].
///
/// All entry points take `&self`, so a UI event loop can hold one feed and fire loads from scroll
/// handlers without coordinating ownership. The pager lock is only taken between awaits, never
/// across one; two loads polled concurrently on the same loop therefore see each other's
/// in-flight flag, and the second one is skipped instead of issuing a duplicate request.
pub struct Feed<S: PageSource> {
    source: S,
    pager: Mutex<Pager<S::Item>>,
    sentinel: Mutex<SentinelTrigger>,
}

impl<S: PageSource> Feed<S> {
    pub fn new(source: S, options: FeedOptions) -> Self {
        Self {
            source,
            pager: Mutex::new(Pager::new(options)),
            sentinel: Mutex::new(SentinelTrigger::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_size(&self) -> u32 {
        self.pager.lock().page_size()
    }

    /// Resets the list for `subject` and loads its first page.
    ///
    /// A failure leaves the list empty and is returned (and kept in [`Feed::snapshot`]); there is
    /// no automatic retry.
    pub async fn load_first_page(&self, subject: &str) -> Result<PageOutcome, FetchError> {
        let ticket = self.pager.lock().begin_first_page(subject);
        self.run(ticket).await
    }

    /// Loads the next page, unless one is in flight or the list is exhausted.
    ///
    /// Skips return immediately with [`PageOutcome::Skipped`] and touch no state.
    pub async fn load_next_page(&self) -> Result<PageOutcome, FetchError> {
        let ticket = match self.pager.lock().begin_next_page() {
            Ok(ticket) => ticket,
            Err(reason) => {
                vtrace!(?reason, "next page skipped");
                return Ok(PageOutcome::Skipped(reason));
            }
        };
        self.run(ticket).await
    }

    /// Switches to `subject`, loading its first page. Selecting the current subject is a no-op.
    pub async fn select_subject(&self, subject: &str) -> Result<PageOutcome, FetchError> {
        let same = self.pager.lock().subject() == Some(subject);
        if same {
            return Ok(PageOutcome::Skipped(SkipReason::SameSubject));
        }
        self.load_first_page(subject).await
    }

    /// Re-requests the page that failed last (the first page if nothing has loaded yet).
    pub async fn retry(&self) -> Result<PageOutcome, FetchError> {
        let ticket = match self.pager.lock().begin_retry() {
            Ok(ticket) => ticket,
            Err(reason) => return Ok(PageOutcome::Skipped(reason)),
        };
        self.run(ticket).await
    }

    /// Handles an "approaching the end" event from either source.
    ///
    /// Sentinel events are debounced: the sentinel fires once and stays latched until the next
    /// page request settles (or [`Feed::reset_fetching`] is called).
    pub async fn on_near_end(&self, trigger: LoadTrigger) -> Result<PageOutcome, FetchError> {
        if trigger == LoadTrigger::Sentinel && !self.sentinel.lock().fire() {
            return Ok(PageOutcome::Skipped(SkipReason::Debounced));
        }
        self.load_next_page().await
    }

    /// Feeds an intersection update for the end-of-list sentinel.
    pub async fn observe_sentinel(
        &self,
        is_intersecting: bool,
    ) -> Result<PageOutcome, FetchError> {
        if !is_intersecting {
            return Ok(PageOutcome::Skipped(SkipReason::OutOfView));
        }
        self.on_near_end(LoadTrigger::Sentinel).await
    }

    /// Re-arms the end-of-list sentinel.
    ///
    /// The pager's own in-flight flag is not affected: it clears only when its request settles,
    /// which keeps page requests strictly serialized.
    pub fn reset_fetching(&self) {
        self.sentinel.lock().reset();
    }

    /// Whether a scroll at the window's current offset should ask for the next page.
    pub fn should_load_more(&self, window: &Window) -> bool {
        if !window.is_near_end() {
            return false;
        }
        let pager = self.pager.lock();
        let fetch = pager.fetch_state();
        pager.has_loaded_first_page() && !fetch.is_fetching && fetch.has_more
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.pager.lock().snapshot()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.pager.lock().fetch_state()
    }

    pub fn error(&self) -> Option<FetchError> {
        self.pager.lock().error().cloned()
    }

    pub fn subject(&self) -> Option<String> {
        self.pager.lock().subject().map(str::to_owned)
    }

    pub fn len(&self) -> usize {
        self.pager.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pager.lock().is_empty()
    }

    /// Borrows the accumulated items for the duration of `f`.
    ///
    /// `f` must not call back into the feed.
    pub fn with_items<R>(&self, f: impl FnOnce(&[S::Item]) -> R) -> R {
        f(self.pager.lock().items())
    }

    pub fn items(&self) -> Vec<S::Item>
    where
        S::Item: Clone,
    {
        self.with_items(|items| items.to_vec())
    }

    /// Clones the rows `window` would draw at its current scroll offset.
    pub fn visible_items(&self, window: &Window) -> Vec<S::Item>
    where
        S::Item: Clone,
    {
        self.with_items(|items| window.visible_slice(items).to_vec())
    }

    /// Points `window` at the current list length so it recomputes against the new list.
    pub fn sync_window(&self, window: &mut Window) {
        window.set_count(self.len());
    }

    /// Drops the subject and all items; in-flight results will be discarded.
    pub fn clear(&self) {
        self.pager.lock().clear();
        self.sentinel.lock().reset();
    }

    async fn run(&self, ticket: PageTicket) -> Result<PageOutcome, FetchError> {
        vdebug!(
            subject = ticket.subject(),
            page = ticket.page(),
            "requesting page"
        );
        let page_size = self.page_size();
        let result = self
            .source
            .fetch_page(ticket.subject(), ticket.page(), page_size)
            .await
            .map(|page| page.items);

        let outcome = self.pager.lock().complete(ticket, result);
        self.sentinel.lock().reset();
        outcome
    }
}
