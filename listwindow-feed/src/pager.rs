use std::collections::HashSet;

use crate::{FeedOptions, FetchError, Identified};

/// Pagination progress for the current subject.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchState {
    /// A page request for the current subject is outstanding.
    pub is_fetching: bool,
    /// The last page came back full, so another page may exist.
    pub has_more: bool,
    /// The last page that landed (1-based).
    pub current_page: u32,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            is_fetching: false,
            has_more: true,
            current_page: 1,
        }
    }
}

/// Why a load request did not issue a page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// A page request is already in flight.
    Fetching,
    /// The last page was short; there is nothing more to load.
    Exhausted,
    /// No first page has landed for the current subject (or there is no subject).
    NotStarted,
    /// The requested subject is already the current one.
    SameSubject,
    /// The end-of-list sentinel already fired and has not been reset.
    Debounced,
    /// The end-of-list sentinel is not in view.
    OutOfView,
}

/// What happened to a load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page landed. `appended` excludes items whose id was already loaded.
    Loaded {
        page: u32,
        appended: usize,
        has_more: bool,
    },
    Skipped(SkipReason),
    /// The page resolved after the subject changed (or the first page was refetched) and was
    /// discarded.
    Stale,
}

/// An outstanding page request, issued by [`Pager`] and handed back to [`Pager::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageTicket {
    subject: String,
    generation: u64,
    page: u32,
}

impl PageTicket {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }
}

/// A point-in-time view of the pager for the rendering layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub subject: Option<String>,
    pub len: usize,
    pub fetch: FetchState,
    pub error: Option<FetchError>,
}

/// The headless pagination state machine.
///
/// `Pager` does no I/O. It hands out [`PageTicket`]s for the pages that should be requested and
/// applies results passed back to [`Pager::complete`]. That split lets any event loop drive it;
/// [`crate::Feed`] is the async driver.
///
/// Fetch state moves `Idle(has_more) -> Fetching -> Idle(has_more')`. `Fetching` is entered from
/// `Idle(has_more = true)` only, so at most one page request is ever outstanding per subject.
/// Each [`Pager::begin_first_page`] starts a new session; results for tickets from an earlier
/// session are discarded.
#[derive(Clone, Debug)]
pub struct Pager<T: Identified> {
    page_size: u32,
    subject: Option<String>,
    generation: u64,
    items: Vec<T>,
    ids: HashSet<T::Id>,
    fetch: FetchState,
    first_page_loaded: bool,
    error: Option<FetchError>,
}

impl<T: Identified> Pager<T> {
    pub fn new(options: FeedOptions) -> Self {
        Self {
            page_size: options.page_size.max(1),
            subject: None,
            generation: 0,
            items: Vec::new(),
            ids: HashSet::new(),
            fetch: FetchState::default(),
            first_page_loaded: false,
            error: None,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn has_loaded_first_page(&self) -> bool {
        self.first_page_loaded
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            subject: self.subject.clone(),
            len: self.items.len(),
            fetch: self.fetch,
            error: self.error.clone(),
        }
    }

    /// Starts a new session for `subject` and returns the ticket for its first page.
    ///
    /// The list is emptied immediately. Any ticket issued before this call becomes stale.
    pub fn begin_first_page(&mut self, subject: &str) -> PageTicket {
        self.generation = self.generation.wrapping_add(1);
        self.subject = Some(subject.to_owned());
        self.items.clear();
        self.ids.clear();
        self.first_page_loaded = false;
        self.error = None;
        self.fetch = FetchState {
            is_fetching: true,
            has_more: true,
            current_page: 1,
        };
        vdebug!(subject, generation = self.generation, "begin first page");
        PageTicket {
            subject: subject.to_owned(),
            generation: self.generation,
            page: 1,
        }
    }

    /// Returns the ticket for the next page, or why none should be requested.
    ///
    /// This is the idempotent guard: while a request is in flight, or once the list is
    /// exhausted, it refuses without changing any state.
    pub fn begin_next_page(&mut self) -> Result<PageTicket, SkipReason> {
        if self.fetch.is_fetching {
            return Err(SkipReason::Fetching);
        }
        if !self.fetch.has_more {
            return Err(SkipReason::Exhausted);
        }
        let Some(subject) = self.subject.clone() else {
            return Err(SkipReason::NotStarted);
        };
        if !self.first_page_loaded {
            return Err(SkipReason::NotStarted);
        }

        self.fetch.is_fetching = true;
        let page = self.fetch.current_page.saturating_add(1);
        vdebug!(subject = subject.as_str(), page, "begin next page");
        Ok(PageTicket {
            subject,
            generation: self.generation,
            page,
        })
    }

    /// Re-issues whichever page failed last: the first page if none has landed yet, otherwise
    /// the next page.
    pub fn begin_retry(&mut self) -> Result<PageTicket, SkipReason> {
        if self.fetch.is_fetching {
            return Err(SkipReason::Fetching);
        }
        if self.first_page_loaded {
            return self.begin_next_page();
        }
        match self.subject.clone() {
            Some(subject) => Ok(self.begin_first_page(&subject)),
            None => Err(SkipReason::NotStarted),
        }
    }

    /// Whether results for `ticket` would still be applied.
    pub fn is_current(&self, ticket: &PageTicket) -> bool {
        ticket.generation == self.generation && self.subject.as_deref() == Some(ticket.subject())
    }

    /// Applies the result of a page request.
    ///
    /// On success the page replaces (first page) or extends the list, skipping ids that are
    /// already present. On failure the page state is left as it was, loaded items are kept, and
    /// the error is recorded and returned. Either way the pager is idle again, unless the ticket
    /// is stale, in which case nothing changes.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<T>, FetchError>,
    ) -> Result<PageOutcome, FetchError> {
        if !self.is_current(&ticket) {
            vdebug!(
                subject = ticket.subject(),
                page = ticket.page,
                "discarding stale page"
            );
            return Ok(PageOutcome::Stale);
        }

        self.fetch.is_fetching = false;

        let items = match result {
            Ok(items) => items,
            Err(err) => {
                vwarn!(
                    subject = ticket.subject(),
                    page = ticket.page,
                    status = err.status(),
                    error = %err,
                    "page request failed"
                );
                self.error = Some(err.clone());
                return Err(err);
            }
        };

        let received = items.len();
        if ticket.is_first_page() {
            self.items.clear();
            self.ids.clear();
        }
        let before = self.items.len();
        self.items.reserve(received);
        for item in items {
            let id = item.id();
            if self.ids.contains(&id) {
                vwarn!(?id, page = ticket.page, "dropping duplicate item");
                continue;
            }
            self.ids.insert(id);
            self.items.push(item);
        }
        let appended = self.items.len() - before;

        self.fetch.current_page = ticket.page;
        self.fetch.has_more = received >= self.page_size as usize;
        self.first_page_loaded = true;
        self.error = None;

        vdebug!(
            subject = ticket.subject(),
            page = ticket.page,
            received,
            appended,
            has_more = self.fetch.has_more,
            "page applied"
        );
        Ok(PageOutcome::Loaded {
            page: ticket.page,
            appended,
            has_more: self.fetch.has_more,
        })
    }

    /// Drops the subject and all loaded items. Outstanding tickets become stale.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.subject = None;
        self.items.clear();
        self.ids.clear();
        self.first_page_loaded = false;
        self.error = None;
        self.fetch = FetchState::default();
    }
}
