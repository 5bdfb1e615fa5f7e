//! Scroll-position sources and scoped listener subscriptions.
//!
//! A UI layer owns the real scroll container and reports offsets through a [`ScrollSource`].
//! Windows subscribe to it with [`bind_scroll`]; the returned [`ScrollSubscription`] removes the
//! listener when dropped, so tearing down a view (or switching to another subject) never leaves
//! stale listeners behind.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::Window;

/// Receives scroll offsets. Listeners must be passive: record the offset and return.
pub type ScrollListener = Rc<dyn Fn(u64)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Something that emits the scroll offset of a container.
pub trait ScrollSource {
    fn subscribe(&self, listener: ScrollListener) -> ListenerId;

    /// Returns `false` if `id` was not subscribed.
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

/// Unsubscribes its listener from the source when dropped.
#[must_use = "dropping the subscription immediately unsubscribes the listener"]
pub struct ScrollSubscription<'s, S: ScrollSource + ?Sized> {
    source: &'s S,
    id: Option<ListenerId>,
}

impl<'s, S: ScrollSource + ?Sized> ScrollSubscription<'s, S> {
    pub fn new(source: &'s S, listener: ScrollListener) -> Self {
        let id = source.subscribe(listener);
        Self {
            source,
            id: Some(id),
        }
    }

    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    /// Unsubscribes now instead of at drop time.
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.source.unsubscribe(id);
        }
    }
}

impl<S: ScrollSource + ?Sized> Drop for ScrollSubscription<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: ScrollSource + ?Sized> fmt::Debug for ScrollSubscription<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A single-threaded, in-process [`ScrollSource`].
///
/// Adapters call [`ScrollEmitter::emit`] from their scroll event handler.
#[derive(Default)]
pub struct ScrollEmitter {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, ScrollListener)>>,
}

impl ScrollEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers `offset` to every listener subscribed at the time of the call.
    ///
    /// Listeners may subscribe or unsubscribe while being notified.
    pub fn emit(&self, offset: u64) {
        let snapshot: Vec<ScrollListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(offset);
        }
    }
}

impl ScrollSource for ScrollEmitter {
    fn subscribe(&self, listener: ScrollListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));
        self.listeners.borrow_mut().push((id, listener));
        vtrace!(id = id.0, "scroll listener subscribed");
        id
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        vtrace!(id = id.0, "scroll listener unsubscribed");
        listeners.len() != before
    }
}

impl fmt::Debug for ScrollEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Subscribes `window` to `source`: each emitted offset is applied as a user scroll event.
///
/// The listener holds only a weak reference, so dropping the window also silences it.
pub fn bind_scroll<'s, S: ScrollSource + ?Sized>(
    window: &Rc<RefCell<Window>>,
    source: &'s S,
) -> ScrollSubscription<'s, S> {
    let weak: Weak<RefCell<Window>> = Rc::downgrade(window);
    ScrollSubscription::new(
        source,
        Rc::new(move |offset| {
            if let Some(window) = weak.upgrade() {
                window.borrow_mut().apply_scroll_offset(offset);
            }
        }),
    )
}
