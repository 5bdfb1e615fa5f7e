use core::cell::Cell;
use core::cmp;

use crate::{ScrollDirection, Viewport, VirtualRow, VisibleWindow, WindowOptions};
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Maps a list length and a viewport to the rows that must be drawn.
///
/// This is the pure core of the engine: O(1) in the list length, no allocation, no state.
///
/// ```
/// use listwindow::{Viewport, compute_window};
///
/// let viewport = Viewport {
///     scroll_offset: 900,
///     container_height: 600,
///     item_height: 180,
///     overscan: 3,
/// };
/// let w = compute_window(25, &viewport);
/// assert_eq!((w.start_index, w.end_index), (2, 12));
/// assert_eq!(w.offset_y, 360);
/// assert_eq!(w.total_height, 4500);
/// ```
pub fn compute_window(count: usize, viewport: &Viewport) -> VisibleWindow {
    let item = viewport.effective_item_height() as u64;
    if count == 0 {
        return VisibleWindow::default();
    }

    let last = count - 1;
    let first_visible = usize::try_from(viewport.scroll_offset / item).unwrap_or(usize::MAX);
    // Clamp so an offset past the end (e.g. after the list shrank) still yields a valid range.
    let start_index = first_visible.saturating_sub(viewport.overscan).min(last);
    let span = viewport
        .visible_count()
        .saturating_add(viewport.overscan.saturating_mul(2));
    let end_index = start_index.saturating_add(span).min(last);

    VisibleWindow {
        start_index,
        end_index,
        offset_y: start_index as u64 * item,
        total_height: (count as u64).saturating_mul(item),
        count,
    }
}

/// A headless, fixed-row-height windowing engine.
///
/// The window holds no items and no UI objects. Your adapter drives it with the list length,
/// the container geometry and scroll offsets, and asks it which slice of the list to draw.
/// Everything it reports is derived on demand from those inputs.
#[derive(Clone, Debug)]
pub struct Window {
    options: WindowOptions,
    scroll_offset: u64,
    scroll_direction: Option<ScrollDirection>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl Window {
    pub fn new(options: WindowOptions) -> Self {
        vdebug!(
            count = options.count,
            item_height = options.item_height,
            container_height = options.container_height,
            overscan = options.overscan,
            "Window::new"
        );
        Self {
            scroll_offset: options.initial_offset,
            options,
            scroll_direction: None,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: WindowOptions) {
        self.options = options;
        vtrace!(
            count = self.options.count,
            item_height = self.options.item_height,
            container_height = self.options.container_height,
            "Window::set_options"
        );
        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut WindowOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(&mut self, on_change: Option<impl Fn(&Window) + Send + Sync + 'static>) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    pub fn set_on_near_end(
        &mut self,
        on_near_end: Option<impl Fn(&Window) + Send + Sync + 'static>,
    ) {
        self.options.on_near_end = on_near_end.map(|f| Arc::new(f) as _);
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// On a typical frame an adapter may update the container height, the list length and the
    /// scroll offset together; batching keeps a rendering `on_change` from running three times.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        vtrace!(prev = self.options.count, count, "Window::set_count");
        self.options.count = count;
        self.notify();
    }

    pub fn item_height(&self) -> u32 {
        self.viewport().effective_item_height()
    }

    pub fn set_item_height(&mut self, item_height: u32) {
        if self.options.item_height == item_height {
            return;
        }
        self.options.item_height = item_height;
        self.notify();
    }

    /// Effective container height (never less than one row).
    pub fn container_height(&self) -> u32 {
        self.viewport().effective_container_height()
    }

    pub fn set_container_height(&mut self, container_height: u32) {
        if self.options.container_height == container_height {
            return;
        }
        self.options.container_height = container_height;
        self.notify();
    }

    pub fn overscan(&self) -> usize {
        self.options.overscan
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        if self.options.overscan == overscan {
            return;
        }
        self.options.overscan = overscan;
        self.notify();
    }

    pub fn near_end_margin(&self) -> u32 {
        self.options.near_end_margin
    }

    pub fn set_near_end_margin(&mut self, margin: u32) {
        self.options.near_end_margin = margin;
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        let prev = self.scroll_offset;
        self.scroll_offset = offset;
        self.scroll_direction = match offset.cmp(&prev) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    /// Applies a scroll offset reported by the UI (wheel, drag, scrollbar).
    ///
    /// After the offset is recorded, `on_near_end` fires if the viewport is now within
    /// `near_end_margin` of the end of the content.
    pub fn apply_scroll_offset(&mut self, offset: u64) {
        vtrace!(offset, "apply_scroll_offset");
        self.batch_update(|w| w.set_scroll_offset(offset));
        if self.is_near_end() {
            if let Some(cb) = &self.options.on_near_end {
                vtrace!(
                    offset,
                    total_height = self.total_height(),
                    "near end of content"
                );
                cb(self);
            }
        }
    }

    /// Returns a snapshot of the current viewport state.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            scroll_offset: self.scroll_offset,
            container_height: self.options.container_height,
            item_height: self.options.item_height,
            overscan: self.options.overscan,
        }
    }

    /// Restores geometry and scroll position from a previously captured snapshot.
    pub fn restore_viewport(&mut self, viewport: Viewport) {
        self.batch_update(|w| {
            w.set_item_height(viewport.item_height);
            w.set_container_height(viewport.container_height);
            w.set_overscan(viewport.overscan);
            w.set_scroll_offset(viewport.scroll_offset);
        });
    }

    /// Number of rows that fit in the container (a partially visible row counts).
    pub fn visible_count(&self) -> usize {
        self.viewport().visible_count()
    }

    pub fn total_height(&self) -> u64 {
        (self.options.count as u64).saturating_mul(self.item_height() as u64)
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_height()
            .saturating_sub(self.container_height() as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    pub fn visible_window(&self) -> VisibleWindow {
        compute_window(self.options.count, &self.viewport())
    }

    pub fn visible_window_for(&self, scroll_offset: u64) -> VisibleWindow {
        let viewport = Viewport {
            scroll_offset,
            ..self.viewport()
        };
        compute_window(self.options.count, &viewport)
    }

    /// Borrows the rows of `items` that must be drawn at the current scroll offset.
    ///
    /// The window is computed against `items.len()`, so a stale `count` can never index out of
    /// bounds.
    pub fn visible_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let window = compute_window(items.len(), &self.viewport());
        &items[window.range()]
    }

    pub fn for_each_visible_row(&self, mut f: impl FnMut(VirtualRow)) {
        let window = self.visible_window();
        let size = self.item_height();
        let mut start = window.offset_y;
        for index in window.range() {
            f(VirtualRow { index, start, size });
            start = start.saturating_add(size as u64);
        }
    }

    /// Collects the drawn rows into `out` (clears `out` first).
    pub fn collect_visible_rows(&self, out: &mut Vec<VirtualRow>) {
        out.clear();
        self.for_each_visible_row(|row| out.push(row));
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let count = self.options.count;
        if count == 0 {
            return None;
        }
        let index = usize::try_from(offset / self.item_height() as u64).unwrap_or(usize::MAX);
        Some(index.min(count - 1))
    }

    /// Scroll offset that puts row `index` at the top of the container (clamped).
    pub fn scroll_to_index_offset(&self, index: usize) -> u64 {
        if self.options.count == 0 {
            return 0;
        }
        let index = index.min(self.options.count - 1);
        self.clamp_scroll_offset(index as u64 * self.item_height() as u64)
    }

    pub fn is_near_end(&self) -> bool {
        self.is_near_end_for(self.scroll_offset)
    }

    /// Whether `scroll_offset + container_height >= total_height - near_end_margin`.
    ///
    /// An empty list is never near its end: there is nothing loaded to page beyond.
    pub fn is_near_end_for(&self, scroll_offset: u64) -> bool {
        if self.options.count == 0 {
            return false;
        }
        let bottom = scroll_offset.saturating_add(self.container_height() as u64);
        let threshold = self
            .total_height()
            .saturating_sub(self.options.near_end_margin as u64);
        bottom >= threshold
    }
}
