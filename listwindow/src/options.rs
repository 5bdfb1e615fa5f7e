use alloc::sync::Arc;

use crate::window::Window;

/// A callback fired when the window state changes (count, geometry or scroll offset).
pub type OnChangeCallback = Arc<dyn Fn(&Window) + Send + Sync>;

/// A callback fired after a user scroll event leaves the viewport near the end of the content.
///
/// It fires on every such event, not only on the first crossing; consumers are expected to
/// guard against duplicate work (an in-flight page request, for example).
pub type NearEndCallback = Arc<dyn Fn(&Window) + Send + Sync>;

/// Default number of rows rendered beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Default distance from the end of the content at which the near-end signal is raised.
pub const DEFAULT_NEAR_END_MARGIN: u32 = 100;

/// Derives a container height from an outer viewport height minus fixed chrome.
///
/// The result never drops below one row, so a small window cannot produce a zero or negative
/// container.
pub fn fit_container_height(viewport_height: u32, reserved: u32, item_height: u32) -> u32 {
    viewport_height
        .saturating_sub(reserved)
        .max(item_height.max(1))
}

/// Configuration for [`crate::Window`].
///
/// Cheap to clone: callbacks are stored in `Arc`s so adapters can tweak a field and call
/// `Window::set_options` without reallocating closures.
pub struct WindowOptions {
    pub count: usize,
    /// Fixed row height in the scroll axis.
    pub item_height: u32,
    /// Height of the scroll container.
    pub container_height: u32,
    pub overscan: usize,
    /// How close (in pixels) to the end of the content counts as "near the end".
    pub near_end_margin: u32,
    pub initial_offset: u64,
    pub on_change: Option<OnChangeCallback>,
    pub on_near_end: Option<NearEndCallback>,
}

impl Clone for WindowOptions {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            item_height: self.item_height,
            container_height: self.container_height,
            overscan: self.overscan,
            near_end_margin: self.near_end_margin,
            initial_offset: self.initial_offset,
            on_change: self.on_change.clone(),
            on_near_end: self.on_near_end.clone(),
        }
    }
}

impl WindowOptions {
    /// Creates options for an empty list with the given row and container heights.
    pub fn new(item_height: u32, container_height: u32) -> Self {
        Self {
            count: 0,
            item_height,
            container_height,
            overscan: DEFAULT_OVERSCAN,
            near_end_margin: DEFAULT_NEAR_END_MARGIN,
            initial_offset: 0,
            on_change: None,
            on_near_end: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_near_end_margin(mut self, margin: u32) -> Self {
        self.near_end_margin = margin;
        self
    }

    pub fn with_initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = offset;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&Window) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_near_end(
        mut self,
        on_near_end: Option<impl Fn(&Window) + Send + Sync + 'static>,
    ) -> Self {
        self.on_near_end = on_near_end.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for WindowOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("count", &self.count)
            .field("item_height", &self.item_height)
            .field("container_height", &self.container_height)
            .field("overscan", &self.overscan)
            .field("near_end_margin", &self.near_end_margin)
            .field("initial_offset", &self.initial_offset)
            .finish_non_exhaustive()
    }
}
