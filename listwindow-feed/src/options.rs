/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Configuration for [`crate::Feed`] and [`crate::Pager`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeedOptions {
    /// Items per page. A page shorter than this marks the end of the list.
    pub page_size: u32,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedOptions {
    /// Sets the page size, floored at 1.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}
