use core::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// A serializable snapshot of the viewport geometry and scroll position.
///
/// `container_height` and `item_height` are expected to be non-zero; the window math floors
/// `item_height` at 1 and `container_height` at one item height, so a zero never propagates.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub scroll_offset: u64,
    pub container_height: u32,
    pub item_height: u32,
    pub overscan: usize,
}

impl Viewport {
    /// Row height with the lower bound applied.
    pub fn effective_item_height(&self) -> u32 {
        self.item_height.max(1)
    }

    /// Container height with the lower bound (one row) applied.
    pub fn effective_container_height(&self) -> u32 {
        self.container_height.max(self.effective_item_height())
    }

    /// Number of rows that fit in the container, rounding a partially visible row up.
    pub fn visible_count(&self) -> usize {
        let item = self.effective_item_height();
        self.effective_container_height().div_ceil(item) as usize
    }
}

/// The contiguous, overscanned range of rows to draw for a given viewport.
///
/// `end_index` is inclusive. When `count == 0` the window is empty and neither index may be
/// dereferenced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleWindow {
    pub start_index: usize,
    pub end_index: usize,
    /// Pixel offset at which the first drawn row starts (`start_index * item_height`).
    pub offset_y: u64,
    /// Height of the whole scrollable content (`count * item_height`).
    pub total_height: u64,
    pub count: usize,
}

impl VisibleWindow {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end_index - self.start_index + 1
        }
    }

    /// Index range of the drawn rows, suitable for slicing.
    pub fn range(&self) -> Range<usize> {
        if self.is_empty() {
            0..0
        } else {
            self.start_index..self.end_index + 1
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// A single drawn row: its list index and where it sits in the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRow {
    pub index: usize,
    pub start: u64,
    pub size: u32,
}

impl VirtualRow {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}
