/// Where an "approaching the end of loaded content" event came from.
///
/// Both sources lead to the same `load_next_page` call; the pager's in-flight guard collapses
/// them into at most one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadTrigger {
    /// The window reported `scroll_offset + container_height >= total_height - margin`.
    ScrollThreshold,
    /// A sentinel placed after the last row entered the viewport.
    Sentinel,
}

/// Debounces an end-of-list sentinel.
///
/// Intersection observers can report the same entry several times while the sentinel stays in
/// view. The trigger fires once and then stays latched until [`SentinelTrigger::reset`], which
/// the feed calls whenever a page request settles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SentinelTrigger {
    latched: bool,
}

impl SentinelTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Feeds an intersection update. Returns `true` when a load should start.
    pub fn observe(&mut self, is_intersecting: bool) -> bool {
        is_intersecting && self.fire()
    }

    /// Fires unless already latched.
    pub fn fire(&mut self) -> bool {
        if self.latched {
            return false;
        }
        self.latched = true;
        true
    }

    pub fn reset(&mut self) {
        self.latched = false;
    }
}
