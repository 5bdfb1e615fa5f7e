//! A headless windowing engine for fixed-height lists.
//!
//! For incremental page loading on top of the window (infinite scroll), see the
//! `listwindow-feed` crate.
//!
//! Given a list length, a row height, a container height, an overscan and the current scroll
//! offset, the engine computes which contiguous rows must be drawn and where: an O(1) mapping,
//! independent of the list length. It also raises a "near end" signal when the viewport
//! approaches the end of the loaded content.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - the container height
//! - scroll offsets (directly, or through a [`ScrollSource`])
//! - the list length (or the list itself, via [`Window::visible_slice`])
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod options;
mod scroll;
mod types;
mod window;


pub use options::{
    DEFAULT_NEAR_END_MARGIN, DEFAULT_OVERSCAN, NearEndCallback, OnChangeCallback, WindowOptions,
    fit_container_height,
};
pub use scroll::{
    ListenerId, ScrollEmitter, ScrollListener, ScrollSource, ScrollSubscription, bind_scroll,
};
pub use types::{ScrollDirection, Viewport, VirtualRow, VisibleWindow};
pub use window::{Window, compute_window};
