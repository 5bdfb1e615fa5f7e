// Example: a UI scroll container feeding a window through a scoped subscription.
use std::cell::RefCell;
use std::rc::Rc;

use listwindow::{ScrollEmitter, Window, WindowOptions, bind_scroll, fit_container_height};

fn main() {
    // The page leaves 700px of chrome above the list; never go below one row.
    let container = fit_container_height(1080, 700, 180);
    let window = Rc::new(RefCell::new(Window::new(
        WindowOptions::new(180, container)
            .with_count(25)
            .with_overscan(3)
            .with_on_near_end(Some(|w: &Window| {
                println!("near end at offset {}: load more", w.scroll_offset());
            })),
    )));

    let container_events = ScrollEmitter::new();
    {
        let _subscription = bind_scroll(&window, &container_events);
        for offset in [0u64, 900, 2_700, 3_800, 4_120] {
            container_events.emit(offset);
            let w = window.borrow();
            let win = w.visible_window();
            println!(
                "offset={offset} rows={}..={} offset_y={} total={}",
                win.start_index, win.end_index, win.offset_y, win.total_height
            );
        }
    }

    // The view is gone; the container no longer feeds it.
    println!("listeners after teardown: {}", container_events.listener_count());
}
