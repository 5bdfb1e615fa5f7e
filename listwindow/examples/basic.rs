// Example: minimal usage and the jump-to-row helper.
use listwindow::{Window, WindowOptions};

fn main() {
    let items: Vec<String> = (0..1_000_000).map(|i| format!("row {i}")).collect();

    let mut w = Window::new(
        WindowOptions::new(20, 400)
            .with_count(items.len())
            .with_overscan(3),
    );
    w.set_scroll_offset(123_456);

    println!("total_height={}", w.total_height());
    println!("visible_window={:?}", w.visible_window());
    println!("first_drawn={:?}", w.visible_slice(&items).first());

    let off = w.scroll_to_index_offset(999_999);
    w.set_scroll_offset(off);
    println!(
        "after scroll_to_index: offset={} near_end={}",
        w.scroll_offset(),
        w.is_near_end()
    );
}
