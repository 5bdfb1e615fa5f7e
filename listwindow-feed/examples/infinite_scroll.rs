// Example: a repo list that pages in as the user scrolls toward the bottom.
//
// The page source is an in-memory stand-in for the GitHub "list user repos" endpoint.
use async_trait::async_trait;
use listwindow::{Window, WindowOptions};
use listwindow_feed::{
    Feed, FeedOptions, FetchError, Identified, LoadTrigger, MemoryStore, Page, PageSource,
    SearchHistory,
};

#[derive(Clone, Debug)]
struct Repo {
    id: u64,
    full_name: String,
    stars: u32,
}

impl Identified for Repo {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

struct InMemoryRepos;

#[async_trait]
impl PageSource for InMemoryRepos {
    type Item = Repo;

    async fn fetch_page(
        &self,
        user: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Repo>, FetchError> {
        let total = match user {
            "alice" => 25,
            "bob" => 4,
            _ => return Err(FetchError::from_response(404, r#"{"message":"Not Found"}"#)),
        };
        let start = ((page - 1) * page_size) as u64;
        let end = (start + page_size as u64).min(total);
        let repos = (start..end.max(start))
            .map(|i| Repo {
                id: i + 1,
                full_name: format!("{user}/project-{i}"),
                stars: (i * 37 % 500) as u32,
            })
            .collect::<Vec<_>>();
        Ok(repos.into())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut history = SearchHistory::load(MemoryStore::new());
    let feed = Feed::new(InMemoryRepos, FeedOptions::default());
    let mut window = Window::new(WindowOptions::new(180, 600).with_overscan(3));

    for user in ["nobody", "alice"] {
        if let Err(err) = history.record(user) {
            eprintln!("history not saved: {err}");
        }
        match feed.select_subject(user).await {
            Ok(outcome) => println!("{user}: {outcome:?}"),
            Err(err) => println!("{user}: error {} ({})", err.status(), err),
        }
    }
    feed.sync_window(&mut window);

    // Scroll one screen at a time, loading whenever the bottom edge is near.
    let mut offset = 0u64;
    loop {
        window.apply_scroll_offset(offset);
        if feed.should_load_more(&window) {
            match feed.on_near_end(LoadTrigger::ScrollThreshold).await {
                Ok(outcome) => println!("offset={offset}: {outcome:?}"),
                Err(err) => println!("offset={offset}: {err}"),
            }
            feed.sync_window(&mut window);
        }

        let win = window.visible_window();
        let first = feed.visible_items(&window).first().cloned();
        println!(
            "offset={offset} rows={}..={} of {} first={:?}",
            win.start_index,
            win.end_index,
            win.count,
            first.map(|r| (r.full_name, r.stars))
        );

        if offset >= window.max_scroll_offset() && !feed.fetch_state().has_more {
            break;
        }
        offset = window.clamp_scroll_offset(offset + 600);
    }

    println!("recent searches: {:?}", history.entries());
}
