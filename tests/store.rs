use neighborhood_dashboard::dashboard::store::{reduce, DashboardAction, DashboardStore, SharedDashboardState};
use neighborhood_dashboard::model::{NewsItem, RedditPost, TrafficData, TrafficStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn news(id: &str) -> NewsItem {
    NewsItem {
        id: id.into(),
        title: format!("Headline {id}"),
        source: "Local Paper".into(),
        url: format!("https://example.com/{id}"),
        published_at: 1_700_000_000,
    }
}

fn post(id: &str) -> RedditPost {
    RedditPost {
        id: id.into(),
        title: format!("Post {id}"),
        url: format!("https://reddit.com/{id}"),
        score: 10,
        num_comments: 2,
        created: 1_700_000_000,
        subreddit: "philadelphia".into(),
        author: "someone".into(),
        content: None,
    }
}

#[test]
fn initial_state_is_empty() {
    let store = DashboardStore::new();
    let state = store.snapshot();
    assert_eq!(*state, SharedDashboardState::default());
    assert!(state.weather.is_none());
    assert!(state.reddit.posts.is_empty());
    assert!(!state.reddit.loading);
    assert_eq!(store.version(), 0);
}

#[test]
fn reducer_replaces_only_the_named_field() {
    let state = SharedDashboardState::default();
    let traffic = TrafficData {
        status: TrafficStatus::Moderate,
        incidents: Vec::new(),
        commute_time: 25,
    };
    let next = reduce(&state, DashboardAction::SetTraffic(traffic.clone()));
    assert_eq!(next.traffic, Some(traffic));
    assert_eq!(next.news, None);
    assert_eq!(next.reddit, state.reddit);

    let next = reduce(&next, DashboardAction::SetNews(vec![news("a")]));
    assert_eq!(next.news.as_ref().map(Vec::len), Some(1));
    assert!(next.traffic.is_some());
}

#[test]
fn reddit_flags_are_independent() {
    let store = DashboardStore::new();
    store.dispatch(DashboardAction::SetRedditLoading(true));
    store.dispatch(DashboardAction::SetRedditError(Some("offline".into())));
    let state = store.snapshot();
    assert!(state.reddit.loading);
    assert_eq!(state.reddit.error.as_deref(), Some("offline"));

    store.dispatch(DashboardAction::SetRedditPosts(vec![post("1"), post("2")]));
    store.dispatch(DashboardAction::SetRedditError(None));
    store.dispatch(DashboardAction::SetRedditLoading(false));
    let state = store.snapshot();
    assert_eq!(state.reddit.posts.len(), 2);
    assert!(state.reddit.error.is_none());
    assert!(!state.reddit.loading);
}

#[test]
fn snapshots_are_immutable() {
    let store = DashboardStore::new();
    let before = store.snapshot();
    store.dispatch(DashboardAction::SetNews(vec![news("a")]));
    assert!(before.news.is_none());
    assert!(store.snapshot().news.is_some());
}

#[test]
fn change_callback_runs_once_per_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let store = DashboardStore::new().with_change_callback(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    store.dispatch(DashboardAction::SetNews(Vec::new()));
    store.dispatch(DashboardAction::SetRedditLoading(true));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.version(), 2);
}

#[test]
fn dispatch_from_another_thread_is_visible() {
    let store = Arc::new(DashboardStore::new());
    let remote = Arc::clone(&store);
    std::thread::spawn(move || remote.dispatch(DashboardAction::SetNews(vec![news("b")])))
        .join()
        .unwrap();
    assert_eq!(store.snapshot().news.as_ref().unwrap()[0].id, "b");
}
