use crate::model::{Event, MarketData, NewsItem, RedditPost, TrafficData, WeatherData};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Reddit data is shared together with its loading and error flags so that
/// every widget building on the posts can tell whether they are current.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedditState {
    pub posts: Vec<RedditPost>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Latest successfully fetched value per shared domain. `None` means the
/// domain has never been fetched; a failed refresh leaves the previous value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedDashboardState {
    pub weather: Option<WeatherData>,
    pub news: Option<Vec<NewsItem>>,
    pub traffic: Option<TrafficData>,
    pub events: Option<Vec<Event>>,
    pub reddit: RedditState,
    pub market: Option<MarketData>,
}

/// Closed set of updates accepted by [`DashboardStore::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    SetWeather(WeatherData),
    SetNews(Vec<NewsItem>),
    SetTraffic(TrafficData),
    SetEvents(Vec<Event>),
    SetRedditPosts(Vec<RedditPost>),
    SetRedditLoading(bool),
    SetRedditError(Option<String>),
    SetMarket(MarketData),
}

impl DashboardAction {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardAction::SetWeather(_) => "SET_WEATHER",
            DashboardAction::SetNews(_) => "SET_NEWS",
            DashboardAction::SetTraffic(_) => "SET_TRAFFIC",
            DashboardAction::SetEvents(_) => "SET_EVENTS",
            DashboardAction::SetRedditPosts(_) => "SET_REDDIT_POSTS",
            DashboardAction::SetRedditLoading(_) => "SET_REDDIT_LOADING",
            DashboardAction::SetRedditError(_) => "SET_REDDIT_ERROR",
            DashboardAction::SetMarket(_) => "SET_MARKET",
        }
    }
}

/// Apply `action` to `state`, replacing exactly the field it names.
pub fn reduce(state: &SharedDashboardState, action: DashboardAction) -> SharedDashboardState {
    let mut next = state.clone();
    match action {
        DashboardAction::SetWeather(weather) => next.weather = Some(weather),
        DashboardAction::SetNews(news) => next.news = Some(news),
        DashboardAction::SetTraffic(traffic) => next.traffic = Some(traffic),
        DashboardAction::SetEvents(events) => next.events = Some(events),
        DashboardAction::SetRedditPosts(posts) => next.reddit.posts = posts,
        DashboardAction::SetRedditLoading(loading) => next.reddit.loading = loading,
        DashboardAction::SetRedditError(error) => next.reddit.error = error,
        DashboardAction::SetMarket(market) => next.market = Some(market),
    }
    next
}

struct StoreState {
    snapshot: Arc<SharedDashboardState>,
    version: u64,
}

pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Process-wide container for data consumed by more than one widget.
///
/// The store is created once by the application and handed to widgets via
/// [`DashboardContext`](crate::dashboard::DashboardContext). Readers take a
/// cheap [`snapshot`](Self::snapshot); there is no selective subscription.
pub struct DashboardStore {
    state: Mutex<StoreState>,
    on_change: Option<ChangeCallback>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                snapshot: Arc::new(SharedDashboardState::default()),
                version: 0,
            }),
            on_change: None,
        }
    }

    /// Invoke `on_change` after every dispatch, e.g. to request a repaint.
    pub fn with_change_callback(mut self, on_change: ChangeCallback) -> Self {
        self.on_change = Some(on_change);
        self
    }

    /// Every write replaces the snapshot only after `reduce` has returned,
    /// so a poisoned lock still guards a consistent state and is recovered.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("dashboard store lock poisoned; recovering last state");
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn snapshot(&self) -> Arc<SharedDashboardState> {
        Arc::clone(&self.lock().snapshot)
    }

    /// Number of dispatches applied so far.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn dispatch(&self, action: DashboardAction) {
        let name = action.name();
        {
            let mut state = self.lock();
            state.snapshot = Arc::new(reduce(&state.snapshot, action));
            state.version += 1;
            tracing::debug!(action = name, version = state.version, "store dispatch");
        }
        if let Some(cb) = &self.on_change {
            cb();
        }
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}
