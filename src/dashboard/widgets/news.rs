use super::{fallback_note, refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, Settled, WidgetStatus};
use crate::dashboard::store::DashboardAction;
use crate::model::relative_age;
use crate::sources::NewsAdapter;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    15.0 * 60.0
}

fn default_max_items() -> usize {
    6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
            max_items: default_max_items(),
        }
    }
}

pub struct NewsWidget {
    cfg: NewsConfig,
    feed: Feed<NewsAdapter>,
    fetched_for: Option<String>,
}

impl NewsWidget {
    pub fn new(cfg: NewsConfig) -> Self {
        Self {
            cfg,
            feed: Feed::new(NewsAdapter, FallbackHandling::ShowData),
            fetched_for: None,
        }
    }
}

impl Widget for NewsWidget {
    fn title(&self) -> &str {
        "Local News"
    }

    fn refresh(&mut self, ctx: &DashboardContext<'_>) {
        self.fetched_for = Some(ctx.postal_code.to_string());
        self.feed.request(ctx.postal_code.to_string());
    }

    fn poll(&mut self, ctx: &DashboardContext<'_>) {
        if self.fetched_for.as_deref() != Some(ctx.postal_code) {
            self.refresh(ctx);
        }
        if self.feed.poll() == Some(Settled::Succeeded) {
            if let Some(items) = self.feed.data() {
                ctx.store.dispatch(DashboardAction::SetNews(items.clone()));
            }
        }
    }

    fn render(&mut self, ui: &mut egui::Ui, _ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if !status_banner(ui, self.feed.status(), "No news right now.") {
            return None;
        }
        fallback_note(ui, self.feed.lifecycle().shows_fallback());
        let items = self.feed.data()?;
        let now = chrono::Utc::now().timestamp();
        let mut action = None;
        for item in items.iter().take(self.cfg.max_items) {
            if ui.link(&item.title).clicked() {
                action = Some(WidgetAction::OpenUrl(item.url.clone()));
            }
            ui.weak(format!(
                "{} · {}",
                item.source,
                relative_age(item.published_at, now)
            ));
            ui.add_space(4.0);
        }
        action
    }

    fn refresh_interval(&self) -> Option<Duration> {
        refresh_every(self.cfg.refresh_interval_secs, self.cfg.manual_refresh_only)
    }

    fn status(&self) -> Option<&WidgetStatus> {
        Some(self.feed.status())
    }
}
