use super::{fallback_note, refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, Settled, WidgetStatus};
use crate::dashboard::store::DashboardAction;
use crate::model::{relative_age, RedditPost};
use crate::sources::{RedditAdapter, RedditParams};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    5.0 * 60.0
}

fn default_subreddits() -> Vec<String> {
    vec!["philadelphia".into(), "phillylist".into(), "philly".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
            subreddits: default_subreddits(),
        }
    }
}

/// Posts from a handful of local subreddits. The fetched posts and the
/// loading and error flags are mirrored into the shared store.
pub struct RedditWidget {
    cfg: RedditConfig,
    feed: Feed<RedditAdapter>,
    active: String,
}

impl RedditWidget {
    pub fn new(mut cfg: RedditConfig) -> Self {
        if cfg.subreddits.is_empty() {
            cfg.subreddits = default_subreddits();
        }
        let active = cfg.subreddits[0].clone();
        Self {
            cfg,
            feed: Feed::new(RedditAdapter, FallbackHandling::ShowData),
            active,
        }
    }

    fn post_row(ui: &mut egui::Ui, post: &RedditPost, now: i64) -> Option<WidgetAction> {
        let mut action = None;
        ui.vertical(|ui| {
            if ui.link(egui::RichText::new(&post.title).strong()).clicked() {
                action = Some(WidgetAction::OpenUrl(post.url.clone()));
            }
            if let Some(content) = &post.content {
                let preview: String = content.chars().take(160).collect();
                ui.weak(preview);
            }
            ui.horizontal(|ui| {
                ui.weak(format!("▲ {}", post.score));
                ui.weak(format!("💬 {}", post.num_comments));
                ui.weak(&post.subreddit);
                ui.weak(relative_age(post.created, now));
            });
        });
        action
    }
}

impl Widget for RedditWidget {
    fn title(&self) -> &str {
        "Reddit"
    }

    fn refresh(&mut self, ctx: &DashboardContext<'_>) {
        ctx.store.dispatch(DashboardAction::SetRedditLoading(true));
        ctx.store.dispatch(DashboardAction::SetRedditError(None));
        self.feed.request(RedditParams::hot(&self.active));
    }

    fn poll(&mut self, ctx: &DashboardContext<'_>) {
        match self.feed.poll() {
            Some(Settled::Succeeded) => {
                if let Some(posts) = self.feed.data() {
                    ctx.store
                        .dispatch(DashboardAction::SetRedditPosts(posts.clone()));
                }
                ctx.store.dispatch(DashboardAction::SetRedditLoading(false));
            }
            Some(Settled::Failed) => {
                if let WidgetStatus::Error(msg) = self.feed.status() {
                    ctx.store
                        .dispatch(DashboardAction::SetRedditError(Some(msg.clone())));
                }
                ctx.store.dispatch(DashboardAction::SetRedditLoading(false));
            }
            Some(Settled::Stale) | None => {}
        }
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let mut switched = None;
        ui.horizontal_wrapped(|ui| {
            for sub in &self.cfg.subreddits {
                if ui
                    .selectable_label(*sub == self.active, format!("r/{sub}"))
                    .clicked()
                    && *sub != self.active
                {
                    switched = Some(sub.clone());
                }
            }
        });
        if let Some(sub) = switched {
            tracing::debug!(subreddit = %sub, "switching subreddit");
            self.active = sub;
            self.refresh(ctx);
        }

        if !status_banner(ui, self.feed.status(), "No posts found.") {
            return None;
        }
        fallback_note(ui, self.feed.lifecycle().shows_fallback());
        let posts = self.feed.data()?;
        let now = chrono::Utc::now().timestamp();
        let mut action = None;
        egui::ScrollArea::vertical()
            .id_source("reddit_posts")
            .max_height(320.0)
            .show(ui, |ui| {
                for post in posts {
                    if let Some(a) = Self::post_row(ui, post, now) {
                        action = Some(a);
                    }
                    ui.separator();
                }
            });
        action
    }

    fn refresh_interval(&self) -> Option<Duration> {
        refresh_every(self.cfg.refresh_interval_secs, self.cfg.manual_refresh_only)
    }

    fn status(&self) -> Option<&WidgetStatus> {
        Some(self.feed.status())
    }
}
