use super::{fallback_note, refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, Settled, WidgetStatus};
use crate::dashboard::store::DashboardAction;
use crate::model::{Event, EventCategory};
use crate::sources::{EventsAdapter, EventsParams};
use chrono::{DateTime, Local};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    60.0 * 60.0
}

fn default_max_events() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    /// Initially selected category; `None` shows all.
    #[serde(default)]
    pub category: Option<EventCategory>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
            max_events: default_max_events(),
            category: None,
        }
    }
}

pub struct EventsWidget {
    cfg: EventsConfig,
    feed: Feed<EventsAdapter>,
    category: Option<EventCategory>,
    fetched_for: Option<String>,
}

impl EventsWidget {
    pub fn new(cfg: EventsConfig) -> Self {
        Self {
            category: cfg.category,
            cfg,
            feed: Feed::new(EventsAdapter::default(), FallbackHandling::ShowData),
            fetched_for: None,
        }
    }

    fn category_label(category: Option<EventCategory>) -> &'static str {
        category.map(|c| c.label()).unwrap_or("All categories")
    }

    /// Returns `true` when the selection changed.
    fn category_picker(&mut self, ui: &mut egui::Ui) -> bool {
        let before = self.category;
        egui::ComboBox::from_id_source("events_category")
            .selected_text(Self::category_label(self.category))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.category, None, Self::category_label(None));
                for category in EventCategory::ALL {
                    ui.selectable_value(&mut self.category, Some(category), category.label());
                }
            });
        self.category != before
    }

    fn format_date(ts: i64) -> String {
        DateTime::from_timestamp(ts, 0)
            .map(|d| d.with_timezone(&Local).format("%a %b %-d, %-I:%M %p").to_string())
            .unwrap_or_default()
    }

    fn event_row(ui: &mut egui::Ui, event: &Event) -> Option<WidgetAction> {
        let mut action = None;
        ui.vertical(|ui| {
            if ui.link(&event.title).clicked() {
                action = Some(WidgetAction::OpenUrl(event.url.clone()));
            }
            ui.horizontal(|ui| {
                ui.weak(Self::format_date(event.date));
                ui.weak(format!("· {} · {}", event.category.label(), event.location));
            });
        });
        action
    }
}

impl Widget for EventsWidget {
    fn title(&self) -> &str {
        "Local Events"
    }

    fn refresh(&mut self, ctx: &DashboardContext<'_>) {
        self.fetched_for = Some(ctx.postal_code.to_string());
        self.feed.request(EventsParams {
            postal_code: ctx.postal_code.to_string(),
            category: self.category,
        });
    }

    fn poll(&mut self, ctx: &DashboardContext<'_>) {
        if self.fetched_for.as_deref() != Some(ctx.postal_code) {
            self.refresh(ctx);
        }
        if self.feed.poll() == Some(Settled::Succeeded) {
            if let Some(events) = self.feed.data() {
                ctx.store.dispatch(DashboardAction::SetEvents(events.clone()));
            }
        }
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if self.category_picker(ui) {
            tracing::debug!(category = Self::category_label(self.category), "event filter changed");
            self.refresh(ctx);
        }
        if !status_banner(ui, self.feed.status(), "No events found.") {
            return None;
        }
        fallback_note(ui, self.feed.lifecycle().shows_fallback());
        let events = self.feed.data()?;
        let mut action = None;
        egui::ScrollArea::vertical()
            .id_source("events_list")
            .max_height(260.0)
            .show(ui, |ui| {
                for event in events.iter().take(self.cfg.max_events) {
                    if let Some(a) = Self::event_row(ui, event) {
                        action = Some(a);
                    }
                    ui.add_space(4.0);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_reads_category_filter() {
        let cfg: EventsConfig = serde_json::from_value(serde_json::json!({
            "category": "family"
        }))
        .unwrap();
        let widget = EventsWidget::new(cfg);
        assert_eq!(widget.category, Some(EventCategory::Family));
        assert_eq!(widget.cfg.max_events, default_max_events());
        assert_eq!(EventsWidget::category_label(None), "All categories");
    }
}
