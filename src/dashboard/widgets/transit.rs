use super::{fallback_note, refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, WidgetStatus};
use crate::model::{BusDetour, ElevatorOutage, SeptaAlert, TransitUpdates};
use crate::sources::{SeptaAdapter, TransitFeed};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    5.0 * 60.0
}

fn default_max_items() -> usize {
    10
}

/// Client-side narrowing of the alert list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertFilter {
    #[default]
    All,
    WithMessages,
    NoMessages,
    BusOnly,
    RailOnly,
}

impl AlertFilter {
    pub const ALL: [AlertFilter; 5] = [
        AlertFilter::All,
        AlertFilter::WithMessages,
        AlertFilter::NoMessages,
        AlertFilter::BusOnly,
        AlertFilter::RailOnly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AlertFilter::All => "All routes",
            AlertFilter::WithMessages => "With messages",
            AlertFilter::NoMessages => "No messages",
            AlertFilter::BusOnly => "Bus only",
            AlertFilter::RailOnly => "Rail only",
        }
    }

    pub fn matches(&self, alert: &SeptaAlert) -> bool {
        match self {
            AlertFilter::All => true,
            AlertFilter::WithMessages => alert.headline().is_some(),
            AlertFilter::NoMessages => alert.headline().is_none(),
            AlertFilter::BusOnly => alert.is_bus(),
            AlertFilter::RailOnly => alert.is_rail(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
    #[serde(default)]
    pub feed: TransitFeed,
    #[serde(default)]
    pub alert_filter: AlertFilter,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
            feed: TransitFeed::default(),
            alert_filter: AlertFilter::default(),
            max_items: default_max_items(),
        }
    }
}

/// SEPTA alerts, bus detours and elevator outages behind one selector.
pub struct TransitWidget {
    cfg: TransitConfig,
    feed: Feed<SeptaAdapter>,
    selected: TransitFeed,
    filter: AlertFilter,
}

impl TransitWidget {
    pub fn new(cfg: TransitConfig) -> Self {
        Self {
            selected: cfg.feed,
            filter: cfg.alert_filter,
            cfg,
            feed: Feed::new(SeptaAdapter, FallbackHandling::ShowData),
        }
    }

    /// Returns `true` when a different feed was picked.
    fn feed_picker(&mut self, ui: &mut egui::Ui) -> bool {
        let before = self.selected;
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_source("transit_feed")
                .selected_text(self.selected.label())
                .show_ui(ui, |ui| {
                    for feed in TransitFeed::ALL {
                        ui.selectable_value(&mut self.selected, feed, feed.label())
                            .on_hover_text(feed.description());
                    }
                });
            if self.selected == TransitFeed::Alerts {
                egui::ComboBox::from_id_source("transit_alert_filter")
                    .selected_text(self.filter.label())
                    .show_ui(ui, |ui| {
                        for filter in AlertFilter::ALL {
                            ui.selectable_value(&mut self.filter, filter, filter.label());
                        }
                    });
            }
        });
        self.selected != before
    }

    fn alert_row(ui: &mut egui::Ui, alert: &SeptaAlert) {
        ui.strong(&alert.route_name);
        match alert.headline() {
            Some(text) => {
                ui.label(text);
            }
            None => {
                ui.weak("No current messages");
            }
        }
        if let Some(location) = &alert.detour_start_location {
            ui.weak(format!("Detour from {location}"));
        }
        if !alert.last_updated.is_empty() {
            ui.weak(format!("Updated {}", alert.last_updated));
        }
    }

    fn detour_row(ui: &mut egui::Ui, detour: &BusDetour) {
        ui.strong(format!("Route {} {}", detour.route_id, detour.direction));
        if !detour.message.is_empty() {
            ui.label(&detour.message);
        }
        ui.weak(format!("{} → {}", detour.start_location, detour.end_location));
        ui.weak(format!(
            "{} · {} until {}",
            detour.reason, detour.start_time, detour.end_time
        ));
    }

    fn elevator_row(ui: &mut egui::Ui, outage: &ElevatorOutage) -> Option<WidgetAction> {
        ui.strong(format!("{} ({})", outage.station, outage.line));
        ui.label(format!("{}: {}", outage.elevator, outage.message));
        let url = outage.alternate_url.as_ref()?;
        ui.link("Alternate service")
            .clicked()
            .then(|| WidgetAction::OpenUrl(url.clone()))
    }

    fn list(&self, ui: &mut egui::Ui, updates: &TransitUpdates) -> Option<WidgetAction> {
        let max = self.cfg.max_items;
        let mut action = None;
        match updates {
            TransitUpdates::Alerts(alerts) => {
                let shown: Vec<&SeptaAlert> =
                    alerts.iter().filter(|a| self.filter.matches(a)).collect();
                if shown.is_empty() {
                    ui.weak("No alerts match this filter.");
                }
                for alert in shown.into_iter().take(max) {
                    Self::alert_row(ui, alert);
                    ui.add_space(4.0);
                }
            }
            TransitUpdates::Detours(detours) => {
                for detour in detours.iter().take(max) {
                    Self::detour_row(ui, detour);
                    ui.add_space(4.0);
                }
            }
            TransitUpdates::Elevators(outages) => {
                for outage in outages.iter().take(max) {
                    if let Some(a) = Self::elevator_row(ui, outage) {
                        action = Some(a);
                    }
                    ui.add_space(4.0);
                }
            }
        }
        action
    }
}

impl Widget for TransitWidget {
    fn title(&self) -> &str {
        "SEPTA Information"
    }

    fn refresh(&mut self, _ctx: &DashboardContext<'_>) {
        self.feed.request(self.selected);
    }

    fn poll(&mut self, _ctx: &DashboardContext<'_>) {
        self.feed.poll();
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if self.feed_picker(ui) {
            tracing::debug!(feed = self.selected.label(), "transit feed changed");
            self.refresh(ctx);
        }
        ui.weak(self.selected.description());
        if !status_banner(ui, self.feed.status(), "No transit updates.") {
            return None;
        }
        fallback_note(ui, self.feed.lifecycle().shows_fallback());
        let updates = self.feed.data()?;
        let mut action = None;
        egui::ScrollArea::vertical()
            .id_source("transit_list")
            .max_height(260.0)
            .show(ui, |ui| {
                action = self.list(ui, updates);
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
