use super::{refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, Settled, WidgetStatus};
use crate::dashboard::store::DashboardAction;
use crate::model::TrafficStatus;
use crate::sources::TrafficAdapter;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    5.0 * 60.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
        }
    }
}

pub struct TrafficWidget {
    cfg: TrafficConfig,
    feed: Feed<TrafficAdapter>,
    fetched_for: Option<String>,
}

impl TrafficWidget {
    pub fn new(cfg: TrafficConfig) -> Self {
        Self {
            cfg,
            feed: Feed::new(TrafficAdapter, FallbackHandling::ShowData),
            fetched_for: None,
        }
    }

    fn status_color(status: TrafficStatus) -> egui::Color32 {
        match status {
            TrafficStatus::Light => egui::Color32::from_rgb(34, 197, 94),
            TrafficStatus::Moderate => egui::Color32::from_rgb(234, 179, 8),
            TrafficStatus::Heavy => egui::Color32::from_rgb(239, 68, 68),
        }
    }
}

impl Widget for TrafficWidget {
    fn title(&self) -> &str {
        "Traffic"
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
            if let Some(data) = self.feed.data() {
                ctx.store.dispatch(DashboardAction::SetTraffic(data.clone()));
            }
        }
    }

    fn render(&mut self, ui: &mut egui::Ui, _ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if !status_banner(ui, self.feed.status(), "No traffic data.") {
            return None;
        }
        let traffic = self.feed.data()?;
        ui.horizontal(|ui| {
            ui.colored_label(
                Self::status_color(traffic.status),
                egui::RichText::new(format!("● {}", traffic.status.label())).strong(),
            );
            ui.label(format!("Commute: {} min", traffic.commute_time));
        });
        if traffic.incidents.is_empty() {
            ui.weak("No reported incidents.");
        }
        for incident in &traffic.incidents {
            ui.separator();
            ui.label(egui::RichText::new(&incident.description).strong());
            ui.weak(format!("{} · {}", incident.kind, incident.location));
        }
        None
    }

    fn refresh_interval(&self) -> Option<Duration> {
        refresh_every(self.cfg.refresh_interval_secs, self.cfg.manual_refresh_only)
    }

    fn status(&self) -> Option<&WidgetStatus> {
        Some(self.feed.status())
    }
}
