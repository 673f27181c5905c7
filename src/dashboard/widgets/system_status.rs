use super::{refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, WidgetStatus};
use crate::sources::SystemAdapter;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    5.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatusConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
    #[serde(default = "default_true")]
    pub show_cpu: bool,
    #[serde(default = "default_true")]
    pub show_memory: bool,
    #[serde(default = "default_true")]
    pub show_disk: bool,
    #[serde(default = "default_true")]
    pub show_uptime: bool,
}

impl Default for SystemStatusConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
            show_cpu: true,
            show_memory: true,
            show_disk: true,
            show_uptime: true,
        }
    }
}

pub struct SystemStatusWidget {
    cfg: SystemStatusConfig,
    feed: Feed<SystemAdapter>,
}

impl SystemStatusWidget {
    pub fn new(cfg: SystemStatusConfig) -> Self {
        Self {
            cfg,
            feed: Feed::new(SystemAdapter, FallbackHandling::ShowError),
        }
    }

    fn fmt_bytes(bytes: u64) -> String {
        const GB: f64 = 1024.0 * 1024.0 * 1024.0;
        const MB: f64 = 1024.0 * 1024.0;
        let bytes = bytes as f64;
        if bytes >= GB {
            format!("{:.1} GB", bytes / GB)
        } else {
            format!("{:.0} MB", bytes / MB)
        }
    }

    fn fmt_uptime(secs: u64) -> String {
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3600;
        let minutes = (secs % 3600) / 60;
        if days > 0 {
            format!("{days}d {hours}h")
        } else {
            format!("{hours}h {minutes}m")
        }
    }

    fn usage_bar(ui: &mut egui::Ui, label: &str, percent: f32, detail: String) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(
                egui::ProgressBar::new((percent / 100.0).clamp(0.0, 1.0))
                    .text(format!("{percent:.0}%"))
                    .desired_width(120.0),
            )
            .on_hover_text(detail);
        });
    }
}

impl Widget for SystemStatusWidget {
    fn title(&self) -> &str {
        "System"
    }

    fn refresh(&mut self, _ctx: &DashboardContext<'_>) {
        self.feed.request(());
    }

    fn poll(&mut self, _ctx: &DashboardContext<'_>) {
        self.feed.poll();
    }

    fn render(&mut self, ui: &mut egui::Ui, _ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if !status_banner(ui, self.feed.status(), "System data unavailable.") {
            return None;
        }
        let Some(status) = self.feed.data() else {
            return None;
        };
        if let Some(host) = &status.host_name {
            ui.weak(match &status.os {
                Some(os) => format!("{host} · {os}"),
                None => host.clone(),
            });
        }
        if self.cfg.show_cpu {
            Self::usage_bar(
                ui,
                "CPU",
                status.cpu_percent,
                format!("{} cores", status.cpu_count),
            );
        }
        if self.cfg.show_memory {
            Self::usage_bar(
                ui,
                "Mem",
                status.mem_percent(),
                format!(
                    "{} of {}",
                    Self::fmt_bytes(status.mem_used),
                    Self::fmt_bytes(status.mem_total)
                ),
            );
        }
        if self.cfg.show_disk {
            Self::usage_bar(
                ui,
                "Disk",
                status.disk_percent(),
                format!(
                    "{} of {}",
                    Self::fmt_bytes(status.disk_used),
                    Self::fmt_bytes(status.disk_total)
                ),
            );
        }
        if self.cfg.show_uptime {
            ui.label(format!("Uptime: {}", Self::fmt_uptime(status.uptime_secs)));
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
