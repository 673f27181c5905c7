use super::{refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, Settled, WidgetStatus};
use crate::dashboard::store::DashboardAction;
use crate::model::PricePoint;
use crate::sources::MarketAdapter;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    5.0 * 60.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
    #[serde(default = "default_true")]
    pub show_chart: bool,
    #[serde(default = "default_true")]
    pub show_mortgage_rates: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
            show_chart: true,
            show_mortgage_rates: true,
        }
    }
}

pub struct MarketWidget {
    cfg: MarketConfig,
    feed: Feed<MarketAdapter>,
}

impl MarketWidget {
    pub fn new(cfg: MarketConfig) -> Self {
        Self {
            cfg,
            feed: Feed::new(MarketAdapter, FallbackHandling::ShowData),
        }
    }

    fn sparkline(ui: &mut egui::Ui, history: &[PricePoint], color: egui::Color32) {
        let desired = egui::vec2(ui.available_width().min(280.0), 48.0);
        let (rect, _) = ui.allocate_exact_size(desired, egui::Sense::hover());
        if history.len() < 2 {
            return;
        }
        let (min, max) = history
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.price), hi.max(p.price)));
        let span = (max - min).max(f64::EPSILON);
        let step = rect.width() / (history.len() - 1) as f32;
        let points: Vec<egui::Pos2> = history
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let y = ((p.price - min) / span) as f32;
                egui::pos2(rect.left() + i as f32 * step, rect.bottom() - y * rect.height())
            })
            .collect();
        ui.painter()
            .add(egui::Shape::line(points, egui::Stroke::new(1.5, color)));
    }
}

impl Widget for MarketWidget {
    fn title(&self) -> &str {
        "Market Insights"
    }

    fn refresh(&mut self, _ctx: &DashboardContext<'_>) {
        self.feed.request(());
    }

    fn poll(&mut self, ctx: &DashboardContext<'_>) {
        if self.feed.poll() == Some(Settled::Succeeded) {
            if let Some(data) = self.feed.data() {
                ctx.store.dispatch(DashboardAction::SetMarket(data.clone()));
            }
        }
    }

    fn render(&mut self, ui: &mut egui::Ui, _ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if !status_banner(ui, self.feed.status(), "No market data.") {
            return None;
        }
        let market = self.feed.data()?;
        let quote = &market.sp500;
        let color = if quote.change >= 0.0 {
            egui::Color32::from_rgb(34, 197, 94)
        } else {
            egui::Color32::from_rgb(239, 68, 68)
        };
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("S&P 500").strong());
            ui.label(format!("{:.2}", quote.price));
            ui.colored_label(
                color,
                format!("{:+.2} ({:+.2}%)", quote.change, quote.change_percent),
            );
        });
        if self.cfg.show_chart {
            Self::sparkline(ui, &quote.history, color);
        }
        let fg = &market.fear_greed;
        ui.label(format!("Fear & Greed: {} ({})", fg.value, fg.rating.label()))
            .on_hover_text(format!(
                "Previous close {} · 1 week {} · 1 month {}",
                fg.previous_close, fg.previous_week, fg.previous_month
            ));
        if self.cfg.show_mortgage_rates {
            let rates = &market.mortgage_rates;
            ui.separator();
            egui::Grid::new("mortgage_rates").num_columns(2).show(ui, |ui| {
                ui.label("30-year fixed");
                ui.label(format!("{:.2}%", rates.thirty_year));
                ui.end_row();
                ui.label("15-year fixed");
                ui.label(format!("{:.2}%", rates.fifteen_year));
                ui.end_row();
                ui.label("5/1 ARM");
                ui.label(format!("{:.2}%", rates.five_one_arm));
                ui.end_row();
            });
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
