use super::{refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, Settled, WidgetStatus};
use crate::dashboard::store::DashboardAction;
use crate::model::WeatherData;
use crate::sources::{Adapter, WeatherAdapter};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    30.0 * 60.0
}

fn default_forecast_days() -> usize {
    7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: usize,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
            forecast_days: default_forecast_days(),
        }
    }
}

pub struct WeatherWidget<A: Adapter = WeatherAdapter> {
    cfg: WeatherConfig,
    feed: Feed<A>,
    fetched_for: Option<String>,
}

impl WeatherWidget {
    pub fn new(cfg: WeatherConfig) -> Self {
        Self::with_adapter(cfg, WeatherAdapter::default())
    }
}

impl<A> WeatherWidget<A>
where
    A: Adapter<Params = String, Output = WeatherData>,
{
    /// Build the widget on any source keyed by postal code.
    pub fn with_adapter(cfg: WeatherConfig, adapter: A) -> Self {
        Self {
            cfg,
            feed: Feed::new(adapter, FallbackHandling::ShowError),
            fetched_for: None,
        }
    }
}

impl<A> Widget for WeatherWidget<A>
where
    A: Adapter<Params = String, Output = WeatherData>,
{
    fn title(&self) -> &str {
        "Weather"
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
                ctx.store.dispatch(DashboardAction::SetWeather(data.clone()));
            }
        }
    }

    fn render(&mut self, ui: &mut egui::Ui, _ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if !status_banner(ui, self.feed.status(), "No weather data.") {
            return None;
        }
        let Some(weather) = self.feed.data() else {
            return None;
        };
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(weather.icon.glyph()).size(32.0));
            ui.vertical(|ui| {
                ui.heading(format!("{}°F", weather.temperature));
                ui.label(&weather.condition);
            });
        });
        ui.horizontal(|ui| {
            ui.weak(format!("Feels like {}°", weather.feels_like));
            ui.weak(format!("Humidity {}%", weather.humidity));
            ui.weak(format!("Wind {} mph", weather.wind_speed));
        });
        if !weather.forecast.is_empty() {
            ui.separator();
            egui::Grid::new("weather_forecast")
                .num_columns(3)
                .striped(true)
                .show(ui, |ui| {
                    for day in weather.forecast.iter().take(self.cfg.forecast_days) {
                        ui.label(&day.day)
                            .on_hover_text(day.full_day.as_deref().unwrap_or(&day.day));
                        ui.label(day.icon.glyph()).on_hover_text(&day.condition);
                        ui.label(format!("{}° / {}°", day.high, day.low));
                        ui.end_row();
                    }
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

    fn header_ui(
        &mut self,
        ui: &mut egui::Ui,
        _ctx: &DashboardContext<'_>,
    ) -> Option<WidgetAction> {
        if let Some(at) = self.feed.lifecycle().last_fetched() {
            ui.weak(at.format("%H:%M").to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::lifecycle::wait_until;
    use crate::dashboard::store::DashboardStore;
    use crate::dashboard::widgets::rendered_text;
    use crate::model::WeatherIcon;
    use crate::sources::testing::{ScriptedAdapter, Shared};
    use crate::sources::ErrorPolicy;
    use crate::storage::LocalStorage;
    use std::sync::Arc;

    type Script = ScriptedAdapter<WeatherData, String>;

    fn sunny(temperature: i32) -> WeatherData {
        WeatherData {
            temperature,
            condition: "Sunny".into(),
            icon: WeatherIcon::Sun,
            feels_like: temperature,
            humidity: 40,
            wind_speed: 3,
            forecast: Vec::new(),
        }
    }

    fn context<'a>(
        postal_code: &'a str,
        store: &'a DashboardStore,
        storage: &'a LocalStorage,
    ) -> DashboardContext<'a> {
        DashboardContext {
            postal_code,
            store,
            storage,
        }
    }

    fn settle(widget: &mut WeatherWidget<Shared<Script>>, ctx: &DashboardContext<'_>) {
        assert!(wait_until(|| {
            widget.poll(ctx);
            widget.status() != Some(&WidgetStatus::Loading)
        }));
    }

    #[test]
    fn loading_loaded_and_error_render_differently() {
        let script = Arc::new(Script::for_params(
            ErrorPolicy::Propagate,
            vec![Ok(sunny(72)), Err("forecast office offline".into())],
        ));
        let store = DashboardStore::new();
        let storage = LocalStorage::in_memory();
        let ctx = context("19129", &store, &storage);
        let mut widget = WeatherWidget::with_adapter(WeatherConfig::default(), Shared(script));

        let loading = rendered_text(&mut widget, &ctx);
        assert!(loading.contains("Loading…"), "{loading}");

        widget.refresh(&ctx);
        settle(&mut widget, &ctx);
        assert_eq!(widget.status(), Some(&WidgetStatus::Loaded));
        let loaded = rendered_text(&mut widget, &ctx);
        assert!(loaded.contains("72°F") && loaded.contains("Sunny"), "{loaded}");
        assert!(!loaded.contains("Loading…"));
        assert_eq!(store.snapshot().weather, Some(sunny(72)));

        widget.refresh(&ctx);
        settle(&mut widget, &ctx);
        let failed = rendered_text(&mut widget, &ctx);
        assert!(failed.contains("forecast office offline"), "{failed}");
        assert!(!failed.contains("Loading…"));
        // The store keeps the last good reading.
        assert_eq!(store.snapshot().weather, Some(sunny(72)));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn sample_weather_is_shown_as_unavailable() {
        let script = Arc::new(
            Script::for_params(ErrorPolicy::Fallback, vec![Err("timeout".into())])
                .with_fallback(sunny(50)),
        );
        let store = DashboardStore::new();
        let storage = LocalStorage::in_memory();
        let ctx = context("19129", &store, &storage);
        let mut widget = WeatherWidget::with_adapter(WeatherConfig::default(), Shared(script));
        widget.refresh(&ctx);
        settle(&mut widget, &ctx);
        let text = rendered_text(&mut widget, &ctx);
        assert!(text.contains("Source unavailable"), "{text}");
        assert!(!text.contains("50°F"));
        assert!(store.snapshot().weather.is_none());
    }

    #[test]
    fn postal_code_change_refetches() {
        let script = Arc::new(Script::for_params(
            ErrorPolicy::Propagate,
            vec![Ok(sunny(70)), Ok(sunny(64))],
        ));
        let store = DashboardStore::new();
        let storage = LocalStorage::in_memory();
        let mut widget =
            WeatherWidget::with_adapter(WeatherConfig::default(), Shared(Arc::clone(&script)));

        let home = context("19129", &store, &storage);
        widget.refresh(&home);
        settle(&mut widget, &home);
        widget.poll(&home);
        assert_eq!(*script.requested.lock().unwrap(), vec!["19129".to_string()]);
        assert_eq!(store.snapshot().weather, Some(sunny(70)));

        let moved = context("19103", &store, &storage);
        widget.poll(&moved);
        settle(&mut widget, &moved);
        assert_eq!(
            *script.requested.lock().unwrap(),
            vec!["19129".to_string(), "19103".to_string()]
        );
        assert_eq!(store.snapshot().weather, Some(sunny(64)));
    }
}
