use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::WidgetStatus;
use eframe::egui;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

mod civic_data;
mod events;
mod itinerary;
mod market;
mod news;
mod reddit;
mod system_status;
mod traffic;
mod transit;
mod weather;

pub use civic_data::{maps_url, CivicDataConfig, CivicDataWidget};
pub use events::{EventsConfig, EventsWidget};
pub use itinerary::{build_prompt, ItineraryConfig, ItineraryToggles, ItineraryWidget};
pub use market::{MarketConfig, MarketWidget};
pub use news::{NewsConfig, NewsWidget};
pub use reddit::{RedditConfig, RedditWidget};
pub use system_status::{SystemStatusConfig, SystemStatusWidget};
pub use traffic::{TrafficConfig, TrafficWidget};
pub use transit::{AlertFilter, TransitConfig, TransitWidget};
pub use weather::{WeatherConfig, WeatherWidget};

/// Something a widget asks the application to do outside the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetAction {
    OpenUrl(String),
}

/// Widget trait implemented by all dashboard widgets.
///
/// The composer calls [`refresh`](Widget::refresh) once when the widget is
/// mounted, again whenever its refresh subscription fires or the user hits
/// the Refresh control, and [`poll`](Widget::poll) every frame before
/// [`render`](Widget::render). Widgets never change the layout themselves.
pub trait Widget: Send {
    fn title(&self) -> &str;

    /// Start a fetch. Must return without blocking.
    fn refresh(&mut self, ctx: &DashboardContext<'_>);

    /// Apply results that arrived since the last frame.
    fn poll(&mut self, _ctx: &DashboardContext<'_>) {}

    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction>;

    /// `None` disables periodic refresh.
    fn refresh_interval(&self) -> Option<Duration> {
        None
    }

    fn status(&self) -> Option<&WidgetStatus> {
        None
    }

    fn header_ui(
        &mut self,
        _ui: &mut egui::Ui,
        _ctx: &DashboardContext<'_>,
    ) -> Option<WidgetAction> {
        None
    }
}

/// Descriptor for building widgets from JSON settings.
#[derive(Clone)]
pub struct WidgetDescriptor {
    ctor: Arc<dyn Fn(&Value) -> Box<dyn Widget> + Send + Sync>,
    default_settings: Arc<dyn Fn() -> Value + Send + Sync>,
}

pub type WidgetFactory = WidgetDescriptor;

impl WidgetDescriptor {
    pub fn new<T: Widget + 'static, C: DeserializeOwned + Serialize + Default + 'static>(
        build: fn(C) -> T,
    ) -> Self {
        Self {
            ctor: Arc::new(move |v| {
                let cfg = match serde_json::from_value::<C>(v.clone()) {
                    Ok(cfg) => cfg,
                    Err(e) => {
                        tracing::warn!(error = %e, "invalid widget settings, using defaults");
                        C::default()
                    }
                };
                Box::new(build(cfg))
            }),
            default_settings: Arc::new(|| {
                serde_json::to_value(C::default()).unwrap_or_else(|_| json!({}))
            }),
        }
    }

    pub fn default_settings(&self) -> Value {
        (self.default_settings)()
    }

    pub fn create(&self, settings: &Value) -> Box<dyn Widget> {
        (self.ctor)(settings)
    }
}

/// Key to constructor map, resolved once at startup.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<String, WidgetDescriptor>,
}

impl WidgetRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        reg.register("weather", WidgetFactory::new(WeatherWidget::new));
        reg.register("system", WidgetFactory::new(SystemStatusWidget::new));
        reg.register("events", WidgetFactory::new(EventsWidget::new));
        reg.register("reddit", WidgetFactory::new(RedditWidget::new));
        reg.register("traffic", WidgetFactory::new(TrafficWidget::new));
        reg.register("news", WidgetFactory::new(NewsWidget::new));
        reg.register("market", WidgetFactory::new(MarketWidget::new));
        reg.register("phillyDataExplorer", WidgetFactory::new(CivicDataWidget::new));
        reg.register("septa", WidgetFactory::new(TransitWidget::new));
        reg.register("itinerary", WidgetFactory::new(ItineraryWidget::new));
        reg
    }

    pub fn register(&mut self, name: &str, factory: WidgetFactory) {
        self.map.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Build the widget for `name`; unknown names have no widget.
    pub fn create(&self, name: &str, settings: &Value) -> Option<Box<dyn Widget>> {
        let factory = self.map.get(name)?;
        let settings = if settings.is_null() {
            factory.default_settings()
        } else {
            merge_json(&factory.default_settings(), settings)
        };
        Some(factory.create(&settings))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn default_settings(&self, name: &str) -> Option<Value> {
        self.map.get(name).map(|f| f.default_settings())
    }
}

pub(crate) fn merge_json(base: &Value, updates: &Value) -> Value {
    match (base, updates) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (k, v) in b {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        _ => updates.clone(),
    }
}

/// Periodic interval from the common `refresh_interval_secs` /
/// `manual_refresh_only` pair.
pub(crate) fn refresh_every(seconds: f32, manual_refresh_only: bool) -> Option<Duration> {
    if manual_refresh_only {
        None
    } else {
        Some(Duration::from_secs_f32(seconds.max(1.0)))
    }
}

/// Draw the placeholder for `status`. Returns `false` when there is nothing
/// else to show.
pub(crate) fn status_banner(ui: &mut egui::Ui, status: &WidgetStatus, empty_text: &str) -> bool {
    match status {
        WidgetStatus::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.weak("Loading…");
            });
            true
        }
        WidgetStatus::Empty => {
            ui.weak(empty_text);
            false
        }
        WidgetStatus::Error(msg) => {
            ui.colored_label(ui.visuals().error_fg_color, msg);
            true
        }
        WidgetStatus::Loaded => true,
    }
}

pub(crate) fn fallback_note(ui: &mut egui::Ui, shows_fallback: bool) {
    if shows_fallback {
        ui.weak("Live source unavailable, showing sample data.");
    }
}

/// Render `widget` into a fresh context and collect every painted string.
#[cfg(test)]
pub(crate) fn rendered_text(widget: &mut dyn Widget, dctx: &DashboardContext<'_>) -> String {
    fn collect(shape: &egui::Shape, out: &mut Vec<String>) {
        match shape {
            egui::Shape::Text(text) => out.push(text.galley.text().to_owned()),
            egui::Shape::Vec(shapes) => shapes.iter().for_each(|s| collect(s, out)),
            _ => {}
        }
    }

    let ctx = egui::Context::default();
    let output = ctx.run(egui::RawInput::default(), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            widget.render(ui, dctx);
        });
    });
    let mut texts = Vec::new();
    for clipped in &output.shapes {
        collect(&clipped.shape, &mut texts);
    }
    texts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_json_preserves_unknown_fields() {
        let base = json!({"known": 1, "extra": {"keep": true}});
        let updates = json!({"known": 2});
        let merged = merge_json(&base, &updates);
        assert_eq!(merged["known"], json!(2));
        assert_eq!(merged["extra"], json!({"keep": true}));
    }

    #[test]
    fn defaults_cover_every_dashboard_widget() {
        let reg = WidgetRegistry::with_defaults();
        assert_eq!(
            reg.names(),
            vec![
                "events",
                "itinerary",
                "market",
                "news",
                "phillyDataExplorer",
                "reddit",
                "septa",
                "system",
                "traffic",
                "weather"
            ]
        );
        assert!(reg.create("nope", &Value::Null).is_none());
    }

    #[test]
    fn created_widgets_pick_up_settings() {
        let reg = WidgetRegistry::with_defaults();
        let widget = reg
            .create(
                "system",
                &json!({"refresh_interval_secs": 30.0, "manual_refresh_only": false}),
            )
            .unwrap();
        assert_eq!(widget.refresh_interval(), Some(Duration::from_secs(30)));
        let manual = reg
            .create("system", &json!({"manual_refresh_only": true}))
            .unwrap();
        assert_eq!(manual.refresh_interval(), None);
    }

    #[test]
    fn settings_are_applied_when_the_widget_is_built() {
        let reg = WidgetRegistry::with_defaults();
        let civic = reg
            .create("phillyDataExplorer", &json!({"refresh_interval_secs": 120.0}))
            .unwrap();
        assert_eq!(civic.refresh_interval(), Some(Duration::from_secs(120)));
        assert_eq!(civic.title(), "Philly Data Explorer");
        let transit = reg
            .create("septa", &json!({"manual_refresh_only": true, "feed": "detours"}))
            .unwrap();
        assert_eq!(transit.refresh_interval(), None);
        // Rebuilding is the only way to change settings.
        let rebuilt = reg.create("septa", &Value::Null).unwrap();
        assert_eq!(rebuilt.refresh_interval(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        assert_eq!(refresh_every(0.0, false), Some(Duration::from_secs(1)));
        assert_eq!(refresh_every(5.0, true), None);
    }
}
