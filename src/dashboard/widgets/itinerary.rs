//! Day planner built on whatever the other widgets have fetched.
//!
//! The free text and the focus toggles persist in local storage. The
//! "Copy prompt" button turns the toggles and the shared store into a
//! prompt for an assistant of the user's choice.

use super::{Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::store::SharedDashboardState;
use eframe::egui;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const ITINERARY_KEY: &str = "itinerary";
pub const TOGGLES_KEY: &str = "itinerary-toggles";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryConfig {
    #[serde(default = "default_city")]
    pub city: String,
}

fn default_city() -> String {
    "Philadelphia".into()
}

impl Default for ItineraryConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItineraryToggles {
    pub dog_friendly: bool,
    pub healthy: bool,
    pub food: bool,
    pub family_friendly: bool,
    pub shopping: bool,
    pub enjoy_weather: bool,
    pub city_day: bool,
    pub relax: bool,
}

impl ItineraryToggles {
    fn entries_mut(&mut self) -> [(&'static str, &mut bool); 8] {
        [
            ("Dog friendly", &mut self.dog_friendly),
            ("Healthy", &mut self.healthy),
            ("Food", &mut self.food),
            ("Family friendly", &mut self.family_friendly),
            ("Shopping", &mut self.shopping),
            ("Enjoy weather", &mut self.enjoy_weather),
            ("City day", &mut self.city_day),
            ("Relax", &mut self.relax),
        ]
    }

    pub fn active(&self) -> Vec<&'static str> {
        [
            ("dog friendly", self.dog_friendly),
            ("healthy", self.healthy),
            ("food", self.food),
            ("family friendly", self.family_friendly),
            ("shopping", self.shopping),
            ("enjoy the weather", self.enjoy_weather),
            ("city day", self.city_day),
            ("relax", self.relax),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

/// Compose the itinerary prompt from the focus toggles and shared data.
pub fn build_prompt(city: &str, toggles: &ItineraryToggles, state: &SharedDashboardState) -> String {
    let mut prompt =
        format!("You are knowledgeable about the city of {city}. Make an itinerary for someone to do for today.");
    let active = toggles.active();
    if !active.is_empty() {
        prompt.push_str(&format!(" Focus on: {}.", active.join(", ")));
    }
    let context = json!({
        "weather": state.weather,
        "events": state.events,
        "news": state.news,
        "reddit": state.reddit.posts,
    });
    let context = serde_json::to_string_pretty(&context).unwrap_or_default();
    prompt.push_str("\n\nUse this context data: ");
    prompt.push_str(&context);
    prompt
}

pub struct ItineraryWidget {
    cfg: ItineraryConfig,
    text: String,
    toggles: ItineraryToggles,
    loaded: bool,
    copied: bool,
}

impl ItineraryWidget {
    pub fn new(cfg: ItineraryConfig) -> Self {
        Self {
            cfg,
            text: String::new(),
            toggles: ItineraryToggles::default(),
            loaded: false,
            copied: false,
        }
    }

    fn ensure_loaded(&mut self, ctx: &DashboardContext<'_>) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        if let Some(text) = ctx.storage.get(ITINERARY_KEY) {
            self.text = text;
        }
        if let Some(raw) = ctx.storage.get(TOGGLES_KEY) {
            match serde_json::from_str(&raw) {
                Ok(toggles) => self.toggles = toggles,
                Err(e) => tracing::warn!(error = %e, "ignoring stored itinerary toggles"),
            }
        }
    }

    fn save_text(&self, ctx: &DashboardContext<'_>) {
        if let Err(e) = ctx.storage.set(ITINERARY_KEY, &self.text) {
            tracing::warn!(error = %e, "failed to save itinerary");
        }
    }

    fn save_toggles(&self, ctx: &DashboardContext<'_>) {
        let saved = serde_json::to_string(&self.toggles)
            .map_err(anyhow::Error::from)
            .and_then(|raw| ctx.storage.set(TOGGLES_KEY, &raw));
        if let Err(e) = saved {
            tracing::warn!(error = %e, "failed to save itinerary toggles");
        }
    }
}

impl Widget for ItineraryWidget {
    fn title(&self) -> &str {
        "Itinerary"
    }

    fn refresh(&mut self, ctx: &DashboardContext<'_>) {
        self.ensure_loaded(ctx);
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        self.ensure_loaded(ctx);

        let mut toggles_changed = false;
        egui::Grid::new("itinerary_toggles")
            .num_columns(2)
            .show(ui, |ui| {
                for (idx, (label, on)) in self.toggles.entries_mut().into_iter().enumerate() {
                    toggles_changed |= ui.toggle_value(on, label).changed();
                    if idx % 2 == 1 {
                        ui.end_row();
                    }
                }
            });
        if toggles_changed {
            self.save_toggles(ctx);
        }

        ui.horizontal(|ui| {
            if ui.button("Copy prompt").clicked() {
                let prompt = build_prompt(&self.cfg.city, &self.toggles, &ctx.store.snapshot());
                ui.output_mut(|o| o.copied_text = prompt);
                self.copied = true;
            }
            if self.copied {
                ui.weak("Copied to clipboard.");
            }
        });

        let resp = ui.add(
            egui::TextEdit::multiline(&mut self.text)
                .hint_text("Plan your day…")
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );
        if resp.changed() {
            self.save_text(ctx);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RedditPost, WeatherData, WeatherIcon};

    #[test]
    fn prompt_lists_active_toggles() {
        let toggles = ItineraryToggles {
            food: true,
            relax: true,
            ..Default::default()
        };
        let prompt = build_prompt("Philadelphia", &toggles, &SharedDashboardState::default());
        assert!(prompt.starts_with("You are knowledgeable about the city of Philadelphia."));
        assert!(prompt.contains("Focus on: food, relax."));
        assert!(prompt.contains("\"weather\": null"));
    }

    #[test]
    fn prompt_without_toggles_has_no_focus() {
        let prompt = build_prompt(
            "Philadelphia",
            &ItineraryToggles::default(),
            &SharedDashboardState::default(),
        );
        assert!(!prompt.contains("Focus on"));
    }

    #[test]
    fn prompt_embeds_shared_data() {
        let mut state = SharedDashboardState::default();
        state.weather = Some(WeatherData {
            temperature: 71,
            condition: "Sunny".into(),
            icon: WeatherIcon::Sun,
            feels_like: 71,
            humidity: 60,
            wind_speed: 5,
            forecast: Vec::new(),
        });
        state.reddit.posts.push(RedditPost {
            id: "x".into(),
            title: "Dog park recommendations".into(),
            url: "https://www.reddit.com/r/philly/x".into(),
            score: 1,
            num_comments: 0,
            created: 0,
            subreddit: "r/philly".into(),
            author: "a".into(),
            content: None,
        });
        let prompt = build_prompt("Philadelphia", &ItineraryToggles::default(), &state);
        assert!(prompt.contains("\"temperature\": 71"));
        assert!(prompt.contains("Dog park recommendations"));
    }

    #[test]
    fn toggles_use_camel_case_keys() {
        let toggles = ItineraryToggles {
            dog_friendly: true,
            ..Default::default()
        };
        let raw = serde_json::to_string(&toggles).unwrap();
        assert!(raw.contains("\"dogFriendly\":true"));
        let partial: ItineraryToggles = serde_json::from_str(r#"{"cityDay":true}"#).unwrap();
        assert!(partial.city_day);
        assert!(!partial.food);
    }
}
