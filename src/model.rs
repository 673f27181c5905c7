//! Payload types produced by the data source adapters and shared between
//! widgets through the dashboard store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub temperature: i32,
    pub condition: String,
    pub icon: WeatherIcon,
    pub feels_like: i32,
    pub humidity: u8,
    pub wind_speed: u32,
    pub forecast: Vec<DayForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub day: String,
    pub full_day: Option<String>,
    pub condition: String,
    pub icon: WeatherIcon,
    pub high: i32,
    pub low: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherIcon {
    Sun,
    CloudSun,
    Cloud,
    CloudRain,
    CloudSnow,
    CloudLightning,
}

impl WeatherIcon {
    /// Map a short forecast description ("Mostly Cloudy", "Chance Rain
    /// Showers") to an icon. Unrecognised text maps to `CloudSun`.
    pub fn from_description(description: &str) -> Self {
        let desc = description.to_lowercase();
        if desc.contains("sunny") || desc.contains("clear") {
            WeatherIcon::Sun
        } else if desc.contains("partly cloudy") || desc.contains("mostly cloudy") {
            WeatherIcon::CloudSun
        } else if desc.contains("cloudy") || desc.contains("overcast") {
            WeatherIcon::Cloud
        } else if desc.contains("rain") || desc.contains("showers") {
            WeatherIcon::CloudRain
        } else if desc.contains("snow") {
            WeatherIcon::CloudSnow
        } else if desc.contains("thunder") || desc.contains("storm") {
            WeatherIcon::CloudLightning
        } else {
            WeatherIcon::CloudSun
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherIcon::Sun => "☀",
            WeatherIcon::CloudSun => "⛅",
            WeatherIcon::Cloud => "☁",
            WeatherIcon::CloudRain => "🌧",
            WeatherIcon::CloudSnow => "🌨",
            WeatherIcon::CloudLightning => "🌩",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub source: String,
    pub url: String,
    /// Unix timestamp in seconds.
    pub published_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficStatus {
    Light,
    Moderate,
    Heavy,
}

impl TrafficStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TrafficStatus::Light => "Light",
            TrafficStatus::Moderate => "Moderate",
            TrafficStatus::Heavy => "Heavy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficIncident {
    pub id: String,
    pub kind: String,
    pub description: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficData {
    pub status: TrafficStatus,
    pub incidents: Vec<TrafficIncident>,
    /// Estimated commute in minutes.
    pub commute_time: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Concert,
    Festival,
    Sports,
    Tech,
    Community,
    Entertainment,
    Pride,
    Health,
    Outdoors,
    Education,
    Family,
    Holiday,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 13] = [
        EventCategory::Concert,
        EventCategory::Festival,
        EventCategory::Sports,
        EventCategory::Tech,
        EventCategory::Community,
        EventCategory::Entertainment,
        EventCategory::Pride,
        EventCategory::Health,
        EventCategory::Outdoors,
        EventCategory::Education,
        EventCategory::Family,
        EventCategory::Holiday,
        EventCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Concert => "Concerts",
            EventCategory::Festival => "Festivals",
            EventCategory::Sports => "Sports",
            EventCategory::Tech => "Tech",
            EventCategory::Community => "Community",
            EventCategory::Entertainment => "Entertainment",
            EventCategory::Pride => "Pride",
            EventCategory::Health => "Health",
            EventCategory::Outdoors => "Outdoors",
            EventCategory::Education => "Education",
            EventCategory::Family => "Family",
            EventCategory::Holiday => "Holiday",
            EventCategory::Other => "Other",
        }
    }

    /// Classify a feed item by its category terms. The first matching rule
    /// wins, in the order of the rules below.
    pub fn classify<S: AsRef<str>>(terms: &[S]) -> Self {
        const RULES: &[(EventCategory, &[&str])] = &[
            (EventCategory::Concert, &["concert", "music", "dj"]),
            (EventCategory::Festival, &["festival"]),
            (EventCategory::Sports, &["sport"]),
            (EventCategory::Tech, &["tech"]),
            (EventCategory::Community, &["community", "charity"]),
            (EventCategory::Entertainment, &["entertainment", "events"]),
            (EventCategory::Pride, &["pride", "lgbtq"]),
            (EventCategory::Health, &["health", "wellness"]),
            (EventCategory::Outdoors, &["outdoor"]),
            (
                EventCategory::Education,
                &["education", "environmental", "schuylkill"],
            ),
            (EventCategory::Family, &["family"]),
            (EventCategory::Holiday, &["holiday", "juneteenth"]),
        ];
        let lowered: Vec<String> = terms.iter().map(|t| t.as_ref().to_lowercase()).collect();
        RULES
            .iter()
            .find(|(_, needles)| {
                lowered
                    .iter()
                    .any(|term| needles.iter().any(|needle| term.contains(needle)))
            })
            .map(|(category, _)| *category)
            .unwrap_or(EventCategory::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Unix timestamp in seconds.
    pub date: i64,
    pub location: String,
    pub category: EventCategory,
    pub source: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub url: String,
    pub score: i64,
    pub num_comments: u64,
    /// Unix timestamp in seconds.
    pub created: i64,
    pub subreddit: String,
    pub author: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexQuote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub history: Vec<PricePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FearGreedRating {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl FearGreedRating {
    pub fn from_value(value: u8) -> Self {
        match value {
            0..=24 => FearGreedRating::ExtremeFear,
            25..=44 => FearGreedRating::Fear,
            45..=55 => FearGreedRating::Neutral,
            56..=75 => FearGreedRating::Greed,
            _ => FearGreedRating::ExtremeGreed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FearGreedRating::ExtremeFear => "Extreme Fear",
            FearGreedRating::Fear => "Fear",
            FearGreedRating::Neutral => "Neutral",
            FearGreedRating::Greed => "Greed",
            FearGreedRating::ExtremeGreed => "Extreme Greed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FearGreedIndex {
    pub value: u8,
    pub rating: FearGreedRating,
    pub previous_close: u8,
    pub previous_week: u8,
    pub previous_month: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageRates {
    pub thirty_year: f64,
    pub fifteen_year: f64,
    pub five_one_arm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub sp500: IndexQuote,
    pub fear_greed: FearGreedIndex,
    pub mortgage_rates: MortgageRates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub host_name: Option<String>,
    pub os: Option<String>,
    pub cpu_count: usize,
    pub cpu_percent: f32,
    pub mem_used: u64,
    pub mem_total: u64,
    pub disk_used: u64,
    pub disk_total: u64,
    pub uptime_secs: u64,
}

impl SystemMetrics {
    pub fn mem_percent(&self) -> f32 {
        percent(self.mem_used, self.mem_total)
    }

    pub fn disk_percent(&self) -> f32 {
        percent(self.disk_used, self.disk_total)
    }
}

fn percent(used: u64, total: u64) -> f32 {
    if total == 0 {
        0.0
    } else {
        (used as f64 / total as f64 * 100.0) as f32
    }
}

/// Service alert for one SEPTA route. Routes without an active message are
/// still listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeptaAlert {
    pub id: String,
    pub route_id: String,
    pub route_name: String,
    pub current_message: Option<String>,
    pub advisory_message: Option<String>,
    pub detour_message: Option<String>,
    pub detour_start_location: Option<String>,
    pub last_updated: String,
}

impl SeptaAlert {
    /// First message present, in current, advisory, detour order.
    pub fn headline(&self) -> Option<&str> {
        self.current_message
            .as_deref()
            .or(self.advisory_message.as_deref())
            .or(self.detour_message.as_deref())
    }

    pub fn is_bus(&self) -> bool {
        self.route_id.starts_with("bus_route_")
            || (!self.route_id.is_empty() && self.route_id.chars().all(|c| c.is_ascii_digit()))
    }

    pub fn is_rail(&self) -> bool {
        let name = self.route_name.to_lowercase();
        self.route_id.starts_with("rr_route_")
            || ["line", "subway", "train"].iter().any(|w| name.contains(w))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusDetour {
    pub id: String,
    pub route_id: String,
    pub direction: String,
    pub reason: String,
    pub start_location: String,
    pub end_location: String,
    pub start_time: String,
    pub end_time: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevatorOutage {
    pub id: String,
    pub line: String,
    pub station: String,
    pub elevator: String,
    pub message: String,
    pub alternate_url: Option<String>,
}

/// One of the SEPTA feeds, as selected in the transit widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransitUpdates {
    Alerts(Vec<SeptaAlert>),
    Detours(Vec<BusDetour>),
    Elevators(Vec<ElevatorOutage>),
}

impl TransitUpdates {
    pub fn len(&self) -> usize {
        match self {
            TransitUpdates::Alerts(items) => items.len(),
            TransitUpdates::Detours(items) => items.len(),
            TransitUpdates::Elevators(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TobaccoPermit {
    pub id: String,
    pub business_name: String,
    pub street_address: String,
    pub permit_year: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demolition {
    pub id: String,
    pub address: String,
    pub demolition_date: String,
    pub reason: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub subtype: String,
    pub parent_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Records from one of the city's open datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CivicRecords {
    Permits(Vec<TobaccoPermit>),
    Demolitions(Vec<Demolition>),
    Landmarks(Vec<Landmark>),
}

impl CivicRecords {
    pub fn len(&self) -> usize {
        match self {
            CivicRecords::Permits(items) => items.len(),
            CivicRecords::Demolitions(items) => items.len(),
            CivicRecords::Landmarks(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Format an age relative to `now` the way feed listings show it: `12m ago`,
/// `3h ago`, `2d ago`.
pub fn relative_age(timestamp: i64, now: i64) -> String {
    let diff = (now - timestamp).max(0);
    if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86_400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86_400)
    }
}
