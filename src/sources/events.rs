use super::{get_text, Adapter, ErrorPolicy};
use crate::model::{Event, EventCategory};
use anyhow::{Context, Result};

const EVENTS_FEED: &str = "https://www.phillyvoice.com/feed/section/events/";
const SOURCE: &str = "PhillyVoice";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventsParams {
    pub postal_code: String,
    /// `None` keeps every category.
    pub category: Option<EventCategory>,
}

pub struct EventsAdapter {
    feed_url: String,
}

impl EventsAdapter {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
        }
    }
}

impl Default for EventsAdapter {
    fn default() -> Self {
        Self::new(EVENTS_FEED)
    }
}

impl Adapter for EventsAdapter {
    type Params = EventsParams;
    type Output = Vec<Event>;

    fn name(&self) -> &'static str {
        "events"
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Fallback
    }

    fn fetch(&self, params: &EventsParams) -> Result<Vec<Event>> {
        let body = get_text(
            &self.feed_url,
            "application/rss+xml, application/xml, text/xml",
        )?;
        let events = parse_feed(body.as_bytes(), chrono::Utc::now().timestamp())?;
        Ok(filter_category(events, params.category))
    }

    /// An unreachable feed shows as "no events" rather than invented ones.
    fn fallback(&self, _params: &EventsParams) -> Option<Vec<Event>> {
        Some(Vec::new())
    }
}

pub(crate) fn parse_feed(bytes: &[u8], now: i64) -> Result<Vec<Event>> {
    let feed = feed_rs::parser::parse(bytes).context("parse events feed")?;
    Ok(feed
        .entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let title = entry.title.map(|t| t.content.trim().to_string())?;
            let url = entry.links.first().map(|l| l.href.trim().to_string())?;
            if title.is_empty() || url.is_empty() {
                return None;
            }
            let terms: Vec<String> = entry.categories.iter().map(|c| c.term.clone()).collect();
            Some(Event {
                id: format!("pv-event-{idx}"),
                title,
                description: entry
                    .summary
                    .map(|s| s.content.trim().to_string())
                    .unwrap_or_default(),
                date: entry
                    .published
                    .or(entry.updated)
                    .map(|d| d.timestamp())
                    .unwrap_or(now),
                location: "Philadelphia Area".into(),
                category: EventCategory::classify(&terms),
                source: SOURCE.into(),
                url,
            })
        })
        .collect())
}

pub fn filter_category(events: Vec<Event>, category: Option<EventCategory>) -> Vec<Event> {
    match category {
        Some(category) => events
            .into_iter()
            .filter(|e| e.category == category)
            .collect(),
        None => events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Events</title>
    <link>https://www.phillyvoice.com</link>
    <description>Events</description>
    <item>
      <title>Jazz on the River</title>
      <link>https://www.phillyvoice.com/jazz</link>
      <description>Live music by the Schuylkill</description>
      <category>Music</category>
      <pubDate>Mon, 03 Jun 2024 14:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Family Fun Day</title>
      <link>https://www.phillyvoice.com/family</link>
      <category>Family-friendly</category>
    </item>
    <item>
      <title></title>
      <link>https://www.phillyvoice.com/untitled</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_and_classifies_items() {
        let events = parse_feed(RSS.as_bytes(), 99).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Jazz on the River");
        assert_eq!(events[0].category, EventCategory::Concert);
        assert_eq!(events[0].source, SOURCE);
        assert_eq!(events[1].category, EventCategory::Family);
        assert_eq!(events[1].date, 99);
    }

    #[test]
    fn filters_by_category() {
        let events = parse_feed(RSS.as_bytes(), 0).unwrap();
        let family = filter_category(events.clone(), Some(EventCategory::Family));
        assert_eq!(family.len(), 1);
        assert_eq!(filter_category(events, None).len(), 2);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_feed(b"not a feed", 0).is_err());
    }
}
