//! SEPTA public transit feeds: route alerts, bus detours and elevator
//! outages. The endpoints need no key; failures fall back to a short sample
//! list so the card still explains what it would show.

use super::{get_text, Adapter, ErrorPolicy};
use crate::model::{BusDetour, ElevatorOutage, SeptaAlert, TransitUpdates};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const ALERTS_URL: &str = "https://www3.septa.org/api/Alerts/get_alert_data.php";
const DETOURS_URL: &str = "https://www3.septa.org/api/BusDetours/";
const ELEVATORS_URL: &str = "https://www3.septa.org/api/elevator/index.php";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitFeed {
    #[default]
    Alerts,
    Detours,
    Elevators,
}

impl TransitFeed {
    pub const ALL: [TransitFeed; 3] = [TransitFeed::Alerts, TransitFeed::Detours, TransitFeed::Elevators];

    pub fn label(&self) -> &'static str {
        match self {
            TransitFeed::Alerts => "SEPTA Alerts",
            TransitFeed::Detours => "Bus Detours",
            TransitFeed::Elevators => "Elevator Outages",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TransitFeed::Alerts => "Current service alerts and advisories",
            TransitFeed::Detours => "Current bus route detours and changes",
            TransitFeed::Elevators => "Elevator and accessibility information",
        }
    }
}

#[derive(Default)]
pub struct SeptaAdapter;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAlert {
    route_id: Option<String>,
    route_name: Option<String>,
    current_message: Option<String>,
    advisory_message: Option<String>,
    detour_message: Option<String>,
    detour_start_location: Option<String>,
    last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDetourRoute {
    route_id: String,
    #[serde(default)]
    route_info: Vec<RawDetour>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDetour {
    route_direction: String,
    reason: String,
    start_location: String,
    end_location: String,
    start_date_time: String,
    end_date_time: String,
    current_message: String,
}

#[derive(Debug, Deserialize)]
struct RawElevatorResponse {
    results: Vec<RawOutage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOutage {
    line: Option<String>,
    station: Option<String>,
    elevator: Option<String>,
    message: Option<String>,
    alternate_url: Option<String>,
}

/// SEPTA sends empty strings for absent messages.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_alerts(body: &str) -> Result<Vec<SeptaAlert>> {
    let raw: Vec<Option<RawAlert>> = serde_json::from_str(body).context("parse septa alerts")?;
    Ok(raw
        .into_iter()
        .flatten()
        .filter_map(|alert| {
            let route_id = present(alert.route_id.clone())?;
            Some((route_id, alert))
        })
        .enumerate()
        .map(|(idx, (route_id, alert))| SeptaAlert {
            id: format!("alert-{idx}"),
            route_id,
            route_name: present(alert.route_name).unwrap_or_else(|| "Unknown Route".into()),
            current_message: present(alert.current_message),
            advisory_message: present(alert.advisory_message),
            detour_message: present(alert.detour_message),
            detour_start_location: present(alert.detour_start_location),
            last_updated: alert.last_updated.unwrap_or_default(),
        })
        .collect())
}

pub(crate) fn parse_detours(body: &str) -> Result<Vec<BusDetour>> {
    let routes: Vec<RawDetourRoute> = serde_json::from_str(body).context("parse septa detours")?;
    Ok(routes
        .into_iter()
        .flat_map(|route| {
            let route_id = route.route_id;
            route
                .route_info
                .into_iter()
                .enumerate()
                .map(move |(idx, d)| BusDetour {
                    id: format!("detour-{route_id}-{idx}"),
                    route_id: route_id.clone(),
                    direction: d.route_direction,
                    reason: d.reason,
                    start_location: d.start_location,
                    end_location: d.end_location,
                    start_time: d.start_date_time,
                    end_time: d.end_date_time,
                    message: d.current_message,
                })
        })
        .collect())
}

pub(crate) fn parse_elevators(body: &str) -> Result<Vec<ElevatorOutage>> {
    let resp: RawElevatorResponse =
        serde_json::from_str(body).context("parse septa elevator outages")?;
    Ok(resp
        .results
        .into_iter()
        .enumerate()
        .map(|(idx, o)| ElevatorOutage {
            id: format!("elevator-{idx}"),
            line: present(o.line).unwrap_or_else(|| "Unknown Line".into()),
            station: present(o.station).unwrap_or_else(|| "Unknown Station".into()),
            elevator: present(o.elevator).unwrap_or_else(|| "Unknown Elevator".into()),
            message: present(o.message).unwrap_or_else(|| "No access".into()),
            alternate_url: present(o.alternate_url),
        })
        .collect())
}

impl Adapter for SeptaAdapter {
    type Params = TransitFeed;
    type Output = TransitUpdates;

    fn name(&self) -> &'static str {
        "septa"
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Fallback
    }

    fn fetch(&self, feed: &TransitFeed) -> Result<TransitUpdates> {
        match feed {
            TransitFeed::Alerts => {
                parse_alerts(&get_text(ALERTS_URL, "application/json")?).map(TransitUpdates::Alerts)
            }
            TransitFeed::Detours => {
                parse_detours(&get_text(DETOURS_URL, "application/json")?).map(TransitUpdates::Detours)
            }
            TransitFeed::Elevators => parse_elevators(&get_text(ELEVATORS_URL, "application/json")?)
                .map(TransitUpdates::Elevators),
        }
    }

    fn fallback(&self, feed: &TransitFeed) -> Option<TransitUpdates> {
        Some(sample_updates(*feed))
    }
}

fn sample_updates(feed: TransitFeed) -> TransitUpdates {
    match feed {
        TransitFeed::Alerts => TransitUpdates::Alerts(vec![
            SeptaAlert {
                id: "alert-1".into(),
                route_id: "bus_route_1".into(),
                route_name: "Route 1".into(),
                current_message: Some("Route 1 experiencing delays due to construction".into()),
                advisory_message: None,
                detour_message: Some("Route 1 detoured due to road work".into()),
                detour_start_location: Some("Main St & Oak Ave".into()),
                last_updated: "2024-01-15 10:30 AM".into(),
            },
            SeptaAlert {
                id: "alert-2".into(),
                route_id: "rr_route_bsl".into(),
                route_name: "Broad Street Line".into(),
                current_message: Some("Broad Street Line operating normally".into()),
                advisory_message: Some(
                    "Broad Street Line is now the \"B\" as part of system-wide wayfinding improvements"
                        .into(),
                ),
                detour_message: None,
                detour_start_location: None,
                last_updated: "2024-01-15 09:15 AM".into(),
            },
        ]),
        TransitFeed::Detours => TransitUpdates::Detours(vec![
            BusDetour {
                id: "detour-1".into(),
                route_id: "1".into(),
                direction: "NB".into(),
                reason: "Construction".into(),
                start_location: "Main St & Oak Ave".into(),
                end_location: "Main St & Pine St".into(),
                start_time: "2024-01-15 6:00 AM".into(),
                end_time: "2024-02-15 6:00 PM".into(),
                message: "Route 1 Northbound detoured due to construction".into(),
            },
            BusDetour {
                id: "detour-2".into(),
                route_id: "2".into(),
                direction: "SB".into(),
                reason: "Road Work".into(),
                start_location: "Broad St & Market St".into(),
                end_location: "Broad St & South St".into(),
                start_time: "2024-01-20 7:00 AM".into(),
                end_time: "2024-01-25 7:00 PM".into(),
                message: "Route 2 Southbound detoured due to road work".into(),
            },
        ]),
        TransitFeed::Elevators => TransitUpdates::Elevators(vec![
            ElevatorOutage {
                id: "elevator-1".into(),
                line: "Broad Street Subway".into(),
                station: "Walnut-Locust".into(),
                elevator: "Street to Concourse".into(),
                message: "No access to/from station".into(),
                alternate_url: Some(
                    "https://www5.septa.org/about/accessibility/alternative-transportation/bsl-alternate/"
                        .into(),
                ),
            },
            ElevatorOutage {
                id: "elevator-2".into(),
                line: "Market Frankford Line".into(),
                station: "Somerset".into(),
                elevator: "Westbound".into(),
                message: "No access to/from station".into(),
                alternate_url: Some(
                    "https://www5.septa.org/about/accessibility/alternative-transportation/mfl-alternate/"
                        .into(),
                ),
            },
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_skip_null_and_routeless_entries() {
        let body = r#"[
            null,
            {"route_id": "", "route_name": "Nothing"},
            {"route_id": "bus_route_47", "route_name": "47", "current_message": "",
             "advisory_message": "Stop relocated", "last_updated": "Jan 2 2025"},
            {"route_id": "rr_route_chw", "route_name": "Chestnut Hill West"}
        ]"#;
        let alerts = parse_alerts(body).unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].id, "alert-0");
        assert_eq!(alerts[0].current_message, None);
        assert_eq!(alerts[0].headline(), Some("Stop relocated"));
        assert_eq!(alerts[1].headline(), None);
    }

    #[test]
    fn detours_flatten_per_route() {
        let body = r#"[
            {"route_id": "32", "route_info": [
                {"route_direction": "NB", "reason": "Paving", "start_location": "A",
                 "end_location": "B", "start_date_time": "x", "end_date_time": "y",
                 "current_message": "Detour in effect"},
                {"route_direction": "SB", "reason": "Paving"}
            ]},
            {"route_id": "61", "route_info": []}
        ]"#;
        let detours = parse_detours(body).unwrap();
        assert_eq!(detours.len(), 2);
        assert_eq!(detours[0].id, "detour-32-0");
        assert_eq!(detours[1].direction, "SB");
        assert!(detours[1].message.is_empty());
    }

    #[test]
    fn elevator_outages_fill_missing_fields() {
        let body = r#"{"meta": {"elevators_out": 1}, "results": [
            {"line": "Market Frankford Line", "station": "Somerset", "alternate_url": ""}
        ]}"#;
        let outages = parse_elevators(body).unwrap();
        assert_eq!(outages[0].elevator, "Unknown Elevator");
        assert_eq!(outages[0].message, "No access");
        assert_eq!(outages[0].alternate_url, None);
        assert!(parse_elevators("[]").is_err());
    }

    #[test]
    fn fallback_matches_requested_feed() {
        let adapter = SeptaAdapter;
        for feed in TransitFeed::ALL {
            let updates = adapter.fallback(&feed).unwrap();
            assert!(!updates.is_empty());
            let matches = matches!(
                (feed, &updates),
                (TransitFeed::Alerts, TransitUpdates::Alerts(_))
                    | (TransitFeed::Detours, TransitUpdates::Detours(_))
                    | (TransitFeed::Elevators, TransitUpdates::Elevators(_))
            );
            assert!(matches, "{feed:?} fallback returned {updates:?}");
        }
    }
}
