//! City of Philadelphia open data: tobacco retailer permits and demolitions
//! filtered by postal code, and the historic landmark points.

use super::{get_text, Adapter, ErrorPolicy};
use crate::model::{CivicRecords, Demolition, Landmark, TobaccoPermit};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const ARCGIS_BASE: &str = "https://services.arcgis.com/fLeGjb7u4uXqeF9q/arcgis/rest/services";
const CARTO_SQL: &str = "https://phl.carto.com/api/v2/sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CivicDataset {
    #[default]
    Permits,
    Demolitions,
    Landmarks,
}

impl CivicDataset {
    pub const ALL: [CivicDataset; 3] = [
        CivicDataset::Permits,
        CivicDataset::Demolitions,
        CivicDataset::Landmarks,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CivicDataset::Permits => "Tobacco Permits",
            CivicDataset::Demolitions => "Building Demolitions",
            CivicDataset::Landmarks => "Philadelphia Landmarks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivicParams {
    pub dataset: CivicDataset,
    pub postal_code: String,
}

#[derive(Default)]
pub struct PhillyDataAdapter;

#[derive(Debug, Deserialize)]
struct ArcGisResponse<A> {
    #[serde(default = "Vec::new")]
    features: Vec<ArcGisFeature<A>>,
}

#[derive(Debug, Deserialize)]
struct ArcGisFeature<A> {
    attributes: A,
    #[serde(default)]
    geometry: Option<Point>,
}

#[derive(Debug, Deserialize)]
struct Point {
    x: f64,
    y: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
struct PermitAttributes {
    business_name: Option<String>,
    street_address: Option<String>,
    permit_year: Option<serde_json::Value>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
struct LandmarkAttributes {
    name: Option<String>,
    subtype: Option<String>,
    parent_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CartoResponse {
    #[serde(default)]
    rows: Vec<DemolitionRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DemolitionRow {
    address: Option<String>,
    demolition_date: Option<String>,
    reason: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

fn permits_url(postal_code: &str) -> String {
    let filter = urlencoding::encode(&format!("ZIP_CODE='{postal_code}'")).into_owned();
    format!(
        "{ARCGIS_BASE}/Tobacco_Retailer_Permits/FeatureServer/0/query?where={filter}\
         &outFields=BUSINESS_NAME,STREET_ADDRESS,PERMIT_YEAR,LATITUDE,LONGITUDE&f=json"
    )
}

fn demolitions_url(postal_code: &str) -> String {
    let query = format!(
        "SELECT address, demolition_date, reason, latitude, longitude FROM demolitions \
         WHERE zip_code = '{postal_code}' ORDER BY demolition_date DESC LIMIT 50"
    );
    format!("{CARTO_SQL}?q={}", urlencoding::encode(&query))
}

fn landmarks_url() -> String {
    format!("{ARCGIS_BASE}/Landmark_Points/FeatureServer/0/query?outFields=*&where=1%3D1&f=json")
}

fn year_text(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn parse_permits(body: &str) -> Result<Vec<TobaccoPermit>> {
    let resp: ArcGisResponse<PermitAttributes> =
        serde_json::from_str(body).context("parse tobacco permits")?;
    Ok(resp
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, f)| {
            let a = f.attributes;
            TobaccoPermit {
                id: format!("permit-{idx}"),
                business_name: a.business_name.unwrap_or_else(|| "Unknown Business".into()),
                street_address: a.street_address.unwrap_or_else(|| "Address not available".into()),
                permit_year: year_text(a.permit_year),
                latitude: a.latitude.unwrap_or_default(),
                longitude: a.longitude.unwrap_or_default(),
            }
        })
        .collect())
}

pub(crate) fn parse_demolitions(body: &str) -> Result<Vec<Demolition>> {
    let resp: CartoResponse = serde_json::from_str(body).context("parse demolitions")?;
    Ok(resp
        .rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| Demolition {
            id: format!("demolition-{idx}"),
            address: row.address.unwrap_or_else(|| "Address not available".into()),
            demolition_date: row.demolition_date.unwrap_or_default(),
            reason: row.reason.unwrap_or_else(|| "Not specified".into()),
            latitude: row.latitude.unwrap_or_default(),
            longitude: row.longitude.unwrap_or_default(),
        })
        .collect())
}

pub(crate) fn parse_landmarks(body: &str) -> Result<Vec<Landmark>> {
    let resp: ArcGisResponse<LandmarkAttributes> =
        serde_json::from_str(body).context("parse landmarks")?;
    Ok(resp
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, f)| {
            let (longitude, latitude) = f.geometry.map(|p| (p.x, p.y)).unwrap_or_default();
            let a = f.attributes;
            Landmark {
                id: format!("landmark-{idx}"),
                name: a.name.unwrap_or_else(|| "Unknown Landmark".into()),
                subtype: a.subtype.unwrap_or_default(),
                parent_name: a.parent_name.unwrap_or_default(),
                latitude,
                longitude,
            }
        })
        .collect())
}

impl Adapter for PhillyDataAdapter {
    type Params = CivicParams;
    type Output = CivicRecords;

    fn name(&self) -> &'static str {
        "philly_data"
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Fallback
    }

    fn fetch(&self, params: &CivicParams) -> Result<CivicRecords> {
        match params.dataset {
            CivicDataset::Permits => {
                parse_permits(&get_text(&permits_url(&params.postal_code), "application/json")?)
                    .map(CivicRecords::Permits)
            }
            CivicDataset::Demolitions => parse_demolitions(&get_text(
                &demolitions_url(&params.postal_code),
                "application/json",
            )?)
            .map(CivicRecords::Demolitions),
            CivicDataset::Landmarks => {
                parse_landmarks(&get_text(&landmarks_url(), "application/json")?)
                    .map(CivicRecords::Landmarks)
            }
        }
    }

    fn fallback(&self, params: &CivicParams) -> Option<CivicRecords> {
        Some(sample_records(params.dataset))
    }
}

fn sample_records(dataset: CivicDataset) -> CivicRecords {
    match dataset {
        CivicDataset::Permits => CivicRecords::Permits(
            [
                ("Corner Store", "123 Main St", "2024", 40.0094, -75.1333),
                ("Gas Station Market", "456 Oak Ave", "2024", 40.0095, -75.1334),
                ("Convenience Mart", "789 Pine St", "2023", 40.0096, -75.1335),
            ]
            .into_iter()
            .enumerate()
            .map(|(idx, (name, address, year, lat, lon))| TobaccoPermit {
                id: format!("permit-{}", idx + 1),
                business_name: name.into(),
                street_address: address.into(),
                permit_year: year.into(),
                latitude: lat,
                longitude: lon,
            })
            .collect(),
        ),
        CivicDataset::Demolitions => CivicRecords::Demolitions(vec![
            Demolition {
                id: "demolition-1".into(),
                address: "123 Old Building St".into(),
                demolition_date: "2024-01-15".into(),
                reason: "Structural Issues".into(),
                latitude: 40.0094,
                longitude: -75.1333,
            },
            Demolition {
                id: "demolition-2".into(),
                address: "456 Vacant Lot Ave".into(),
                demolition_date: "2024-02-20".into(),
                reason: "Development".into(),
                latitude: 40.0095,
                longitude: -75.1334,
            },
        ]),
        CivicDataset::Landmarks => {
            let parent = "Morris Arboretum of the University of Pennsylvania";
            CivicRecords::Landmarks(vec![
                Landmark {
                    id: "landmark-1".into(),
                    name: "Swan Pond".into(),
                    subtype: "Lake / Pond / Reservoir".into(),
                    parent_name: parent.into(),
                    latitude: 40.0094,
                    longitude: -75.1333,
                },
                Landmark {
                    id: "landmark-2".into(),
                    name: "Two Lines Sculpture".into(),
                    subtype: "Fountain / Monument / Statue".into(),
                    parent_name: parent.into(),
                    latitude: 40.0095,
                    longitude: -75.1334,
                },
            ])
        }
    }
}
