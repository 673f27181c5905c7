use super::{fallback_note, refresh_every, status_banner, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::lifecycle::{FallbackHandling, Feed, WidgetStatus};
use crate::model::CivicRecords;
use crate::sources::{Adapter, CivicDataset, CivicParams, PhillyDataAdapter};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_refresh_interval() -> f32 {
    60.0 * 60.0
}

fn default_max_items() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CivicDataConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f32,
    #[serde(default)]
    pub manual_refresh_only: bool,
    #[serde(default)]
    pub dataset: CivicDataset,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for CivicDataConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            manual_refresh_only: false,
            dataset: CivicDataset::default(),
            max_items: default_max_items(),
        }
    }
}

/// Google Maps search for a place. Records without coordinates are searched
/// by address instead.
pub fn maps_url(query: &str, latitude: f64, longitude: f64) -> String {
    let q = if latitude != 0.0 || longitude != 0.0 {
        format!("{latitude},{longitude}")
    } else {
        format!("{query}, Philadelphia, PA")
    };
    format!("https://www.google.com/maps?q={}", urlencoding::encode(&q))
}

struct Row {
    title: String,
    detail: String,
    map: String,
}

fn rows(records: &CivicRecords) -> Vec<Row> {
    match records {
        CivicRecords::Permits(permits) => permits
            .iter()
            .map(|p| Row {
                title: p.business_name.clone(),
                detail: format!("{} · permit {}", p.street_address, p.permit_year),
                map: maps_url(&p.street_address, p.latitude, p.longitude),
            })
            .collect(),
        CivicRecords::Demolitions(demos) => demos
            .iter()
            .map(|d| Row {
                title: d.address.clone(),
                detail: format!("{} · {}", d.demolition_date, d.reason),
                map: maps_url(&d.address, d.latitude, d.longitude),
            })
            .collect(),
        CivicRecords::Landmarks(marks) => marks
            .iter()
            .map(|l| Row {
                title: l.name.clone(),
                detail: if l.parent_name.is_empty() {
                    l.subtype.clone()
                } else {
                    format!("{} · {}", l.subtype, l.parent_name)
                },
                map: maps_url(&l.name, l.latitude, l.longitude),
            })
            .collect(),
    }
}

/// Browser for the city's open datasets near the current postal code.
pub struct CivicDataWidget<A: Adapter = PhillyDataAdapter> {
    cfg: CivicDataConfig,
    feed: Feed<A>,
    dataset: CivicDataset,
    fetched_for: Option<String>,
}

impl CivicDataWidget {
    pub fn new(cfg: CivicDataConfig) -> Self {
        Self::with_adapter(cfg, PhillyDataAdapter)
    }
}

impl<A> CivicDataWidget<A>
where
    A: Adapter<Params = CivicParams, Output = CivicRecords>,
{
    pub fn with_adapter(cfg: CivicDataConfig, adapter: A) -> Self {
        Self {
            dataset: cfg.dataset,
            cfg,
            feed: Feed::new(adapter, FallbackHandling::ShowData),
            fetched_for: None,
        }
    }

    fn dataset_picker(&mut self, ui: &mut egui::Ui) -> bool {
        let before = self.dataset;
        egui::ComboBox::from_id_source("civic_dataset")
            .selected_text(self.dataset.label())
            .show_ui(ui, |ui| {
                for dataset in CivicDataset::ALL {
                    ui.selectable_value(&mut self.dataset, dataset, dataset.label());
                }
            });
        self.dataset != before
    }
}

impl<A> Widget for CivicDataWidget<A>
where
    A: Adapter<Params = CivicParams, Output = CivicRecords>,
{
    fn title(&self) -> &str {
        "Philly Data Explorer"
    }

    fn refresh(&mut self, ctx: &DashboardContext<'_>) {
        self.fetched_for = Some(ctx.postal_code.to_string());
        self.feed.request(CivicParams {
            dataset: self.dataset,
            postal_code: ctx.postal_code.to_string(),
        });
    }

    fn poll(&mut self, ctx: &DashboardContext<'_>) {
        if self.fetched_for.as_deref() != Some(ctx.postal_code) {
            self.refresh(ctx);
        }
        self.feed.poll();
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if self.dataset_picker(ui) {
            tracing::debug!(dataset = self.dataset.label(), "civic dataset changed");
            self.refresh(ctx);
        }
        if !status_banner(ui, self.feed.status(), "No records found for this area.") {
            return None;
        }
        fallback_note(ui, self.feed.lifecycle().shows_fallback());
        let records = self.feed.data()?;
        let mut action = None;
        egui::ScrollArea::vertical()
            .id_source("civic_list")
            .max_height(260.0)
            .show(ui, |ui| {
                for row in rows(records).into_iter().take(self.cfg.max_items) {
                    ui.horizontal(|ui| {
                        ui.strong(&row.title);
                        if ui.small_button("🗺").on_hover_text("Open in Google Maps").clicked() {
                            action = Some(WidgetAction::OpenUrl(row.map.clone()));
                        }
                    });
                    ui.weak(&row.detail);
                    ui.add_space(4.0);
                }
            });
        action
    }

    fn refresh_interval(&self) -> Option<Duration> {
        refresh_every(self.cfg.refresh_interval_secs, self.cfg.manual_refresh_only)
    }

    fn status(&self) -> Option<&WidgetStatus> {
        Some(self.feed.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::lifecycle::wait_until;
    use crate::dashboard::store::DashboardStore;
    use crate::dashboard::widgets::rendered_text;
    use crate::model::TobaccoPermit;
    use crate::sources::testing::{ScriptedAdapter, Shared};
    use crate::sources::ErrorPolicy;
    use crate::storage::LocalStorage;
    use std::sync::Arc;

    type Script = ScriptedAdapter<CivicRecords, CivicParams>;

    fn permit(name: &str) -> TobaccoPermit {
        TobaccoPermit {
            id: format!("permit-{name}"),
            business_name: name.into(),
            street_address: "100 Ridge Ave".into(),
            permit_year: "2025".into(),
            latitude: 40.01,
            longitude: -75.19,
        }
    }

    fn settle(widget: &mut CivicDataWidget<Shared<Script>>, ctx: &DashboardContext<'_>) {
        assert!(wait_until(|| {
            widget.poll(ctx);
            widget.status() != Some(&WidgetStatus::Loading)
        }));
    }

    #[test]
    fn loaded_empty_and_error_render_differently() {
        let script = Arc::new(Script::for_params(
            ErrorPolicy::Propagate,
            vec![
                Ok(CivicRecords::Permits(vec![permit("Ridge Deli")])),
                Ok(CivicRecords::Permits(Vec::new())),
                Err("arcgis returned 503".into()),
            ],
        ));
        let store = DashboardStore::new();
        let storage = LocalStorage::in_memory();
        let ctx = DashboardContext {
            postal_code: "19129",
            store: &store,
            storage: &storage,
        };
        let mut widget =
            CivicDataWidget::with_adapter(CivicDataConfig::default(), Shared(Arc::clone(&script)));

        widget.refresh(&ctx);
        settle(&mut widget, &ctx);
        assert_eq!(widget.status(), Some(&WidgetStatus::Loaded));
        let loaded = rendered_text(&mut widget, &ctx);
        assert!(loaded.contains("Ridge Deli"), "{loaded}");
        assert!(loaded.contains("100 Ridge Ave · permit 2025"), "{loaded}");

        widget.refresh(&ctx);
        settle(&mut widget, &ctx);
        assert_eq!(widget.status(), Some(&WidgetStatus::Empty));
        let empty = rendered_text(&mut widget, &ctx);
        assert!(empty.contains("No records found for this area."), "{empty}");
        assert!(!empty.contains("Ridge Deli"));

        widget.refresh(&ctx);
        settle(&mut widget, &ctx);
        let failed = rendered_text(&mut widget, &ctx);
        assert!(failed.contains("arcgis returned 503"), "{failed}");
        assert!(!failed.contains("No records found"));

        let requested = script.requested.lock().unwrap();
        assert_eq!(requested.len(), 3);
        assert!(requested
            .iter()
            .all(|p| p.dataset == CivicDataset::Permits && p.postal_code == "19129"));
    }

    #[test]
    fn postal_code_change_refetches_selected_dataset() {
        let script = Arc::new(Script::for_params(
            ErrorPolicy::Propagate,
            vec![
                Ok(CivicRecords::Landmarks(Vec::new())),
                Ok(CivicRecords::Landmarks(Vec::new())),
            ],
        ));
        let store = DashboardStore::new();
        let storage = LocalStorage::in_memory();
        let cfg = CivicDataConfig {
            dataset: CivicDataset::Landmarks,
            ..CivicDataConfig::default()
        };
        let mut widget = CivicDataWidget::with_adapter(cfg, Shared(Arc::clone(&script)));

        for postal_code in ["19129", "19103"] {
            let ctx = DashboardContext {
                postal_code,
                store: &store,
                storage: &storage,
            };
            widget.poll(&ctx);
            settle(&mut widget, &ctx);
        }
        let requested = script.requested.lock().unwrap();
        assert_eq!(
            *requested,
            vec![
                CivicParams {
                    dataset: CivicDataset::Landmarks,
                    postal_code: "19129".into()
                },
                CivicParams {
                    dataset: CivicDataset::Landmarks,
                    postal_code: "19103".into()
                },
            ]
        );
    }

    #[test]
    fn map_links_prefer_coordinates() {
        assert_eq!(
            maps_url("Swan Pond", 40.0094, -75.1333),
            "https://www.google.com/maps?q=40.0094%2C-75.1333"
        );
        assert_eq!(
            maps_url("123 Main St", 0.0, 0.0),
            "https://www.google.com/maps?q=123%20Main%20St%2C%20Philadelphia%2C%20PA"
        );
    }
}
