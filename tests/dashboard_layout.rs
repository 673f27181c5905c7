use eframe::egui;
use neighborhood_dashboard::dashboard::config::{DashboardConfig, WidgetSlotConfig, WidgetWidth};
use neighborhood_dashboard::dashboard::layout::{closest_center, place_entries, DashboardLayout, WidgetEntry};
use neighborhood_dashboard::dashboard::widgets::{Widget, WidgetAction, WidgetFactory, WidgetRegistry};
use neighborhood_dashboard::dashboard::{Dashboard, DashboardContext, DashboardStore, LayoutCommand};
use neighborhood_dashboard::storage::LocalStorage;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

fn layout(keys: &[&str]) -> DashboardLayout {
    DashboardLayout::from_keys(keys)
}

#[test]
fn move_to_top_and_bottom() {
    let mut l = layout(&["a", "b", "c", "d"]);
    l.move_to_top("c");
    assert_eq!(l.keys(), vec!["c", "a", "b", "d"]);
    l.move_to_bottom("c");
    assert_eq!(l.keys(), vec!["a", "b", "d", "c"]);
    l.move_to_top("a");
    assert_eq!(l.keys(), vec!["a", "b", "d", "c"]);
    l.move_to_bottom("zzz");
    assert_eq!(l.keys(), vec!["a", "b", "d", "c"]);
}

#[test]
fn reorder_takes_target_position() {
    let mut l = layout(&["a", "b", "c", "d"]);
    l.reorder("a", "c");
    assert_eq!(l.keys(), vec!["b", "c", "a", "d"]);
    l.reorder("d", "b");
    assert_eq!(l.keys(), vec!["d", "b", "c", "a"]);
    l.reorder("b", "b");
    assert_eq!(l.keys(), vec!["d", "b", "c", "a"]);
    l.reorder("b", "missing");
    assert_eq!(l.keys(), vec!["d", "b", "c", "a"]);
}

#[test]
fn hide_is_permanent_and_width_toggles() {
    let mut l = layout(&["a", "b"]);
    l.toggle_width("a");
    assert_eq!(l.width_of("a"), Some(WidgetWidth::Full));
    l.toggle_width("a");
    assert_eq!(l.width_of("a"), Some(WidgetWidth::Half));
    assert!(l.hide("a"));
    assert!(!l.hide("a"));
    l.move_to_top("a");
    assert_eq!(l.keys(), vec!["b"]);
}

#[test]
fn full_width_starts_a_new_row() {
    let entries = vec![
        WidgetEntry::new("a", WidgetWidth::Half),
        WidgetEntry::new("wide", WidgetWidth::Full),
        WidgetEntry::new("b", WidgetWidth::Half),
        WidgetEntry::new("c", WidgetWidth::Half),
        WidgetEntry::new("d", WidgetWidth::Half),
    ];
    let cells: Vec<_> = place_entries(&entries, 2)
        .into_iter()
        .map(|p| (p.key, p.row, p.col, p.col_span))
        .collect();
    assert_eq!(
        cells,
        vec![
            ("a".to_string(), 0, 0, 1),
            ("wide".to_string(), 1, 0, 2),
            ("b".to_string(), 2, 0, 1),
            ("c".to_string(), 2, 1, 1),
            ("d".to_string(), 3, 0, 1),
        ]
    );
}

#[test]
fn single_column_stacks_everything() {
    let entries = vec![
        WidgetEntry::new("a", WidgetWidth::Half),
        WidgetEntry::new("b", WidgetWidth::Full),
    ];
    let rows: Vec<_> = place_entries(&entries, 0).iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 1]);
}

#[test]
fn drop_target_is_closest_center() {
    let cards = vec![
        (
            "left".to_string(),
            egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 100.0)),
        ),
        (
            "right".to_string(),
            egui::Rect::from_min_size(egui::pos2(120.0, 0.0), egui::vec2(100.0, 100.0)),
        ),
    ];
    assert_eq!(closest_center(egui::pos2(10.0, 90.0), &cards), Some("left"));
    assert_eq!(closest_center(egui::pos2(210.0, 5.0), &cards), Some("right"));
    // Halfway between both centres keeps the first card.
    assert_eq!(closest_center(egui::pos2(110.0, 50.0), &cards), Some("left"));
    assert_eq!(closest_center(egui::pos2(0.0, 0.0), &[]), None);
}

static NOTE_REFRESHES: AtomicUsize = AtomicUsize::new(0);

#[derive(Default, Serialize, Deserialize)]
struct NoteConfig {
    #[serde(default)]
    text: String,
}

struct NoteWidget {
    text: String,
}

impl NoteWidget {
    fn new(cfg: NoteConfig) -> Self {
        Self { text: cfg.text }
    }
}

impl Widget for NoteWidget {
    fn title(&self) -> &str {
        "Note"
    }

    fn refresh(&mut self, _ctx: &DashboardContext<'_>) {
        NOTE_REFRESHES.fetch_add(1, Ordering::SeqCst);
    }

    fn render(&mut self, ui: &mut egui::Ui, _ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        ui.label(&self.text);
        None
    }
}

fn note_dashboard(keys: &[&str]) -> Dashboard {
    let mut registry = WidgetRegistry::default();
    for key in keys {
        registry.register(key, WidgetFactory::new(NoteWidget::new));
    }
    let cfg = DashboardConfig {
        version: 1,
        columns: 2,
        widgets: keys.iter().map(|k| WidgetSlotConfig::with_widget(k)).collect(),
    };
    Dashboard::new(cfg, registry)
}

#[test]
fn composer_renders_cards_and_applies_commands() {
    let store = DashboardStore::new();
    let storage = LocalStorage::in_memory();
    let ctx = DashboardContext {
        postal_code: "19129",
        store: &store,
        storage: &storage,
    };
    let mut dashboard = note_dashboard(&["one", "two", "three"]);
    let before = NOTE_REFRESHES.load(Ordering::SeqCst);

    egui::__run_test_ui(|ui| {
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(600.0, 800.0));
        ui.allocate_ui_at_rect(rect, |ui| {
            dashboard.ui(ui, &ctx);
        });
    });

    assert_eq!(dashboard.mounted_count(), 3);
    assert!(NOTE_REFRESHES.load(Ordering::SeqCst) >= before + 3);
    let rendered: Vec<_> = dashboard.card_rects().iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(rendered, vec!["one", "two", "three"]);

    dashboard.apply(LayoutCommand::MoveToTop("three".into()), &ctx);
    dashboard.apply(LayoutCommand::Hide("one".into()), &ctx);
    assert_eq!(dashboard.layout().keys(), vec!["three", "two"]);
    assert!(!dashboard.is_mounted("one"));

    dashboard.tick(&ctx, Instant::now());
    assert!(!dashboard.is_mounted("one"));
    assert_eq!(dashboard.mounted_count(), 2);
}
