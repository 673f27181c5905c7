use crate::dashboard::config::DashboardConfig;
use crate::dashboard::layout::{closest_center, place_entries, DashboardLayout, Placement};
use crate::dashboard::lifecycle::WidgetStatus;
use crate::dashboard::schedule::{RefreshScheduler, RefreshSubscription};
use crate::dashboard::store::DashboardStore;
use crate::dashboard::widgets::{Widget, WidgetAction, WidgetRegistry};
use crate::storage::LocalStorage;
use eframe::egui;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::{Duration, Instant};

/// Poll interval while any widget is waiting on its adapter.
const LOADING_REPAINT: Duration = Duration::from_millis(200);

/// Context shared with widgets every frame.
pub struct DashboardContext<'a> {
    pub postal_code: &'a str,
    pub store: &'a DashboardStore,
    pub storage: &'a LocalStorage,
}

/// Changes requested through card chrome. [`Dashboard::apply`] is the only
/// place they are carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutCommand {
    Refresh(String),
    MoveToTop(String),
    MoveToBottom(String),
    ToggleWidth(String),
    Hide(String),
    Reorder { dragged: String, target: String },
}

struct MountedWidget {
    widget: Box<dyn Widget>,
    subscription: Option<RefreshSubscription>,
}

#[derive(Default)]
struct CardOutcome {
    command: Option<LayoutCommand>,
    action: Option<WidgetAction>,
    drag_started: bool,
}

pub struct Dashboard {
    layout: DashboardLayout,
    columns: usize,
    settings: HashMap<String, Value>,
    mounted: HashMap<String, MountedWidget>,
    registry: WidgetRegistry,
    scheduler: RefreshScheduler,
    unknown: HashSet<String>,
    dragging: Option<String>,
    card_rects: Vec<(String, egui::Rect)>,
    pub warnings: Vec<String>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, registry: WidgetRegistry) -> Self {
        let layout = DashboardLayout::from_config(&config);
        let settings = config
            .widgets
            .iter()
            .map(|slot| (slot.key.clone(), slot.settings.clone()))
            .collect();
        Self {
            layout,
            columns: config.columns.max(1) as usize,
            settings,
            mounted: HashMap::new(),
            registry,
            scheduler: RefreshScheduler::new(),
            unknown: HashSet::new(),
            dragging: None,
            card_rects: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Build the dashboard from the config file at `path`. An unreadable
    /// file falls back to the built-in widget list.
    pub fn load(path: impl AsRef<Path>, registry: WidgetRegistry) -> Self {
        let path = path.as_ref();
        let (cfg, warnings) = match DashboardConfig::load(path, &registry) {
            Ok(cfg) => (cfg, Vec::new()),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load dashboard config");
                let mut cfg = DashboardConfig::default();
                cfg.sanitize(&registry);
                (cfg, vec![format!("{e:#}")])
            }
        };
        let mut dashboard = Self::new(cfg, registry);
        dashboard.warnings = warnings;
        dashboard
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn layout(&self) -> &DashboardLayout {
        &self.layout
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn is_mounted(&self, key: &str) -> bool {
        self.mounted.contains_key(key)
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Card rectangles from the last rendered frame, in layout order.
    pub fn card_rects(&self) -> &[(String, egui::Rect)] {
        &self.card_rects
    }

    pub fn widget(&self, key: &str) -> Option<&dyn Widget> {
        self.mounted.get(key).map(|m| m.widget.as_ref())
    }

    /// Mount widgets that appeared, fire due timers and collect results.
    pub fn tick(&mut self, ctx: &DashboardContext<'_>, now: Instant) {
        self.sync_mounted(ctx, now);
        for mounted in self.mounted.values_mut() {
            if let Some(sub) = &mounted.subscription {
                if sub.is_due(now) {
                    mounted.widget.refresh(ctx);
                    sub.mark_refreshed(now);
                }
            }
            mounted.widget.poll(ctx);
        }
    }

    fn sync_mounted(&mut self, ctx: &DashboardContext<'_>, now: Instant) {
        let layout = &self.layout;
        self.mounted.retain(|key, _| layout.contains(key));
        for entry in self.layout.entries() {
            if self.mounted.contains_key(&entry.key) || self.unknown.contains(&entry.key) {
                continue;
            }
            let settings = self.settings.get(&entry.key).cloned().unwrap_or(Value::Null);
            let Some(mut widget) = self.registry.create(&entry.key, &settings) else {
                tracing::warn!(widget = %entry.key, "no widget registered for key");
                self.unknown.insert(entry.key.clone());
                continue;
            };
            tracing::debug!(widget = %entry.key, "mounting widget");
            widget.refresh(ctx);
            let subscription = widget
                .refresh_interval()
                .map(|interval| self.scheduler.subscribe(interval, now));
            self.mounted.insert(
                entry.key.clone(),
                MountedWidget {
                    widget,
                    subscription,
                },
            );
        }
    }

    pub fn apply(&mut self, command: LayoutCommand, ctx: &DashboardContext<'_>) {
        tracing::debug!(?command, "dashboard command");
        match command {
            LayoutCommand::Refresh(key) => {
                if let Some(mounted) = self.mounted.get_mut(&key) {
                    mounted.widget.refresh(ctx);
                    if let Some(sub) = &mounted.subscription {
                        sub.mark_refreshed(Instant::now());
                    }
                }
            }
            LayoutCommand::MoveToTop(key) => self.layout.move_to_top(&key),
            LayoutCommand::MoveToBottom(key) => self.layout.move_to_bottom(&key),
            LayoutCommand::ToggleWidth(key) => self.layout.toggle_width(&key),
            LayoutCommand::Hide(key) => {
                if self.layout.hide(&key) {
                    self.mounted.remove(&key);
                    tracing::info!(widget = %key, "widget hidden for this session");
                }
            }
            LayoutCommand::Reorder { dragged, target } => self.layout.reorder(&dragged, &target),
        }
    }

    pub fn begin_drag(&mut self, key: &str) {
        if self.layout.contains(key) {
            self.dragging = Some(key.to_string());
        }
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Finish a drag at `pointer`, resolving the drop target against the
    /// cards rendered in the last frame.
    pub fn end_drag(&mut self, pointer: egui::Pos2) -> Option<LayoutCommand> {
        let dragged = self.dragging.take()?;
        let target = closest_center(pointer, &self.card_rects)?;
        if target == dragged {
            return None;
        }
        Some(LayoutCommand::Reorder {
            dragged,
            target: target.to_string(),
        })
    }

    fn placements(&self) -> Vec<Placement> {
        let visible: Vec<_> = self
            .layout
            .entries()
            .iter()
            .filter(|e| self.mounted.contains_key(&e.key))
            .cloned()
            .collect();
        place_entries(&visible, self.columns)
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let now = Instant::now();
        self.tick(ctx, now);

        let placements = self.placements();
        let spacing = ui.spacing().item_spacing.x;
        let columns = self.columns as f32;
        let col_width = ((ui.available_width() - spacing * (columns - 1.0)) / columns).max(120.0);

        let mut commands = Vec::new();
        let mut action = None;
        let mut rects = Vec::with_capacity(placements.len());
        let mut drag_started = None;

        let mut rows: Vec<Vec<&Placement>> = Vec::new();
        for p in &placements {
            if rows.len() <= p.row {
                rows.resize_with(p.row + 1, Vec::new);
            }
            rows[p.row].push(p);
        }

        for row in rows.iter().filter(|r| !r.is_empty()) {
            ui.horizontal_top(|ui| {
                for p in row {
                    let Some(mounted) = self.mounted.get_mut(&p.key) else {
                        continue;
                    };
                    let span = p.col_span as f32;
                    let width = col_width * span + spacing * (span - 1.0);
                    let dragging = self.dragging.as_deref() == Some(p.key.as_str());
                    let resp = ui.allocate_ui_with_layout(
                        egui::vec2(width, 0.0),
                        egui::Layout::top_down(egui::Align::Min),
                        |ui| {
                            ui.set_width(width);
                            Self::render_card(&p.key, mounted, ui, ctx, dragging)
                        },
                    );
                    rects.push((p.key.clone(), resp.response.rect));
                    let outcome = resp.inner;
                    if outcome.drag_started {
                        drag_started = Some(p.key.clone());
                    }
                    commands.extend(outcome.command);
                    action = action.take().or(outcome.action);
                }
            });
        }
        self.card_rects = rects;

        if let Some(key) = drag_started {
            self.begin_drag(&key);
        }
        if self.dragging.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
            let (released, pointer) =
                ui.input(|i| (i.pointer.primary_released(), i.pointer.interact_pos()));
            if released {
                match pointer {
                    Some(pos) => commands.extend(self.end_drag(pos)),
                    None => self.dragging = None,
                }
            }
        }

        for command in commands {
            self.apply(command, ctx);
        }

        let loading = self
            .mounted
            .values()
            .any(|m| matches!(m.widget.status(), Some(WidgetStatus::Loading)));
        if loading {
            ui.ctx().request_repaint_after(LOADING_REPAINT);
        }
        if let Some(deadline) = self.scheduler.next_deadline() {
            ui.ctx()
                .request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
        action
    }

    fn render_card(
        key: &str,
        mounted: &mut MountedWidget,
        ui: &mut egui::Ui,
        ctx: &DashboardContext<'_>,
        dragging: bool,
    ) -> CardOutcome {
        let mut outcome = CardOutcome::default();
        let mut frame = egui::Frame::group(ui.style());
        if dragging {
            frame = frame.stroke(ui.visuals().selection.stroke);
        }
        frame.show(ui, |ui| {
            ui.horizontal(|ui| {
                let handle = ui
                    .add(egui::Label::new("⠿").sense(egui::Sense::drag()))
                    .on_hover_cursor(egui::CursorIcon::Grab)
                    .on_hover_text("Drag to reorder");
                outcome.drag_started = handle.drag_started();
                ui.strong(mounted.widget.title());
                outcome.action = mounted.widget.header_ui(ui, ctx);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    outcome.command = chrome_buttons(ui, key);
                });
            });
            ui.separator();
            let body = mounted.widget.render(ui, ctx);
            outcome.action = outcome.action.take().or(body);
        });
        outcome
    }
}

fn chrome_buttons(ui: &mut egui::Ui, key: &str) -> Option<LayoutCommand> {
    let mut command = None;
    if ui.small_button("✕").on_hover_text("Hide").clicked() {
        command = Some(LayoutCommand::Hide(key.to_string()));
    }
    if ui.small_button("⇔").on_hover_text("Toggle width").clicked() {
        command = Some(LayoutCommand::ToggleWidth(key.to_string()));
    }
    if ui.small_button("▼").on_hover_text("Move to bottom").clicked() {
        command = Some(LayoutCommand::MoveToBottom(key.to_string()));
    }
    if ui.small_button("▲").on_hover_text("Move to top").clicked() {
        command = Some(LayoutCommand::MoveToTop(key.to_string()));
    }
    if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
        command = Some(LayoutCommand::Refresh(key.to_string()));
    }
    command
}
