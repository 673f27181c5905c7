use crate::dashboard::widgets::{WidgetAction, WidgetRegistry};
use crate::dashboard::{Dashboard, DashboardConfig, DashboardContext, DashboardStore};
use crate::postal_code::PostalCode;
use crate::settings::Settings;
use crate::storage::LocalStorage;
use eframe::egui;
use std::sync::Arc;
use std::time::Duration;

/// Top-level window: header bar with clock, postal code and theme toggle,
/// and the scrollable widget grid below it.
pub struct DashboardApp {
    postal_code: PostalCode,
    postal_input: String,
    postal_error: Option<String>,
    editing_postal: bool,
    dark_mode: bool,
    store: DashboardStore,
    storage: LocalStorage,
    dashboard: Dashboard,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let dark_mode = !matches!(cc.integration_info.system_theme, Some(eframe::Theme::Light));
        let repaint = cc.egui_ctx.clone();
        let store = DashboardStore::new().with_change_callback(Arc::new(move || {
            repaint.request_repaint();
        }));
        let app = Self::with_parts(settings, store, dark_mode);
        cc.egui_ctx.set_visuals(app.visuals());
        app
    }

    /// Assemble the app without a window, opening storage and the dashboard
    /// from the paths in `settings`.
    pub fn with_parts(settings: Settings, store: DashboardStore, dark_mode: bool) -> Self {
        let storage = match LocalStorage::open(&settings.storage_path) {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!(error = %e, "local storage unavailable; preferences will not persist");
                LocalStorage::in_memory()
            }
        };
        let path = DashboardConfig::path_for(&settings.dashboard_path);
        let mut dashboard = Dashboard::load(&path, WidgetRegistry::with_defaults());
        if let Some(columns) = settings.columns {
            dashboard = dashboard.with_columns(columns);
        }
        let postal_code = settings.postal_code();
        tracing::info!(postal_code = %postal_code, dashboard = %path.display(), "dashboard ready");
        Self {
            postal_input: postal_code.to_string(),
            postal_code,
            postal_error: None,
            editing_postal: false,
            dark_mode,
            store,
            storage,
            dashboard,
        }
    }

    pub fn postal_code(&self) -> &PostalCode {
        &self.postal_code
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    fn visuals(&self) -> egui::Visuals {
        if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        }
    }

    /// Apply the postal code typed into the header. Invalid input leaves the
    /// current code in place.
    pub fn submit_postal_code(&mut self, input: &str) -> bool {
        match PostalCode::parse(input) {
            Ok(code) => {
                if code != self.postal_code {
                    tracing::info!(postal_code = %code, "postal code changed");
                }
                self.postal_input = code.to_string();
                self.postal_code = code;
                self.postal_error = None;
                true
            }
            Err(e) => {
                self.postal_error = Some(e.to_string());
                false
            }
        }
    }

    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.editing_postal {
                let resp = ui.add(
                    egui::TextEdit::singleline(&mut self.postal_input)
                        .desired_width(64.0)
                        .char_limit(5),
                );
                let submitted = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if submitted || ui.button("Set").clicked() {
                    let input = self.postal_input.clone();
                    if self.submit_postal_code(&input) {
                        self.editing_postal = false;
                    }
                }
                if ui.button("Cancel").clicked() {
                    self.postal_input = self.postal_code.to_string();
                    self.postal_error = None;
                    self.editing_postal = false;
                }
                if let Some(err) = &self.postal_error {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
            } else if ui
                .button(egui::RichText::new(format!("🏠 {} Home Dashboard", self.postal_code)).heading())
                .on_hover_text("Change postal code")
                .clicked()
            {
                self.editing_postal = true;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let icon = if self.dark_mode { "☀" } else { "🌙" };
                let hint = if self.dark_mode {
                    "Switch to light mode"
                } else {
                    "Switch to dark mode"
                };
                if ui.button(icon).on_hover_text(hint).clicked() {
                    self.toggle_theme();
                    ui.ctx().set_visuals(self.visuals());
                }
                ui.monospace(chrono::Local::now().format("%H:%M:%S").to_string());
            });
        });
    }

    fn handle_action(action: WidgetAction) {
        match action {
            WidgetAction::OpenUrl(url) => {
                tracing::debug!(%url, "opening link");
                if let Err(e) = open::that(&url) {
                    tracing::error!(%url, error = %e, "failed to open link");
                }
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            self.header(ui);
            ui.add_space(4.0);
        });

        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let dctx = DashboardContext {
                        postal_code: self.postal_code.as_str(),
                        store: &self.store,
                        storage: &self.storage,
                    };
                    action = self.dashboard.ui(ui, &dctx);
                });
        });
        if let Some(action) = action {
            Self::handle_action(action);
        }

        // Keep the header clock ticking.
        ctx.request_repaint_after(Duration::from_secs(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn app_in(dir: &std::path::Path) -> DashboardApp {
        let settings = Settings {
            dashboard_path: dir.join("dashboard.json").to_string_lossy().into_owned(),
            storage_path: dir.join("storage.json").to_string_lossy().into_owned(),
            ..Settings::default()
        };
        DashboardApp::with_parts(settings, DashboardStore::new(), true)
    }

    #[test]
    fn postal_code_only_changes_when_valid() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());
        assert_eq!(app.postal_code().as_str(), "19129");
        assert!(!app.submit_postal_code("abc"));
        assert_eq!(app.postal_code().as_str(), "19129");
        assert!(app.postal_error.is_some());
        assert!(app.submit_postal_code("19103"));
        assert_eq!(app.postal_code().as_str(), "19103");
        assert!(app.postal_error.is_none());
    }

    #[test]
    fn theme_toggle_is_in_memory_only() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());
        assert!(app.is_dark_mode());
        app.toggle_theme();
        assert!(!app.is_dark_mode());
        assert!(!dir.path().join("settings.json").exists());
    }

    #[test]
    fn missing_dashboard_file_uses_default_widgets() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());
        assert_eq!(
            app.dashboard.layout().keys(),
            vec![
                "weather",
                "system",
                "events",
                "reddit",
                "traffic",
                "news",
                "market",
                "phillyDataExplorer",
                "septa",
                "itinerary"
            ]
        );
        assert!(app.dashboard.warnings.is_empty());
    }
}
