use eframe::egui;
use neighborhood_dashboard::app::DashboardApp;
use neighborhood_dashboard::logging;
use neighborhood_dashboard::settings::Settings;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load("settings.json")?;
    logging::init(settings.debug_logging, settings.log_file.clone());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Neighborhood Dashboard",
        native_options,
        Box::new(move |cc| Box::new(DashboardApp::new(cc, settings))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
