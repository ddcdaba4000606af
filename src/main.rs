// Launch Countdown Application
// Main entry point

use anyhow::{anyhow, Context, Result};
use launch_countdown::services::settings::SettingsService;
use launch_countdown::ui_egui::{CountdownApp, MIN_ROOT_HEIGHT, MIN_ROOT_WIDTH};

type AppError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Initializing countdown timer...");

    let settings_service = SettingsService::from_env();
    let settings = settings_service.load().with_context(|| {
        format!(
            "Failed to load countdown settings from {}",
            settings_service.path().display()
        )
    })?;
    log::info!("Application data: {:?}", settings);

    // Ticks run on the runtime; the window owns the main thread.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let handle = runtime.handle().clone();

    let title = settings.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size([720.0, 420.0])
            .with_min_inner_size([MIN_ROOT_WIDTH, MIN_ROOT_HEIGHT]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc: &eframe::CreationContext<'_>| -> Result<Box<dyn eframe::App>, AppError> {
            Ok(Box::new(CountdownApp::new(cc, settings, handle)?))
        }),
    )
    .map_err(|e| anyhow!("Countdown window failed: {}", e))?;

    log::info!("Countdown window closed");
    Ok(())
}
