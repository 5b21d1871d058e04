#![deny(missing_docs)]

//! Entry point for the egui price predictor.
use std::path::PathBuf;

use eframe::egui;
use homeval::config::{self, AppConfig};
use homeval::egui_app::ui::{APP_TITLE, MIN_VIEWPORT_SIZE, PredictorApp};
use homeval::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_config(std::env::args().skip(1).collect());
    let logging_settings = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    if let Err(err) = logging::init(&logging_settings) {
        eprintln!("Logging disabled: {err}");
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 520.0])
            .with_min_inner_size(MIN_VIEWPORT_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        native_options,
        Box::new(move |_cc| match loaded {
            Ok(config) => Ok(Box::new(PredictorApp::new(config.data))),
            Err(message) => {
                tracing::error!("{message}");
                Ok(Box::new(LaunchError { message }))
            }
        }),
    )?;
    Ok(())
}

/// Resolve configuration from `--config <path>` or the app root.
fn load_config(args: Vec<String>) -> Result<AppConfig, String> {
    let mut explicit: Option<PathBuf> = None;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--config" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                explicit = Some(PathBuf::from(value));
            }
            unknown => return Err(format!("Unknown argument: {unknown}")),
        }
        idx += 1;
    }
    match explicit {
        Some(path) => config::load_from(&path),
        None => config::load_or_default(),
    }
    .map_err(|err| format!("Failed to load config: {err}"))
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start price predictor");
                ui.label(&self.message);
            });
        });
    }
}
