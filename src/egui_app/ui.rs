//! egui renderer for the price predictor.

use eframe::egui::{self, Color32, RichText, Vec2};

use crate::config::DataSettings;
use crate::egui_app::state::{Banner, FormPhase, FormState};
use crate::session::{SessionId, SessionRegistry};

/// Page title shown in the window and at the top of the panel.
pub const APP_TITLE: &str = "Real Estate Price Predictor";
/// Smallest window size that still fits the form and banner.
pub const MIN_VIEWPORT_SIZE: Vec2 = Vec2::new(560.0, 360.0);

/// One window, one predictor session.
pub struct PredictorApp {
    registry: SessionRegistry,
    session: SessionId,
    form: FormState,
    visuals_set: bool,
}

impl PredictorApp {
    pub fn new(data: DataSettings) -> Self {
        let mut registry = SessionRegistry::for_data(data);
        let session = registry.open();
        Self {
            registry,
            session,
            form: FormState::default(),
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = Color32::from_rgb(18, 18, 18);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn sync_session(&mut self) {
        if self.registry.get_mut(self.session).is_none() {
            self.session = self.registry.open();
        }
        if let Some(session) = self.registry.get_mut(self.session) {
            self.form.sync(session);
        }
    }

    fn restart_session(&mut self) {
        self.session = self.registry.restart(self.session);
        self.form = FormState::default();
    }

    fn render_inputs(&mut self, ctx: &egui::Context) {
        let Some(input) = self.form.input.as_mut() else {
            return;
        };
        egui::SidePanel::left("property_details")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Enter Property Details");
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::Grid::new("feature_inputs")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            for (name, value) in input.fields_mut() {
                                ui.label(name);
                                ui.add(egui::DragValue::new(value).speed(1.0));
                                ui.end_row();
                            }
                        });
                });
            });
    }

    fn render_main(&mut self, ctx: &egui::Context) {
        let mut predict = false;
        let mut reset = false;
        let mut restart = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(APP_TITLE);
            ui.add_space(12.0);
            match self.form.phase {
                FormPhase::Loading => {
                    ui.spinner();
                }
                FormPhase::Ready => {
                    ui.horizontal(|ui| {
                        predict = ui.button("Predict Price").clicked();
                        reset = ui.button("Reset").clicked();
                    });
                }
                FormPhase::Failed => {
                    restart = ui.button("Restart session").clicked();
                }
            }
            ui.add_space(12.0);
            if let Some(banner) = &self.form.banner {
                render_banner(ui, banner);
            }
        });
        if restart {
            self.restart_session();
            return;
        }
        if reset {
            self.form.reset_values();
        }
        if predict && let Some(session) = self.registry.get_mut(self.session) {
            self.form.submit(session);
        }
    }

    fn render_status(&self, ctx: &egui::Context) {
        let status = &self.form.status;
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(&status.badge_label)
                        .color(status.badge_color)
                        .strong(),
                );
                ui.separator();
                ui.label(RichText::new(&status.text).color(Color32::LIGHT_GRAY));
            });
        });
    }
}

fn render_banner(ui: &mut egui::Ui, banner: &Banner) {
    match banner {
        Banner::Estimate(text) => {
            ui.label(
                RichText::new(text)
                    .size(20.0)
                    .color(Color32::from_rgb(90, 200, 120)),
            );
        }
        Banner::Error { message, hint } => {
            ui.colored_label(Color32::from_rgb(230, 90, 90), message);
            if let Some(hint) = hint {
                ui.colored_label(Color32::from_rgb(120, 170, 230), hint);
            }
        }
    }
}

impl eframe::App for PredictorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.sync_session();
        self.render_status(ctx);
        self.render_inputs(ctx);
        self.render_main(ctx);
    }
}
