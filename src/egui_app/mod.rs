//! egui front end: a single form that serves predictions from a cached model.

pub mod state;
pub mod ui;
