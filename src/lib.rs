//! Library exports for the price estimator binaries and tests.
/// Application directory resolution.
pub mod app_dirs;
/// TOML configuration.
pub mod config;
/// Tabular data loading and splitting.
pub mod dataset;
/// egui front end.
pub mod egui_app;
/// Pipeline error taxonomy.
pub mod error;
/// Currency formatting.
pub mod format;
/// Tracing setup.
pub mod logging;
/// Linear model fitting and evaluation.
pub mod ml;
/// Batch and serving pipelines.
pub mod pipeline;
/// Memoized per-session predictor.
pub mod session;

pub use error::EstimateError;
