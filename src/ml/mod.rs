//! Model fitting, prediction, and scoring.
//!
//! A single ordinary least-squares model backs both the batch training run and
//! the interactive predictor.

pub mod linear;
pub mod metrics;

pub use linear::{LinearModel, PredictionInput, train_linear_model};
pub use metrics::{Evaluation, evaluate_model, mean_absolute_error, r2_score};
