//! Regression metrics and model evaluation.

use serde::Serialize;

use super::linear::LinearModel;
use crate::dataset::{Column, Table};
use crate::error::EstimateError;

/// Predictions and scores for one feature/target pair.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    #[serde(skip)]
    pub predictions: Vec<f64>,
    pub mae: f64,
    pub r2: f64,
}

impl Evaluation {
    /// Two report lines, e.g. `Train MAE: 12.34` and `Train R²: 0.91`.
    pub fn summary_lines(&self, label: &str) -> [String; 2] {
        [
            format!("{label} MAE: {:.2}", self.mae),
            format!("{label} R²: {:.2}", self.r2),
        ]
    }
}

/// Average absolute difference between predictions and actual values.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64, EstimateError> {
    check_lengths(actual, predicted)?;
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (p - a).abs())
        .sum();
    Ok(total / actual.len() as f64)
}

/// Coefficient of determination.
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64, EstimateError> {
    check_lengths(actual, predicted)?;
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Predict every row of `x` and score against `y`.
pub fn evaluate_model(
    model: &LinearModel,
    x: &Table,
    y: &Column,
) -> Result<Evaluation, EstimateError> {
    let predictions = model.predict(x)?;
    let actual = y.to_f64()?;
    let mae = mean_absolute_error(&actual, &predictions)?;
    let r2 = r2_score(&actual, &predictions)?;
    Ok(Evaluation {
        predictions,
        mae,
        r2,
    })
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<(), EstimateError> {
    if actual.is_empty() {
        return Err(EstimateError::Validation(
            "Cannot score an empty target".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(EstimateError::Validation(format!(
            "Target has {} values but {} predictions were made",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::linear::train_linear_model;

    #[test]
    fn perfect_fit_scores_zero_error_and_unit_r2() {
        let sqft: Vec<f64> = vec![800.0, 1000.0, 1250.0, 1500.0, 2000.0];
        let price: Vec<f64> = sqft.iter().map(|s| 100.0 * s + 50_000.0).collect();
        let x = Table::new(vec![Column::numeric("sqft", sqft)]).unwrap();
        let y = Column::numeric("price", price);
        let model = train_linear_model(&x, &y).unwrap();
        let eval = evaluate_model(&model, &x, &y).unwrap();
        assert_eq!(eval.predictions.len(), 5);
        assert!(eval.mae < 1e-6, "mae = {}", eval.mae);
        assert!((eval.r2 - 1.0).abs() < 1e-9, "r2 = {}", eval.r2);
    }

    #[test]
    fn mae_averages_absolute_errors() {
        let mae = mean_absolute_error(&[1.0, 2.0, 3.0], &[2.0, 2.0, 1.0]).unwrap();
        assert!((mae - 1.0).abs() < 1e-12);
    }

    #[test]
    fn r2_of_mean_prediction_is_zero() {
        let r2 = r2_score(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]).unwrap();
        assert!(r2.abs() < 1e-12);
    }

    #[test]
    fn r2_of_constant_target() {
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[4.0, 5.0]).unwrap(), 0.0);
    }

    #[test]
    fn empty_and_mismatched_inputs_are_rejected() {
        assert!(mean_absolute_error(&[], &[]).is_err());
        assert!(r2_score(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn summary_lines_use_two_decimals() {
        let eval = Evaluation {
            predictions: Vec::new(),
            mae: 1234.5678,
            r2: 0.87654,
        };
        assert_eq!(
            eval.summary_lines("Test"),
            ["Test MAE: 1234.57".to_string(), "Test R²: 0.88".to_string()]
        );
    }
}
