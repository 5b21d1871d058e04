//! Ordinary least-squares regression from feature columns to a numeric target.

use linfa::Dataset;
use linfa::traits::Fit;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::{Column, Table};
use crate::error::EstimateError;

/// Fitted linear mapping: one coefficient per feature plus an intercept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearModel {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Feature columns, in the order the model expects them.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Predict every row of `x`.
    ///
    /// `x` must carry exactly the training feature columns in training order.
    pub fn predict(&self, x: &Table) -> Result<Vec<f64>, EstimateError> {
        let found = x.column_names();
        if found != self.feature_names {
            return Err(EstimateError::FeatureMismatch {
                expected: self.feature_names.clone(),
                found,
            });
        }
        let matrix = x.to_matrix()?;
        Ok(self.predict_matrix(&matrix).to_vec())
    }

    /// Predict a single form entry.
    pub fn predict_input(&self, input: &PredictionInput) -> Result<f64, EstimateError> {
        let predictions = self.predict(&input.to_table())?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| EstimateError::Validation("Prediction produced no output".to_string()))
    }

    fn predict_matrix(&self, matrix: &Array2<f64>) -> Array1<f64> {
        let coefficients = Array1::from(self.coefficients.clone());
        matrix.dot(&coefficients) + self.intercept
    }
}

/// Fit an ordinary least-squares model with an intercept.
///
/// No scaling or regularization is applied; features are used as given.
pub fn train_linear_model(x: &Table, y: &Column) -> Result<LinearModel, EstimateError> {
    if x.n_columns() == 0 {
        return Err(EstimateError::Validation(
            "No feature columns to train on".to_string(),
        ));
    }
    if x.n_rows() == 0 {
        return Err(EstimateError::Validation("Empty training set".to_string()));
    }
    if x.n_rows() != y.len() {
        return Err(EstimateError::Validation(format!(
            "Mismatched training inputs ({}) and targets ({})",
            x.n_rows(),
            y.len()
        )));
    }
    let records = x.to_matrix()?;
    let targets = Array1::from(y.to_f64()?);
    debug!(
        "Fitting OLS on {} rows x {} features",
        records.nrows(),
        records.ncols()
    );
    let dataset = Dataset::new(records, targets);
    let fitted = LinearRegression::new()
        .fit(&dataset)
        .map_err(|err| EstimateError::FitFailed(err.to_string()))?;

    let coefficients = fitted.params().to_vec();
    let intercept = fitted.intercept();
    if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
        return Err(EstimateError::FitFailed(
            "solver produced non-finite coefficients".to_string(),
        ));
    }
    info!(
        "Trained linear model on {} rows with {} features",
        x.n_rows(),
        x.n_columns()
    );
    Ok(LinearModel {
        feature_names: x.column_names(),
        coefficients,
        intercept,
    })
}

/// Single-row input whose columns mirror a model's features.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    names: Vec<String>,
    values: Vec<f64>,
}

impl PredictionInput {
    /// One entry per feature, each starting at 0.0.
    pub fn for_features(names: &[String]) -> Self {
        Self {
            names: names.to_vec(),
            values: vec![0.0; names.len()],
        }
    }

    pub fn set(&mut self, name: &str, value: f64) -> Result<(), EstimateError> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| EstimateError::SchemaLookup {
                column: name.to_string(),
            })?;
        self.values[idx] = value;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    /// Editable `(name, value)` pairs in feature order.
    pub fn fields_mut(&mut self) -> impl Iterator<Item = (&str, &mut f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Build the one-row table handed to the model.
    pub fn to_table(&self) -> Table {
        let columns = self
            .names
            .iter()
            .zip(&self.values)
            .map(|(name, &value)| Column::numeric(name.clone(), vec![value]))
            .collect();
        Table::from_parsed(columns, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn housing() -> (Table, Column) {
        let sqft = vec![1000.0, 1500.0, 1200.0, 1800.0, 900.0, 2100.0];
        let bedrooms = vec![2.0, 3.0, 2.0, 4.0, 1.0, 3.0];
        let price = sqft
            .iter()
            .zip(&bedrooms)
            .map(|(s, b)| 150.0 * s + 20_000.0 * b + 10_000.0)
            .collect();
        let x = Table::new(vec![
            Column::numeric("sqft", sqft),
            Column::numeric("bedrooms", bedrooms),
        ])
        .unwrap();
        (x, Column::numeric("price", price))
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        let (x, y) = housing();
        let model = train_linear_model(&x, &y).unwrap();
        assert!((model.coefficients()[0] - 150.0).abs() < 1e-6);
        assert!((model.coefficients()[1] - 20_000.0).abs() < 1e-4);
        assert!((model.intercept() - 10_000.0).abs() < 1e-3);
    }

    #[test]
    fn predicts_from_form_input() {
        let (x, y) = housing();
        let model = train_linear_model(&x, &y).unwrap();
        let mut input = PredictionInput::for_features(model.feature_names());
        input.set("sqft", 1200.0).unwrap();
        input.set("bedrooms", 3.0).unwrap();
        let value = model.predict_input(&input).unwrap();
        assert!(value.is_finite());
        assert!((value - 250_000.0).abs() < 1e-2);
    }

    #[test]
    fn unedited_input_defaults_to_zero() {
        let names = vec!["sqft".to_string(), "bedrooms".to_string()];
        let input = PredictionInput::for_features(&names);
        assert_eq!(input.get("sqft"), Some(0.0));
        assert_eq!(input.to_table().column_names(), names);
        assert_eq!(input.to_table().n_rows(), 1);
    }

    #[test]
    fn unknown_input_field_is_rejected() {
        let mut input = PredictionInput::for_features(&["sqft".to_string()]);
        assert!(matches!(
            input.set("pool", 1.0),
            Err(EstimateError::SchemaLookup { .. })
        ));
    }

    #[test]
    fn reordered_columns_are_a_feature_mismatch() {
        let (x, y) = housing();
        let model = train_linear_model(&x, &y).unwrap();
        let swapped = Table::new(vec![
            Column::numeric("bedrooms", vec![3.0]),
            Column::numeric("sqft", vec![1200.0]),
        ])
        .unwrap();
        assert!(matches!(
            model.predict(&swapped),
            Err(EstimateError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn text_features_cannot_be_fitted() {
        let x = Table::new(vec![Column::text("city", vec!["a".into(), "b".into()])]).unwrap();
        let y = Column::numeric("price", vec![1.0, 2.0]);
        assert!(matches!(
            train_linear_model(&x, &y),
            Err(EstimateError::NonNumeric { .. })
        ));
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let x = Table::new(vec![Column::numeric("sqft", Vec::new())]).unwrap();
        let y = Column::numeric("price", Vec::new());
        assert!(matches!(
            train_linear_model(&x, &y),
            Err(EstimateError::Validation(_))
        ));
    }
}
