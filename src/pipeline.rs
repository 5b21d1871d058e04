//! End-to-end flows: the batch training run and the model build used for serving.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::config::{AppConfig, DataSettings};
use crate::dataset::{load_table, split_features_target, stratified_split};
use crate::error::EstimateError;
use crate::ml::{Evaluation, LinearModel, evaluate_model, train_linear_model};

/// Model fitted on the full dataset together with its input schema.
#[derive(Debug, Clone)]
pub struct TrainedPipeline {
    pub model: LinearModel,
    pub source: PathBuf,
    pub rows: usize,
}

impl TrainedPipeline {
    pub fn feature_names(&self) -> &[String] {
        self.model.feature_names()
    }
}

/// Load the dataset and fit on every row, as the interactive predictor does.
pub fn train_for_serving(data: &DataSettings) -> Result<TrainedPipeline, EstimateError> {
    let table = load_table(&data.path)?;
    let (x, y) = split_features_target(&table, &data.target_column)?;
    let model = train_linear_model(&x, &y)?;
    Ok(TrainedPipeline {
        model,
        source: data.path.clone(),
        rows: table.n_rows(),
    })
}

/// Outcome of a batch run: the fitted model and its scores on both splits.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub data_path: PathBuf,
    pub model: LinearModel,
    pub train: Evaluation,
    pub test: Evaluation,
    pub rows_train: usize,
    pub rows_test: usize,
}

/// Load, split, train, and evaluate on the train then test partitions.
///
/// Metrics go to stdout and the log. Any failure is logged and returned.
pub fn run_batch(
    config: &AppConfig,
    data_override: Option<&Path>,
) -> Result<BatchReport, EstimateError> {
    let data_path = data_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.data.path.clone());
    execute_batch(config, &data_path).inspect_err(|err| error!("Error during training: {err}"))
}

fn execute_batch(config: &AppConfig, data_path: &Path) -> Result<BatchReport, EstimateError> {
    let table = load_table(data_path)?;
    let (x, y) = split_features_target(&table, &config.data.target_column)?;
    let split = stratified_split(
        &x,
        &y,
        &config.split.stratify_column,
        &config.split.options(),
    )?;
    info!(
        "Stratified on '{}': {} train rows, {} test rows (seed {})",
        config.split.stratify_column,
        split.y_train.len(),
        split.y_test.len(),
        config.split.seed
    );

    let model = train_linear_model(&split.x_train, &split.y_train)?;

    println!("\n--- Training Evaluation ---");
    let train = evaluate_model(&model, &split.x_train, &split.y_train)?;
    report("Train", &train);

    println!("\n--- Testing Evaluation ---");
    let test = evaluate_model(&model, &split.x_test, &split.y_test)?;
    report("Test", &test);

    Ok(BatchReport {
        data_path: data_path.to_path_buf(),
        model,
        rows_train: split.y_train.len(),
        rows_test: split.y_test.len(),
        train,
        test,
    })
}

fn report(label: &str, evaluation: &Evaluation) {
    for line in evaluation.summary_lines(label) {
        println!("{line}");
        info!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_dataset(dir: &Path) -> PathBuf {
        let mut text = String::from("sqft,bedrooms,property_type_Bunglow,price\n");
        for i in 0..40 {
            let sqft = 700 + i * 35;
            let bedrooms = 1 + i % 4;
            let bunglow = if i % 5 == 0 { "True" } else { "False" };
            let price = 120 * sqft + 15_000 * bedrooms + 40_000;
            text.push_str(&format!("{sqft},{bedrooms},{bunglow},{price}\n"));
        }
        let path = dir.join("final.csv");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn batch_run_scores_both_partitions() {
        let dir = tempdir().unwrap();
        let path = write_dataset(dir.path());
        let report = run_batch(&AppConfig::default(), Some(&path)).unwrap();
        assert_eq!(report.rows_train + report.rows_test, 40);
        assert_eq!(report.rows_test, 8);
        assert_eq!(
            report.model.feature_names(),
            &["sqft", "bedrooms", "property_type_Bunglow"]
        );
        assert!(report.train.r2 > 0.999);
        assert!(report.test.r2 > 0.999);
        assert_eq!(report.test.predictions.len(), report.rows_test);
    }

    #[test]
    fn batch_run_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = run_batch(&AppConfig::default(), Some(&dir.path().join("final.csv")))
            .unwrap_err();
        assert!(matches!(err, EstimateError::MissingInput { .. }));
    }

    #[test]
    fn batch_run_requires_stratify_column() {
        let dir = tempdir().unwrap();
        let path = write_dataset(dir.path());
        let mut config = AppConfig::default();
        config.split.stratify_column = "city".to_string();
        let err = run_batch(&config, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("'city'"));
    }

    #[test]
    fn serving_build_uses_all_rows() {
        let dir = tempdir().unwrap();
        let data = DataSettings {
            path: write_dataset(dir.path()),
            ..DataSettings::default()
        };
        let trained = train_for_serving(&data).unwrap();
        assert_eq!(trained.rows, 40);
        assert_eq!(trained.feature_names().len(), 3);
    }
}
