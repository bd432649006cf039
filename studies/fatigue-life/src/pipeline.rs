use anyhow::{ Context, Result };
use burn::backend::ndarray::NdArrayDevice;
use log::info;

use crate::config::PipelineConfig;
use crate::data::{ self, Dataset, TabularData };
use crate::train::{ self, TrainingHistory };
use crate::utils::{ metrics, scaler::StandardScaler };

/// Outcome of one run, with fatigue lives expressed in cycles.
#[derive(Debug, Clone)]
pub struct Report {
    pub mse: f64,
    pub r2: f64,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub history: TrainingHistory,
    pub feature_scaler: StandardScaler,
    pub target_scaler: StandardScaler,
}

/// Split, scale, train and score the model on `dataset`.
///
/// Both scalers are fitted on the training partition only; the test
/// partition is only ever transformed.
pub fn run(config: &PipelineConfig, dataset: &Dataset) -> Result<Report> {
    let device = NdArrayDevice::Cpu;

    let split = data::train_test_split(dataset, config.test_ratio, config.seed)?;
    info!("Split {} rows into {} train / {} test", dataset.len(), split.train.len(), split.test.len());

    let (feature_scaler, target_scaler) = fit_scalers(&split.train)?;

    let train_data = TabularData::new(
        &feature_scaler.transform(&split.train.features())?,
        &target_scaler.transform_column(&split.train.targets())?
    )?;
    let actual = split.test.targets();
    let test_data = TabularData::new(
        &feature_scaler.transform(&split.test.features())?,
        &target_scaler.transform_column(&actual)?
    )?;

    let (model, history) = train::train_model(config, train_data, &device)?;

    let predicted: Vec<f64> = model
        .predict(&test_data, &device)?
        .into_iter()
        .map(f64::from)
        .collect();
    let predicted = target_scaler.inverse_transform_column(&predicted)?;

    let mse = metrics::mean_squared_error(&actual, &predicted)?;
    let r2 = metrics::r2_score(&actual, &predicted)?;
    info!("Evaluated {} test rows", actual.len());

    Ok(Report { mse, r2, actual, predicted, history, feature_scaler, target_scaler })
}

/// Feature and target scalers, fitted on `train` alone.
fn fit_scalers(train: &Dataset) -> Result<(StandardScaler, StandardScaler)> {
    let features = StandardScaler::fit(&train.features()).context("fitting feature scaler")?;
    let targets = StandardScaler::fit_column(&train.targets()).context("fitting target scaler")?;
    Ok((features, targets))
}
