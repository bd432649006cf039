use burn::prelude::*;

use crate::model::FatigueNetConfig;

/// Every knob of one pipeline run. The defaults reproduce the reference study.
#[derive(Config, Debug)]
pub struct PipelineConfig {
    pub model: FatigueNetConfig,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 500)]
    pub n_samples: usize,
    #[config(default = 0.2)]
    pub test_ratio: f64,
    /// Share of the training partition held out for per-epoch validation.
    #[config(default = 0.2)]
    pub validation_ratio: f64,
    #[config(default = 100)]
    pub n_epochs: usize,
    #[config(default = 32)]
    pub batch_size: usize,
    #[config(default = 1e-3)]
    pub learning_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::new(FatigueNetConfig::new())
    }
}
