use anyhow::{ ensure, Result };
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{ Autodiff, NdArray };
use burn::module::AutodiffModule;
use burn::nn::loss::{ MseLoss, Reduction };
use burn::optim::{ AdamConfig, GradientsParams, Optimizer };
use burn::prelude::Backend;
use burn::tensor::ElementConversion;
use log::{ debug, info };

use crate::config::PipelineConfig;
use crate::data::{ DataLoader, TabularData };
use crate::model::FatigueNet;

pub type TrainBackend = Autodiff<NdArray>;
pub type EvalBackend = NdArray;

/// Per-epoch MSE on the standardized target, not on cycles.
#[derive(Debug, Default, Clone)]
pub struct TrainingHistory {
    /// (epoch, mean training loss)
    pub train_loss: Vec<(f64, f64)>,
    /// (epoch, validation loss)
    pub val_loss: Vec<(f64, f64)>,
}

pub fn train_model(
    config: &PipelineConfig,
    data: TabularData,
    device: &NdArrayDevice
) -> Result<(FatigueNet<EvalBackend>, TrainingHistory)> {
    ensure!(config.n_epochs > 0, "n_epochs must be positive");
    ensure!(config.batch_size > 0, "batch_size must be positive");

    TrainBackend::seed(config.seed);

    let (train_data, val_data) = data.hold_out(config.validation_ratio)?;
    info!("Training on {} rows, validating on {}", train_data.len(), val_data.len());

    let mut dataloader_train = DataLoader::new(
        train_data,
        config.batch_size,
        true,
        config.seed
    );
    let val_indices: Vec<usize> = (0..val_data.len()).collect();

    let mut model: FatigueNet<TrainBackend> = config.model.init(device);
    let mut optim = AdamConfig::new().init();
    let loss_fn = MseLoss::new();

    let mut history = TrainingHistory::default();
    let total_batch_train = dataloader_train.len_batch();

    for e in 1..=config.n_epochs {
        let mut epoch_loss_train = 0.0;
        let mut running_samples = 0;

        while let Some(batch) = dataloader_train.next_batch() {
            let (inputs, targets) = dataloader_train.data().to_tensors::<TrainBackend>(&batch, device);
            let output = model.forward(inputs);
            let loss = loss_fn.forward(output, targets, Reduction::Mean);

            epoch_loss_train += loss.clone().into_scalar().elem::<f64>() * (batch.len() as f64);
            running_samples += batch.len();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(config.learning_rate, model, grads);
        }

        let final_loss_train = epoch_loss_train / (running_samples as f64);

        let model_valid = model.valid();
        let (inputs, targets) = val_data.to_tensors::<EvalBackend>(&val_indices, device);
        let final_loss_val = loss_fn
            .forward(model_valid.forward(inputs), targets, Reduction::Mean)
            .into_scalar()
            .elem::<f64>();

        history.train_loss.push((e as f64, final_loss_train));
        history.val_loss.push((e as f64, final_loss_val));

        if e % 10 == 0 || e == config.n_epochs {
            info!(
                "[Epoch {}/{}] {} batches | Loss {:.4} | Val Loss {:.4}",
                e,
                config.n_epochs,
                total_batch_train,
                final_loss_train,
                final_loss_val
            );
        } else {
            debug!("[Epoch {}] Loss {:.4} | Val Loss {:.4}", e, final_loss_train, final_loss_val);
        }
    }

    Ok((model.valid(), history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate;
    use crate::utils::scaler::StandardScaler;

    fn scaled(n: usize) -> TabularData {
        let dataset = generate(n, 3);
        let x = StandardScaler::fit(&dataset.features()).unwrap();
        let y = StandardScaler::fit_column(&dataset.targets()).unwrap();
        TabularData::new(
            &x.transform(&dataset.features()).unwrap(),
            &y.transform_column(&dataset.targets()).unwrap()
        ).unwrap()
    }

    #[test]
    fn records_one_loss_pair_per_epoch() {
        let config = PipelineConfig::default().with_n_epochs(3);
        let (_, history) = train_model(&config, scaled(100), &NdArrayDevice::Cpu).unwrap();
        assert_eq!(history.train_loss.len(), 3);
        assert_eq!(history.val_loss.len(), 3);
        assert_eq!(history.val_loss.last().unwrap().0, 3.0);
        assert!(history.train_loss.iter().all(|(_, l)| l.is_finite()));
    }

    #[test]
    fn training_reduces_loss() {
        let config = PipelineConfig::default().with_n_epochs(40);
        let (_, history) = train_model(&config, scaled(300), &NdArrayDevice::Cpu).unwrap();
        let first = history.train_loss.first().unwrap().1;
        let last = history.train_loss.last().unwrap().1;
        assert!(last < first, "loss went from {first} to {last}");
    }

    #[test]
    fn rejects_degenerate_settings() {
        let device = NdArrayDevice::Cpu;
        let zero_epochs = PipelineConfig::default().with_n_epochs(0);
        assert!(train_model(&zero_epochs, scaled(20), &device).is_err());
        let zero_batch = PipelineConfig::default().with_batch_size(0);
        assert!(train_model(&zero_batch, scaled(20), &device).is_err());
        assert!(train_model(&PipelineConfig::default(), scaled(2), &device).is_err());
    }
}
