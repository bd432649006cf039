use std::io::{ self, IsTerminal };

use color_eyre::eyre::{ self, eyre, Result };
use config::PipelineConfig;
use env_logger::Env;
use log::{ info, warn };
use ui::{ state::StateNN, ui::Plot };

mod config;
mod data;
mod model;
mod pipeline;
mod train;
mod utils;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::default();
    info!("Generating {} samples with seed {}", config.n_samples, config.seed);
    let dataset = data::generate(config.n_samples, config.seed);
    println!("{}", dataset.head(5));

    let report = pipeline::run(&config, &dataset).map_err(into_report)?;
    info!(
        "Target scaler fitted on training rows: mean {:.4e}, std {:.4e}",
        report.target_scaler.mean[0],
        report.target_scaler.std[0]
    );
    info!("Feature means: {:?}", report.feature_scaler.mean);
    println!("Mean Squared Error: {}", report.mse);
    println!("R2 Score: {}", report.r2);

    if !io::stdout().is_terminal() {
        warn!("stdout is not a terminal, skipping plots");
        return Ok(());
    }

    let mut state_nn = StateNN::default()
        .with_parity(&report.actual, &report.predicted)
        .with_losses(report.history.train_loss, report.history.val_loss);
    state_nn.push_metric("MSE", format!("{:.4e}", report.mse));
    state_nn.push_metric("R2", format!("{:.4}", report.r2));
    state_nn.push_metric("Test rows", report.actual.len().to_string());
    state_nn.push_metric("Epochs", config.n_epochs.to_string());

    ui::show(&state_nn, Plot::Parity)?;
    ui::show(&state_nn, Plot::Loss)?;
    Ok(())
}

/// Rebuilds an anyhow context chain as nested eyre context, root cause first.
fn into_report(err: anyhow::Error) -> eyre::Report {
    let mut chain: Vec<String> = err.chain().map(|cause| cause.to_string()).collect();
    let mut report = eyre!(chain.pop().unwrap_or_default());
    while let Some(context) = chain.pop() {
        report = report.wrap_err(context);
    }
    report
}
