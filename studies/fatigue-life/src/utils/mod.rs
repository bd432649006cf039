pub mod metrics;
pub mod scaler;
