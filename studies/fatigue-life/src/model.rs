use anyhow::{ anyhow, Result };
use burn::{ nn::{ Linear, LinearConfig, Relu }, prelude::* };

use crate::data::TabularData;

#[derive(Config, Debug)]
pub struct FatigueNetConfig {
    #[config(default = 4)]
    pub input: usize,
    #[config(default = 64)]
    pub hidden1: usize,
    #[config(default = 32)]
    pub hidden2: usize,
    #[config(default = 1)]
    pub output: usize,
}

impl FatigueNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FatigueNet<B> {
        FatigueNet {
            fc1: LinearConfig::new(self.input, self.hidden1).init(device),
            fc2: LinearConfig::new(self.hidden1, self.hidden2).init(device),
            fc3: LinearConfig::new(self.hidden2, self.output).init(device),
            activation: Relu::new(),
        }
    }
}

/// Dense regressor: two ReLU hidden layers and a linear output unit.
#[derive(Module, Debug)]
pub struct FatigueNet<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    activation: Relu,
}

impl<B: Backend> FatigueNet<B> {
    /// # Shapes
    ///   - Input [batch_size, features]
    ///   - Output [batch_size, 1]
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.fc1.forward(input));
        let x = self.activation.forward(self.fc2.forward(x));
        self.fc3.forward(x)
    }

    /// Predicts every row of `data`, in order, in the model's output space.
    pub fn predict(&self, data: &TabularData, device: &B::Device) -> Result<Vec<f32>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let indices: Vec<usize> = (0..data.len()).collect();
        let (x, _) = data.to_tensors::<B>(&indices, device);
        self.forward(x)
            .into_data()
            .to_vec::<f32>()
            .map_err(|err| anyhow!("cannot read predictions: {err:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::N_FEATURES;
    use burn::backend::{ ndarray::NdArrayDevice, NdArray };

    #[test]
    fn default_architecture() {
        let config = FatigueNetConfig::new();
        assert_eq!(config.input, N_FEATURES);
        assert_eq!((config.hidden1, config.hidden2, config.output), (64, 32, 1));
    }

    #[test]
    fn forward_shape() {
        let device = NdArrayDevice::Cpu;
        let model: FatigueNet<NdArray> = FatigueNetConfig::new().init(&device);
        let x = Tensor::<NdArray, 2>::zeros([7, N_FEATURES], &device);
        assert_eq!(model.forward(x).dims(), [7, 1]);
        // 4*64+64 + 64*32+32 + 32*1+1
        assert_eq!(model.num_params(), 2433);
    }

    #[test]
    fn predicts_one_value_per_row() {
        let device = NdArrayDevice::Cpu;
        let model: FatigueNet<NdArray> = FatigueNetConfig::new().init(&device);
        let features: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64; 4]).collect();
        let data = TabularData::new(&features, &[0.0; 5]).unwrap();
        assert_eq!(model.predict(&data, &device).unwrap().len(), 5);
    }
}
