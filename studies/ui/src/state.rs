#[derive(Debug, Default, Clone)]
pub struct NNProgress {
    /// (epoch, loss)
    pub loss: Vec<(f64, f64)>,
}

#[derive(Debug, Default, Clone)]
pub struct StateNN {
    pub train_progress: NNProgress,
    pub val_progress: NNProgress,
    /// (actual, predicted) pairs from the test partition
    pub parity: Vec<(f64, f64)>,
    /// (metric, value) rows shown next to the plots
    pub history: Vec<(String, String)>,
}

impl StateNN {
    pub fn with_parity(mut self, actual: &[f64], predicted: &[f64]) -> Self {
        self.parity = actual.iter().copied().zip(predicted.iter().copied()).collect();
        self
    }

    pub fn with_losses(mut self, train: Vec<(f64, f64)>, val: Vec<(f64, f64)>) -> Self {
        self.train_progress.loss = train;
        self.val_progress.loss = val;
        self
    }

    pub fn push_metric(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.history.push((name.into(), value.into()));
    }
}
