use std::fmt;

use anyhow::{ bail, Result };
use burn::tensor::{ backend::Backend, Tensor, TensorData };
use rand::{ rngs::StdRng, seq::SliceRandom, Rng, SeedableRng };
use rand_distr::StandardNormal;

pub const COLUMNS: [&str; 5] = [
    "load_cycles",
    "stress_amplitude",
    "temperature",
    "vibration",
    "fatigue_life",
];
pub const N_FEATURES: usize = 4;

/// Lower bound applied to every generated fatigue life, in cycles.
pub const MIN_FATIGUE_LIFE: f64 = 1e4;
const NOISE_STD: f64 = 50_000.0;

const LOAD_CYCLES_RANGE: (f64, f64) = (1_000.0, 100_000.0);
const STRESS_RANGE: (f64, f64) = (50.0, 500.0);
const TEMPERATURE_RANGE: (f64, f64) = (-50.0, 150.0);
const VIBRATION_RANGE: (f64, f64) = (0.1, 10.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub load_cycles: f64,
    pub stress_amplitude: f64,
    pub temperature: f64,
    pub vibration: f64,
    pub fatigue_life: f64,
}

impl Sample {
    pub fn features(&self) -> [f64; N_FEATURES] {
        [self.load_cycles, self.stress_amplitude, self.temperature, self.vibration]
    }
}

/// Noise-free fatigue life for the given operating conditions.
pub fn fatigue_life(stress_amplitude: f64, temperature: f64, vibration: f64) -> f64 {
    (1e7 / stress_amplitude.sqrt()) *
        ((300.0 - temperature) / 300.0) *
        (5.0 / (vibration + 0.5))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Dataset {
        Dataset { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn features(&self) -> Vec<Vec<f64>> {
        self.samples()
            .iter()
            .map(|s| s.features().to_vec())
            .collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.samples()
            .iter()
            .map(|s| s.fatigue_life)
            .collect()
    }

    /// First `n` rows, formatted like a dataframe preview.
    pub fn head(&self, n: usize) -> Head<'_> {
        let rows = self.samples();
        Head { rows: &rows[..n.min(rows.len())] }
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset::new(
            indices
                .iter()
                .map(|&i| self.samples[i])
                .collect()
        )
    }
}

/// Draws `n_samples` rows from a generator seeded with `seed`.
///
/// Each column is drawn in full before the next one, so every column depends
/// only on the seed and the row count.
pub fn generate(n_samples: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut uniform = |(low, high): (f64, f64)| -> Vec<f64> {
        (0..n_samples).map(|_| rng.gen_range(low..high)).collect()
    };
    let load_cycles = uniform(LOAD_CYCLES_RANGE);
    let stress_amplitude = uniform(STRESS_RANGE);
    let temperature = uniform(TEMPERATURE_RANGE);
    let vibration = uniform(VIBRATION_RANGE);

    let noise: Vec<f64> = (0..n_samples)
        .map(|_| NOISE_STD * rng.sample::<f64, _>(StandardNormal))
        .collect();

    let samples = (0..n_samples)
        .map(|i| {
            let life =
                fatigue_life(stress_amplitude[i], temperature[i], vibration[i]) + noise[i];
            Sample {
                load_cycles: load_cycles[i],
                stress_amplitude: stress_amplitude[i],
                temperature: temperature[i],
                vibration: vibration[i],
                fatigue_life: life.max(MIN_FATIGUE_LIFE),
            }
        })
        .collect();

    Dataset::new(samples)
}

#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

/// Shuffles row indices with `seed`; the first `round(n * test_ratio)` go to
/// the test partition and the rest to training.
pub fn train_test_split(dataset: &Dataset, test_ratio: f64, seed: u64) -> Result<Split> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        bail!("test ratio must be in (0, 1), got {test_ratio}");
    }
    if dataset.is_empty() {
        bail!("cannot split an empty dataset");
    }
    let n = dataset.len();
    let n_test = ((n as f64) * test_ratio).round() as usize;
    if n_test == 0 || n_test == n {
        bail!("cannot split {n} rows with test ratio {test_ratio}: one side would be empty");
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok(Split {
        train: dataset.select(train_idx),
        test: dataset.select(test_idx),
    })
}

pub struct Head<'a> {
    rows: &'a [Sample],
}

impl fmt::Display for Head<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        write!(f, "{:index_width$}", "")?;
        for name in COLUMNS {
            write!(f, "  {name:>18}")?;
        }
        writeln!(f)?;
        for (i, s) in self.rows.iter().enumerate() {
            write!(f, "{i:<index_width$}")?;
            for value in s.features().iter().chain(std::iter::once(&s.fatigue_life)) {
                write!(f, "  {value:>18.6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Standardized rows ready to be batched into tensors.
#[derive(Debug, Clone)]
pub struct TabularData {
    pub features: Vec<[f32; N_FEATURES]>,
    pub targets: Vec<f32>,
}

impl TabularData {
    pub fn new(features: &[Vec<f64>], targets: &[f64]) -> Result<TabularData> {
        if features.len() != targets.len() {
            bail!("{} feature rows but {} targets", features.len(), targets.len());
        }
        let mut rows = Vec::with_capacity(features.len());
        for row in features {
            let Ok(row) = <[f64; N_FEATURES]>::try_from(row.as_slice()) else {
                bail!("expected {N_FEATURES} features per row, got {}", row.len());
            };
            rows.push(row.map(|v| v as f32));
        }
        Ok(TabularData {
            features: rows,
            targets: targets
                .iter()
                .map(|&t| t as f32)
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Splits off the last `ratio` of the rows, keeping order.
    pub fn hold_out(mut self, ratio: f64) -> Result<(TabularData, TabularData)> {
        if !(ratio > 0.0 && ratio < 1.0) {
            bail!("validation ratio must be in (0, 1), got {ratio}");
        }
        let n = self.len();
        let n_keep = n - ((n as f64) * ratio).round() as usize;
        if n_keep == 0 || n_keep == n {
            bail!("cannot hold out {ratio} of {n} rows: one side would be empty");
        }
        let held = TabularData {
            features: self.features.split_off(n_keep),
            targets: self.targets.split_off(n_keep),
        };
        Ok((self, held))
    }

    pub fn to_tensors<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let mut x = Vec::with_capacity(indices.len() * N_FEATURES);
        let mut y = Vec::with_capacity(indices.len());
        for &i in indices {
            x.extend_from_slice(&self.features[i]);
            y.push(self.targets[i]);
        }
        let x = Tensor::from_data(TensorData::new(x, [indices.len(), N_FEATURES]), device);
        let y = Tensor::from_data(TensorData::new(y, [indices.len(), 1]), device);
        (x, y)
    }
}

// A struct for our data loader
pub struct DataLoader {
    data: TabularData,
    order: Vec<usize>,
    batch_size: usize,
    batch_index: usize,
    shuffle: bool,
    rng: StdRng,
}

impl DataLoader {
    pub fn new(data: TabularData, batch_size: usize, shuffle: bool, seed: u64) -> DataLoader {
        DataLoader {
            order: (0..data.len()).collect(),
            data,
            batch_size: batch_size.max(1),
            batch_index: 0,
            shuffle,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn data(&self) -> &TabularData {
        &self.data
    }

    /// Number of batches based on the dataset size and batch size
    pub fn len_batch(&self) -> usize {
        self.data.len().div_ceil(self.batch_size)
    }

    /// Row indices of the next batch; `None` ends the epoch and rewinds.
    pub fn next_batch(&mut self) -> Option<Vec<usize>> {
        let start = self.batch_index * self.batch_size;
        if start >= self.data.len() {
            self.batch_index = 0;
            return None;
        }
        if self.batch_index == 0 && self.shuffle {
            self.order.shuffle(&mut self.rng);
        }
        let end = (start + self.batch_size).min(self.data.len());
        self.batch_index += 1;
        Some(self.order[start..end].to_vec())
    }
}
