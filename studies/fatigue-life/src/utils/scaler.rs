use anyhow::{ bail, ensure, Result };

/// Per-column standardization (zero mean, unit variance).
///
/// Statistics come from a reference set passed to [`StandardScaler::fit`] and
/// are then applied unchanged to any other rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Result<StandardScaler> {
        let Some(first) = rows.first() else {
            bail!("cannot fit a scaler on zero rows");
        };
        let n_cols = first.len();
        ensure!(n_cols > 0, "cannot fit a scaler on zero columns");
        ensure!(
            rows.iter().all(|r| r.len() == n_cols),
            "rows have different lengths, expected {n_cols} columns"
        );

        let n = rows.len() as f64;
        let mut mean = vec![0.0; n_cols];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; n_cols];
        for row in rows {
            for ((acc, v), m) in var.iter_mut().zip(row).zip(&mean) {
                *acc += (v - m).powi(2);
            }
        }
        // constant columns pass through unscaled
        let std = var
            .into_iter()
            .map(|v| {
                let s = (v / n).sqrt();
                if s == 0.0 { 1.0 } else { s }
            })
            .collect();

        Ok(StandardScaler { mean, std })
    }

    /// Fits on a single column of values.
    pub fn fit_column(values: &[f64]) -> Result<StandardScaler> {
        let rows: Vec<Vec<f64>> = values
            .iter()
            .map(|&v| vec![v])
            .collect();
        Self::fit(&rows)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter()
            .map(|row| {
                self.check(row)?;
                Ok(
                    row
                        .iter()
                        .zip(self.mean.iter().zip(&self.std))
                        .map(|(v, (m, s))| (v - m) / s)
                        .collect()
                )
            })
            .collect()
    }

    pub fn transform_column(&self, values: &[f64]) -> Result<Vec<f64>> {
        ensure!(self.n_features() == 1, "scaler was fitted on {} columns", self.n_features());
        Ok(
            values
                .iter()
                .map(|v| (v - self.mean[0]) / self.std[0])
                .collect()
        )
    }

    pub fn inverse_transform_column(&self, values: &[f64]) -> Result<Vec<f64>> {
        ensure!(self.n_features() == 1, "scaler was fitted on {} columns", self.n_features());
        Ok(
            values
                .iter()
                .map(|v| v * self.std[0] + self.mean[0])
                .collect()
        )
    }

    fn check(&self, row: &[f64]) -> Result<()> {
        ensure!(
            row.len() == self.n_features(),
            "row has {} columns, scaler was fitted on {}",
            row.len(),
            self.n_features()
        );
        Ok(())
    }
}
