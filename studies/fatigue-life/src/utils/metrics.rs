use anyhow::{ ensure, Result };

fn check(actual: &[f64], predicted: &[f64]) -> Result<()> {
    ensure!(!actual.is_empty(), "cannot score an empty set of predictions");
    ensure!(
        actual.len() == predicted.len(),
        "{} targets but {} predictions",
        actual.len(),
        predicted.len()
    );
    Ok(())
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / (actual.len() as f64))
}

/// Coefficient of determination.
///
/// For a constant target the score is 1.0 when every prediction is exact and
/// 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check(actual, predicted)?;
    let mean = actual.iter().sum::<f64>() / (actual.len() as f64);
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual
        .iter()
        .map(|a| (a - mean).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_of_known_values() {
        let mse = mean_squared_error(&[1.0, 2.0, 3.0], &[1.0, 4.0, 0.0]).unwrap();
        assert!((mse - 13.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn r2_perfect_and_mean_predictions() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(&y, &y).unwrap(), 1.0);
        assert!(r2_score(&y, &[2.5; 4]).unwrap().abs() < 1e-12);
        assert!(r2_score(&y, &[4.0, 3.0, 2.0, 1.0]).unwrap() < 0.0);
    }

    #[test]
    fn r2_constant_target() {
        assert_eq!(r2_score(&[2.0, 2.0], &[2.0, 2.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[2.0, 2.0], &[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn rejects_mismatched_or_empty() {
        assert!(mean_squared_error(&[], &[]).is_err());
        assert!(r2_score(&[1.0, 2.0], &[1.0]).is_err());
    }
}
