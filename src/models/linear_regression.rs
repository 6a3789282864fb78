//! Ordinary least squares regression with intercept

use super::data::{check_training_set, check_width};
use super::persistence;
use super::{Matrix, ModelError, ModelInterface, ModelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const KIND: &str = "linear_regression";

/// Relative pivot size below which a column is treated as linearly dependent
const PIVOT_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedLinear {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl FittedLinear {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// Linear regression fitted by least squares
#[derive(Debug, Default)]
pub struct LinearRegressionModel {
    fitted: Option<FittedLinear>,
}

impl LinearRegressionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitted coefficients, `None` when untrained
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.coefficients.as_slice())
    }

    /// Fitted intercept, `None` when untrained
    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }

    fn fit(features: &Matrix, target: &[f64]) -> ModelResult<FittedLinear> {
        let p = check_training_set(features, target)?;
        let n = features.len() as f64;

        let x_mean: Vec<f64> = (0..p)
            .map(|j| features.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        let y_mean = target.iter().sum::<f64>() / n;

        // Normal equations on centred data: (Xc^T Xc) w = Xc^T yc
        let mut gram = vec![vec![0.0; p]; p];
        let mut rhs = vec![0.0; p];
        for (row, &y) in features.iter().zip(target) {
            let yc = y - y_mean;
            for a in 0..p {
                let xa = row[a] - x_mean[a];
                rhs[a] += xa * yc;
                for b in a..p {
                    gram[a][b] += xa * (row[b] - x_mean[b]);
                }
            }
        }
        for a in 0..p {
            for b in 0..a {
                gram[a][b] = gram[b][a];
            }
        }

        let coefficients = solve_least_squares(gram, rhs);
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        tracing::debug!(
            samples = features.len(),
            n_features = p,
            intercept,
            "Linear model fitted"
        );

        Ok(FittedLinear {
            coefficients,
            intercept,
        })
    }
}

/// Solve a symmetric positive semi-definite system by Gauss-Jordan elimination
///
/// Columns without a usable pivot are free variables and get coefficient 0,
/// which still yields a least-squares solution for rank-deficient inputs.
fn solve_least_squares(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let p = b.len();
    let scale = (0..p).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let tolerance = PIVOT_TOLERANCE * scale.max(f64::MIN_POSITIVE);

    let mut pivot_row_of_col: Vec<Option<usize>> = vec![None; p];
    let mut row = 0;

    for col in 0..p {
        if row == p {
            break;
        }

        let Some(pivot) = (row..p).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
        else {
            break;
        };
        if a[pivot][col].abs() <= tolerance {
            continue;
        }

        a.swap(row, pivot);
        b.swap(row, pivot);

        let inv = 1.0 / a[row][col];
        for k in col..p {
            a[row][k] *= inv;
        }
        b[row] *= inv;

        for r in 0..p {
            if r != row && a[r][col] != 0.0 {
                let factor = a[r][col];
                for k in col..p {
                    let pivot_value = a[row][k];
                    a[r][k] -= factor * pivot_value;
                }
                let pivot_rhs = b[row];
                b[r] -= factor * pivot_rhs;
            }
        }

        pivot_row_of_col[col] = Some(row);
        row += 1;
    }

    pivot_row_of_col
        .into_iter()
        .map(|r| r.map_or(0.0, |r| b[r]))
        .collect()
}

impl ModelInterface for LinearRegressionModel {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }

    fn train(&mut self, features: &Matrix, target: &[f64]) -> ModelResult<()> {
        self.fitted = Some(Self::fit(features, target)?);
        tracing::info!(samples = features.len(), "Linear regression trained");
        Ok(())
    }

    fn predict(&self, features: &Matrix) -> ModelResult<Vec<f64>> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::Untrained)?;
        check_width(features, Some(fitted.coefficients.len()))?;
        Ok(features.iter().map(|row| fitted.predict_row(row)).collect())
    }

    fn save_model(&self, path: &Path) -> ModelResult<()> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::Untrained)?;
        persistence::save(path, KIND, fitted)
    }

    fn load_model(&mut self, path: &Path) -> ModelResult<()> {
        self.fitted = Some(persistence::load(path, KIND)?);
        Ok(())
    }

    fn retrain(&mut self, features: &Matrix, target: &[f64]) -> ModelResult<()> {
        if self.fitted.is_none() {
            return Err(ModelError::Untrained);
        }
        self.fitted = Some(Self::fit(features, target)?);
        tracing::info!(samples = features.len(), "Linear regression retrained");
        Ok(())
    }
}
