use fade_core::StrategyError;
use nalgebra::{DMatrix, DVector};

use crate::features::FEATURE_COUNT;

const EPOCHS: usize = 500;
const LEARNING_RATE: f64 = 0.1;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logistic regression fit by full-batch gradient descent on standardized
/// features.
#[derive(Debug)]
pub struct LogisticModel {
    weights: DVector<f64>,
    bias: f64,
    means: [f64; FEATURE_COUNT],
    stds: [f64; FEATURE_COUNT],
}

impl LogisticModel {
    pub fn fit(rows: &[[f64; FEATURE_COUNT]], labels: &[f64]) -> Result<Self, StrategyError> {
        if rows.len() != labels.len() || rows.is_empty() {
            return Err(StrategyError::InvalidData(
                "feature rows and labels must be non-empty and equal length".into(),
            ));
        }
        let positives = labels.iter().filter(|&&y| y > 0.5).count();
        if positives == 0 || positives == labels.len() {
            return Err(StrategyError::InsufficientData(
                "training data contains only one outcome class".into(),
            ));
        }

        let n = rows.len();
        let mut means = [0.0; FEATURE_COUNT];
        let mut stds = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            let col: Vec<f64> = rows.iter().map(|r| r[j]).collect();
            let mean = col.iter().sum::<f64>() / n as f64;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            means[j] = mean;
            // Constant columns standardize to zero instead of dividing by zero
            stds[j] = if var > 0.0 { var.sqrt() } else { 1.0 };
        }

        let x = DMatrix::from_fn(n, FEATURE_COUNT, |i, j| (rows[i][j] - means[j]) / stds[j]);
        let y = DVector::from_column_slice(labels);

        let mut weights = DVector::zeros(FEATURE_COUNT);
        let mut bias = 0.0;
        for _ in 0..EPOCHS {
            let logits = &x * &weights;
            let predictions = DVector::from_fn(n, |i, _| sigmoid(logits[i] + bias));
            let errors = &predictions - &y;
            let grad_w = x.transpose() * &errors / n as f64;
            let grad_b = errors.sum() / n as f64;
            weights -= grad_w * LEARNING_RATE;
            bias -= grad_b * LEARNING_RATE;
        }

        Ok(Self {
            weights,
            bias,
            means,
            stds,
        })
    }

    pub fn predict_proba(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut logit = self.bias;
        for j in 0..FEATURE_COUNT {
            logit += self.weights[j] * (row[j] - self.means[j]) / self.stds[j];
        }
        sigmoid(logit)
    }
}
