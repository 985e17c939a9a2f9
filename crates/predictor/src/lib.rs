//! Lightweight win-probability model.
//!
//! A logistic regression is fit on the indicator state at each closed
//! backtest trade's entry bar, with the trade outcome as the label. Scored
//! signals get their `model_probability` filled in; when there is too little
//! history to train, signals are left unscored rather than failing the run.

mod features;
mod model;


pub use features::{feature_row, FEATURE_COUNT};
pub use model::LogisticModel;

use std::collections::HashMap;

use backtest::Trade;
use chrono::{DateTime, Utc};
use fade_core::{Bar, Signal, StrategyError};
use indicators::IndicatorSet;

/// Minimum closed trades needed before fitting is worthwhile.
pub const MIN_TRAINING_TRADES: usize = 10;

#[derive(Debug)]
pub struct SignalModel {
    model: LogisticModel,
}

impl SignalModel {
    /// Fit on closed trades only; open trades have no outcome yet.
    pub fn train(
        bars: &[Bar],
        set: &IndicatorSet,
        trades: &[Trade],
    ) -> Result<Self, StrategyError> {
        let index_by_time: HashMap<DateTime<Utc>, usize> = bars
            .iter()
            .enumerate()
            .map(|(i, b)| (b.timestamp, i))
            .collect();

        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for trade in trades.iter().filter(|t| !t.is_open()) {
            let Some(&idx) = index_by_time.get(&trade.entry_time) else {
                continue;
            };
            let Some(row) = feature_row(set, idx) else {
                continue;
            };
            rows.push(row);
            labels.push(if trade.is_win() { 1.0 } else { 0.0 });
        }

        if rows.len() < MIN_TRAINING_TRADES {
            return Err(StrategyError::InsufficientData(format!(
                "{} closed trades, need {}",
                rows.len(),
                MIN_TRAINING_TRADES
            )));
        }

        let model = LogisticModel::fit(&rows, &labels)?;
        tracing::info!(examples = rows.len(), "probability model trained");
        Ok(Self { model })
    }

    /// Fill in `model_probability` for every signal whose entry bar has a
    /// complete feature row.
    pub fn score(&self, bars: &[Bar], set: &IndicatorSet, signals: &mut [Signal]) {
        let index_by_time: HashMap<DateTime<Utc>, usize> = bars
            .iter()
            .enumerate()
            .map(|(i, b)| (b.timestamp, i))
            .collect();

        for signal in signals.iter_mut() {
            signal.model_probability = index_by_time
                .get(&signal.timestamp)
                .and_then(|&idx| feature_row(set, idx))
                .map(|row| self.model.predict_proba(&row));
        }
    }
}
