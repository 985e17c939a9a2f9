use serde::{Deserialize, Serialize};

/// Threshold configuration for the signal rules. Defaults are the
/// dashboard's fixed constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Simulated account size
    pub initial_capital: f64,
    /// Fraction of capital committed per trade (0.10 = 10%)
    pub position_size_pct: f64,
    /// Stop distance in ATR multiples
    pub stop_atr_mult: f64,
    /// Target distance in ATR multiples
    pub target_atr_mult: f64,
    /// Minimum volume ratio (volume / 20-bar volume MA) for mean reversion
    pub volume_threshold: f64,
    /// Minimum ATR ratio (ATR / 20-bar ATR MA) for mean reversion
    pub volatility_threshold: f64,
    /// |Z-score| cutoff for mean reversion
    pub zscore_cutoff: f64,
    /// Minimum |overnight gap| in percent for the gap-driven rules
    pub gap_threshold_pct: f64,
    /// Minimum |first-hour move| in percent for the extreme-move fade
    pub extreme_move_threshold_pct: f64,
    /// Minimum |reversal move| in percent for morning/evening reversal
    pub reversal_threshold_pct: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            position_size_pct: 0.10,
            stop_atr_mult: 2.0,
            target_atr_mult: 4.0,
            volume_threshold: 1.5,
            volatility_threshold: 1.2,
            zscore_cutoff: 2.0,
            gap_threshold_pct: 1.0,
            extreme_move_threshold_pct: 1.0,
            reversal_threshold_pct: 0.5,
        }
    }
}
