use fade_core::{Bar, ConfidenceTier, Direction, Signal, SignalKind};
use indicators::IndicatorSet;

use crate::StrategyConfig;

pub struct SignalGenerator {
    config: StrategyConfig,
}

impl SignalGenerator {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Evaluate every bar against the signal rules and return the emitted
    /// signals in bar order. Bars with missing indicator values are skipped.
    pub fn generate(&self, bars: &[Bar], set: &IndicatorSet) -> Vec<Signal> {
        let mut signals = Vec::new();

        for (i, bar) in bars.iter().enumerate() {
            // Every rule prices its stop/target off the bar's ATR
            let atr = match set.atr.get(i).copied().flatten() {
                Some(v) if v > 0.0 => v,
                _ => continue,
            };

            if let Some(signal) = self.mean_reversion(bar, set, i, atr) {
                signals.push(signal);
            }
            if let Some(signal) = self.gap_fade(bar, set, i, atr) {
                signals.push(signal);
            }
            if let Some(signal) = self.extreme_fade(bar, set, i, atr) {
                signals.push(signal);
            }
            if let Some(signal) = self.reversal(bar, set, i, atr, SignalKind::MorningReversal) {
                signals.push(signal);
            }
            if let Some(signal) = self.reversal(bar, set, i, atr, SignalKind::EveningReversal) {
                signals.push(signal);
            }
        }

        tracing::debug!(count = signals.len(), "generated signals");
        signals
    }

    /// Z-score extreme against the prevailing EMA trend, confirmed by volume
    /// and an elevated volatility regime. Entry at the close.
    fn mean_reversion(
        &self,
        bar: &Bar,
        set: &IndicatorSet,
        i: usize,
        atr: f64,
    ) -> Option<Signal> {
        let z = set.z_score.get(i).copied().flatten()?;
        let ema_fast = set.ema_fast.get(i).copied().flatten()?;
        let ema_slow = set.ema_slow.get(i).copied().flatten()?;
        let volume_ratio = set.volume_ratio.get(i).copied().flatten()?;
        let atr_ratio = set.atr_ratio.get(i).copied().flatten()?;

        let cfg = &self.config;
        let high_volume = volume_ratio > cfg.volume_threshold;
        let high_volatility = atr_ratio > cfg.volatility_threshold;
        if !high_volume || !high_volatility {
            return None;
        }

        let uptrend = ema_fast > ema_slow;
        let direction = if uptrend && z < -cfg.zscore_cutoff {
            Direction::Long
        } else if !uptrend && z > cfg.zscore_cutoff {
            Direction::Short
        } else {
            return None;
        };

        let excess = (z.abs() / cfg.zscore_cutoff)
            .min(volume_ratio / cfg.volume_threshold)
            .min(atr_ratio / cfg.volatility_threshold);

        let reason = match direction {
            Direction::Long => format!("Oversold in uptrend (z {:.2}, volume {:.1}x)", z, volume_ratio),
            Direction::Short => format!("Overbought in downtrend (z {:.2}, volume {:.1}x)", z, volume_ratio),
        };

        Some(self.build(bar, SignalKind::MeanReversion, direction, excess, bar.close, atr, reason))
    }

    /// Fade an outsized overnight gap at the open.
    fn gap_fade(&self, bar: &Bar, set: &IndicatorSet, i: usize, atr: f64) -> Option<Signal> {
        let gap = set.gap_pct.get(i).copied().flatten()?;
        let cfg = &self.config;

        let direction = if gap > cfg.gap_threshold_pct {
            Direction::Short
        } else if gap < -cfg.gap_threshold_pct {
            Direction::Long
        } else {
            return None;
        };

        let excess = gap.abs() / cfg.gap_threshold_pct;
        let reason = match direction {
            Direction::Long => format!("Gap down fade ({:.2}%)", gap),
            Direction::Short => format!("Gap up fade (+{:.2}%)", gap),
        };

        Some(self.build(bar, SignalKind::GapFade, direction, excess, bar.open, atr, reason))
    }

    /// Fade an outsized first-hour move at the close, regardless of any gap.
    fn extreme_fade(&self, bar: &Bar, set: &IndicatorSet, i: usize, atr: f64) -> Option<Signal> {
        let move_pct = set.morning_reversal_pct.get(i).copied().flatten()?;
        let cfg = &self.config;
        if move_pct.abs() < cfg.extreme_move_threshold_pct {
            return None;
        }

        let direction = if move_pct > 0.0 {
            Direction::Short
        } else {
            Direction::Long
        };
        let excess = move_pct.abs() / cfg.extreme_move_threshold_pct;
        let reason = match direction {
            Direction::Long => format!("Extreme down move fade ({move_pct:.2}%)"),
            Direction::Short => format!("Extreme up move fade (+{move_pct:.2}%)"),
        };

        Some(self.build(bar, SignalKind::ExtremeFade, direction, excess, bar.close, atr, reason))
    }

    /// Gap plus an intraday move back against it. The morning variant reads
    /// the open-to-high recovery and enters at the open; the evening variant
    /// reads the open-to-close move and enters at the close.
    fn reversal(
        &self,
        bar: &Bar,
        set: &IndicatorSet,
        i: usize,
        atr: f64,
        kind: SignalKind,
    ) -> Option<Signal> {
        let gap = set.gap_pct.get(i).copied().flatten()?;
        let (move_pct, entry) = match kind {
            SignalKind::MorningReversal => {
                (set.morning_reversal_pct.get(i).copied().flatten()?, bar.open)
            }
            SignalKind::EveningReversal => {
                (set.evening_reversal_pct.get(i).copied().flatten()?, bar.close)
            }
            _ => return None,
        };

        let cfg = &self.config;
        let direction = if gap < -cfg.gap_threshold_pct && move_pct > cfg.reversal_threshold_pct {
            Direction::Long
        } else if gap > cfg.gap_threshold_pct && move_pct < -cfg.reversal_threshold_pct {
            Direction::Short
        } else {
            return None;
        };

        let excess = (gap.abs() / cfg.gap_threshold_pct)
            .min(move_pct.abs() / cfg.reversal_threshold_pct);

        let label = match kind {
            SignalKind::MorningReversal => "Morning",
            _ => "Evening",
        };
        let reason = match direction {
            Direction::Long => format!("{label} recovery after {:.2}% gap down", gap),
            Direction::Short => format!("{label} fade after +{:.2}% gap up", gap),
        };

        Some(self.build(bar, kind, direction, excess, entry, atr, reason))
    }

    fn build(
        &self,
        bar: &Bar,
        kind: SignalKind,
        direction: Direction,
        excess: f64,
        entry: f64,
        atr: f64,
        reason: String,
    ) -> Signal {
        let cfg = &self.config;
        let (stop, target) = match direction {
            Direction::Long => (
                entry - atr * cfg.stop_atr_mult,
                entry + atr * cfg.target_atr_mult,
            ),
            Direction::Short => (
                entry + atr * cfg.stop_atr_mult,
                entry - atr * cfg.target_atr_mult,
            ),
        };

        Signal {
            timestamp: bar.timestamp,
            kind,
            direction,
            tier: ConfidenceTier::from_excess(excess),
            entry,
            stop,
            target,
            reason,
            model_probability: None,
        }
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}
