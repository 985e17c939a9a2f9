use fade_core::Bar;
use serde::{Deserialize, Serialize};

use crate::kernels;

/// Lookback windows for the indicator set. Defaults match the dashboard's
/// fixed constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub atr_period: usize,
    /// Window for the ATR moving average used in the volatility-regime ratio
    pub atr_ma_period: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub volume_ma_period: usize,
    /// Lookback for the rolling Z-score of the close
    pub zscore_window: usize,
    pub bollinger_period: usize,
    pub bollinger_std: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            atr_period: 14,
            atr_ma_period: 20,
            ema_fast_period: 20,
            ema_slow_period: 50,
            volume_ma_period: 20,
            zscore_window: 5,
            bollinger_period: 20,
            bollinger_std: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

/// Derived series aligned one-to-one with the bar series. Entries are `None`
/// during warmup (insufficient history) and wherever a computation is
/// undefined; downstream signal logic treats `None` as "no signal".
///
/// Recomputed in full on every refresh, never mutated incrementally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
    /// ATR relative to its own moving average (volatility regime)
    pub atr_ratio: Vec<Option<f64>>,
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub volume_ma: Vec<Option<f64>>,
    pub volume_ratio: Vec<Option<f64>>,
    pub z_score: Vec<Option<f64>>,
    /// Overnight gap as a percentage of the prior close
    pub gap_pct: Vec<Option<f64>>,
    /// (high - open) / open, percent
    pub morning_reversal_pct: Vec<Option<f64>>,
    /// (close - open) / open, percent
    pub evening_reversal_pct: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub vwap: Vec<Option<f64>>,
}

/// Right-align a warmup-trimmed kernel output with a series of `len` bars,
/// padding the front with `None` and dropping non-finite values.
fn align(values: Vec<f64>, len: usize) -> Vec<Option<f64>> {
    if values.len() > len {
        // Kernel produced more values than bars; should not happen, but
        // never let the set go out of alignment.
        return vec![None; len];
    }
    let offset = len - values.len();
    let mut out = vec![None; offset];
    out.extend(
        values
            .into_iter()
            .map(|v| if v.is_finite() { Some(v) } else { None }),
    );
    out
}

impl IndicatorSet {
    pub fn compute(bars: &[Bar], config: &IndicatorConfig) -> Self {
        let n = bars.len();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        let rsi = align(kernels::rsi(&closes, config.rsi_period), n);

        let atr_raw = kernels::atr(bars, config.atr_period);
        let atr_ma = kernels::sma(&atr_raw, config.atr_ma_period);
        let atr_ratio_raw: Vec<f64> = {
            let offset = atr_raw.len().saturating_sub(atr_ma.len());
            atr_ma
                .iter()
                .enumerate()
                .map(|(i, ma)| {
                    if *ma > 0.0 {
                        atr_raw[i + offset] / ma
                    } else {
                        f64::NAN
                    }
                })
                .collect()
        };
        let atr_ratio = align(atr_ratio_raw, n);
        let atr = align(atr_raw, n);

        let ema_fast = align(kernels::ema(&closes, config.ema_fast_period), n);
        let ema_slow = align(kernels::ema(&closes, config.ema_slow_period), n);

        let volume_ma_raw = kernels::sma(&volumes, config.volume_ma_period);
        let volume_ratio_raw: Vec<f64> = {
            let offset = volumes.len() - volume_ma_raw.len();
            volume_ma_raw
                .iter()
                .enumerate()
                .map(|(i, ma)| {
                    if *ma > 0.0 {
                        volumes[i + offset] / ma
                    } else {
                        f64::NAN
                    }
                })
                .collect()
        };
        let volume_ratio = align(volume_ratio_raw, n);
        let volume_ma = align(volume_ma_raw, n);

        let z_score = align(kernels::rolling_zscore(&closes, config.zscore_window), n);

        let mut gap_pct = vec![None; n.min(1)];
        for i in 1..n {
            let prev_close = bars[i - 1].close;
            if prev_close > 0.0 {
                gap_pct.push(Some((bars[i].open - prev_close) / prev_close * 100.0));
            } else {
                gap_pct.push(None);
            }
        }

        let morning_reversal_pct: Vec<Option<f64>> = bars
            .iter()
            .map(|b| {
                if b.open > 0.0 {
                    Some((b.high - b.open) / b.open * 100.0)
                } else {
                    None
                }
            })
            .collect();
        let evening_reversal_pct: Vec<Option<f64>> = bars
            .iter()
            .map(|b| {
                if b.open > 0.0 {
                    Some((b.close - b.open) / b.open * 100.0)
                } else {
                    None
                }
            })
            .collect();

        let macd_result = kernels::macd(
            &closes,
            config.macd_fast,
            config.macd_slow,
            config.macd_signal,
        );
        let macd_histogram = align(macd_result.histogram, n);

        let bb = kernels::bollinger_bands(&closes, config.bollinger_period, config.bollinger_std);
        let bb_upper = align(bb.upper, n);
        let bb_middle = align(bb.middle, n);
        let bb_lower = align(bb.lower, n);

        let vwap = align(kernels::vwap(bars), n);

        Self {
            rsi,
            atr,
            atr_ratio,
            ema_fast,
            ema_slow,
            volume_ma,
            volume_ratio,
            z_score,
            gap_pct,
            morning_reversal_pct,
            evening_reversal_pct,
            macd_histogram,
            bb_upper,
            bb_middle,
            bb_lower,
            vwap,
        }
    }

    /// Number of bars every series is aligned to
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.7).sin() * 4.0;
                Bar {
                    timestamp: start + Duration::days(i as i64),
                    open: base,
                    high: base + 1.5,
                    low: base - 1.5,
                    close: base + 0.5,
                    volume: 1_000_000.0 + (i as f64 * 1.3).cos() * 200_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn all_series_aligned_to_bar_count() {
        let bars = bars(120);
        let set = IndicatorSet::compute(&bars, &IndicatorConfig::default());

        let n = bars.len();
        assert_eq!(set.rsi.len(), n);
        assert_eq!(set.atr.len(), n);
        assert_eq!(set.atr_ratio.len(), n);
        assert_eq!(set.ema_fast.len(), n);
        assert_eq!(set.ema_slow.len(), n);
        assert_eq!(set.volume_ma.len(), n);
        assert_eq!(set.volume_ratio.len(), n);
        assert_eq!(set.z_score.len(), n);
        assert_eq!(set.gap_pct.len(), n);
        assert_eq!(set.morning_reversal_pct.len(), n);
        assert_eq!(set.evening_reversal_pct.len(), n);
        assert_eq!(set.macd_histogram.len(), n);
        assert_eq!(set.bb_upper.len(), n);
        assert_eq!(set.bb_middle.len(), n);
        assert_eq!(set.bb_lower.len(), n);
        assert_eq!(set.vwap.len(), n);
    }

    #[test]
    fn warmup_entries_are_none() {
        let bars = bars(60);
        let set = IndicatorSet::compute(&bars, &IndicatorConfig::default());

        // RSI needs period + 1 bars of history plus the Wilder seed
        assert!(set.rsi[..15].iter().all(|v| v.is_none()));
        assert!(set.rsi[20].is_some());
        // ATR needs period + 1 bars
        assert!(set.atr[..14].iter().all(|v| v.is_none()));
        assert!(set.atr[14].is_some());
        // First bar has no prior close, so no gap
        assert!(set.gap_pct[0].is_none());
        assert!(set.gap_pct[1].is_some());
    }

    #[test]
    fn gap_pct_matches_definition() {
        let bars = bars(10);
        let set = IndicatorSet::compute(&bars, &IndicatorConfig::default());

        for i in 1..bars.len() {
            let expected = (bars[i].open - bars[i - 1].close) / bars[i - 1].close * 100.0;
            let got = set.gap_pct[i].unwrap();
            assert!((got - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn short_history_yields_all_none_not_panic() {
        let bars = bars(3);
        let set = IndicatorSet::compute(&bars, &IndicatorConfig::default());
        assert_eq!(set.rsi.len(), 3);
        assert!(set.rsi.iter().all(|v| v.is_none()));
        assert!(set.atr.iter().all(|v| v.is_none()));
        assert!(set.z_score.iter().all(|v| v.is_none()));
    }
}
