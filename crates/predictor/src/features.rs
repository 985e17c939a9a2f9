use indicators::IndicatorSet;

pub const FEATURE_COUNT: usize = 6;

/// Indicator state at one bar, or `None` if any input is still warming up.
/// RSI is rescaled to roughly the same magnitude as the other inputs; the
/// model standardizes columns anyway, this just keeps raw rows readable.
pub fn feature_row(set: &IndicatorSet, idx: usize) -> Option<[f64; FEATURE_COUNT]> {
    let z = set.z_score.get(idx).copied().flatten()?;
    let volume_ratio = set.volume_ratio.get(idx).copied().flatten()?;
    let atr_ratio = set.atr_ratio.get(idx).copied().flatten()?;
    let gap = set.gap_pct.get(idx).copied().flatten()?;
    let rsi = set.rsi.get(idx).copied().flatten()?;
    let macd_hist = set.macd_histogram.get(idx).copied().flatten()?;

    Some([z, volume_ratio, atr_ratio, gap, rsi / 100.0, macd_hist])
}
