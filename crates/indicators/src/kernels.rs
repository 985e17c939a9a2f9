use fade_core::Bar;

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len());
    let multiplier = 2.0 / (period as f64 + 1.0);

    // Seed with SMA over the first period
    if data.len() < period {
        return vec![data.iter().sum::<f64>() / data.len() as f64];
    }

    let seed: f64 = data[..period].iter().sum::<f64>() / period as f64;
    result.push(seed);

    for i in 1..data.len() {
        let ema_val = (data[i] - result[i - 1]) * multiplier + result[i - 1];
        result.push(ema_val);
    }

    result
}

/// Relative Strength Index (Wilder smoothing)
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::new();
    let mut losses = Vec::new();

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut rsi_values = Vec::with_capacity(data.len() - period);

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;

        let rs = if avg_loss == 0.0 {
            100.0
        } else {
            avg_gain / avg_loss
        };

        rsi_values.push(100.0 - (100.0 / (1.0 + rs)));
    }

    rsi_values
}

/// Average True Range (Wilder smoothing)
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period + 1 {
        return vec![];
    }

    let mut true_ranges = Vec::new();

    for i in 1..bars.len() {
        let high_low = bars[i].high - bars[i].low;
        let high_close = (bars[i].high - bars[i - 1].close).abs();
        let low_close = (bars[i].low - bars[i - 1].close).abs();

        true_ranges.push(high_low.max(high_close).max(low_close));
    }

    let mut atr_values = Vec::new();
    let mut atr = true_ranges[..period].iter().sum::<f64>() / period as f64;
    atr_values.push(atr);

    for i in period..true_ranges.len() {
        atr = (atr * (period - 1) as f64 + true_ranges[i]) / period as f64;
        atr_values.push(atr);
    }

    atr_values
}

/// MACD (Moving Average Convergence Divergence)
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdResult {
    if fast_period == 0
        || slow_period == 0
        || signal_period == 0
        || slow_period < fast_period
        || data.len() < slow_period
    {
        return MacdResult {
            macd_line: vec![],
            signal_line: vec![],
            histogram: vec![],
        };
    }

    // Both EMAs are bar-aligned (one value per input bar); subtract at the
    // same index and drop the slow EMA's warmup entries.
    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    let mut macd_line = Vec::with_capacity(data.len() - slow_period + 1);
    for i in slow_period - 1..data.len() {
        macd_line.push(ema_fast[i] - ema_slow[i]);
    }

    let signal_line = ema(&macd_line, signal_period);

    let mut histogram = Vec::new();
    let hist_offset = macd_line.len().saturating_sub(signal_line.len());
    for i in 0..signal_line.len() {
        histogram.push(macd_line[i + hist_offset] - signal_line[i]);
    }

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bollinger Bands
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger_bands(data: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    if period == 0 || data.len() < period {
        return BollingerBands {
            upper: vec![],
            middle: vec![],
            lower: vec![],
        };
    }

    let middle = sma(data, period);
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for i in period - 1..data.len() {
        let slice = &data[i + 1 - period..=i];
        let mean = middle[i + 1 - period];
        let variance: f64 = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();

        upper.push(mean + std_dev * std);
        lower.push(mean - std_dev * std);
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Volume-Weighted Average Price, cumulative over the series
pub fn vwap(bars: &[Bar]) -> Vec<f64> {
    if bars.is_empty() {
        return vec![];
    }

    let mut vwap_values = Vec::with_capacity(bars.len());
    let mut cumulative_tpv = 0.0;
    let mut cumulative_volume = 0.0;

    for bar in bars {
        let typical_price = (bar.high + bar.low + bar.close) / 3.0;
        cumulative_tpv += typical_price * bar.volume;
        cumulative_volume += bar.volume;

        let vwap = if cumulative_volume > 0.0 {
            cumulative_tpv / cumulative_volume
        } else {
            typical_price
        };

        vwap_values.push(vwap);
    }

    vwap_values
}

/// Rolling Z-score: standardized deviation of each value from its trailing
/// window mean, using sample standard deviation. A degenerate window
/// (zero variance) yields 0.0.
pub fn rolling_zscore(data: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || data.len() < window {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - window + 1);
    for i in window - 1..data.len() {
        let slice = &data[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance: f64 =
            slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        let std = variance.sqrt();

        if std > 0.0 {
            result.push((data[i] - mean) / std);
        } else {
            result.push(0.0);
        }
    }
    result
}
