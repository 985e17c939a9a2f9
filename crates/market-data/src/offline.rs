use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fade_core::{Bar, BarSource, StrategyError, Timeframe};

/// Reads bars from a JSON file (an array of bars) instead of the network.
/// Useful for replaying saved sessions and for development without an API
/// key. Bars outside the requested range are dropped.
pub struct OfflineBars {
    path: PathBuf,
}

impl OfflineBars {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BarSource for OfflineBars {
    async fn fetch_bars(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, StrategyError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let mut bars: Vec<Bar> = serde_json::from_str(&raw)
            .map_err(|e| StrategyError::InvalidData(format!("{}: {e}", self.path.display())))?;

        bars.retain(|b| b.timestamp >= from && b.timestamp <= to);
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);

        if bars.is_empty() {
            return Err(StrategyError::InsufficientData(format!(
                "no bars for {symbol} in {}",
                self.path.display()
            )));
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_bars(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Bar {
                timestamp: start + Duration::days(i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.5,
                volume: 1_000_000.0,
            })
            .collect()
    }

    fn write_temp(name: &str, bars: &[Bar]) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, serde_json::to_string(bars).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn reads_and_filters_by_range() {
        let bars = sample_bars(10);
        let path = write_temp("offline_bars_range.json", &bars);

        let source = OfflineBars::new(&path);
        let from = bars[2].timestamp;
        let to = bars[6].timestamp;
        let result = source.fetch_bars("QQQ", Timeframe::Day1, from, to).await.unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(result[0].timestamp, from);
        assert_eq!(result.last().unwrap().timestamp, to);
    }

    #[tokio::test]
    async fn sorts_out_of_order_input() {
        let mut bars = sample_bars(5);
        bars.swap(0, 4);
        let path = write_temp("offline_bars_sorted.json", &bars);

        let source = OfflineBars::new(&path);
        let from = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let result = source.fetch_bars("QQQ", Timeframe::Day1, from, to).await.unwrap();

        for w in result.windows(2) {
            assert!(w[0].timestamp < w[1].timestamp);
        }
    }

    #[tokio::test]
    async fn empty_range_is_insufficient_data() {
        let bars = sample_bars(3);
        let path = write_temp("offline_bars_empty.json", &bars);

        let source = OfflineBars::new(&path);
        let from = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
        let err = source.fetch_bars("QQQ", Timeframe::Day1, from, to).await.unwrap_err();
        assert!(matches!(err, StrategyError::InsufficientData(_)));
    }

    #[tokio::test]
    async fn malformed_file_is_invalid_data() {
        let path = std::env::temp_dir().join("offline_bars_bad.json");
        std::fs::write(&path, "not json").unwrap();

        let source = OfflineBars::new(&path);
        let from = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let err = source.fetch_bars("QQQ", Timeframe::Day1, from, to).await.unwrap_err();
        assert!(matches!(err, StrategyError::InvalidData(_)));
    }
}
