use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Bar, StrategyError, Timeframe};

/// Source of historical bars: the HTTP quote client in normal runs, a
/// local file in offline runs.
#[async_trait]
pub trait BarSource: Send + Sync {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, StrategyError>;
}
