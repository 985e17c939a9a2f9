use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fade_core::{Bar, BarSource, StrategyError, Timeframe};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

const BASE_URL: &str = "https://api.polygon.io";

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let wait_until = match ts.front().and_then(|f| f.checked_add(self.window)) {
                Some(t) => t,
                None => now + self.window,
            };
            let sleep_dur = wait_until.duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!("rate limiter: waiting {:.1}s for an API slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Rate-limited client for the aggregates (bars) API.
#[derive(Clone)]
pub struct QuoteClient {
    api_key: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl QuoteClient {
    pub fn new(api_key: String) -> Self {
        // Free tier users should set QUOTE_API_RATE_LIMIT=5.
        let rate_limit: usize = std::env::var("QUOTE_API_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);

        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Build a client from the `QUOTE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, StrategyError> {
        let api_key = std::env::var("QUOTE_API_KEY")
            .map_err(|_| StrategyError::Api("QUOTE_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StrategyError> {
        let request = builder
            .build()
            .map_err(|e| StrategyError::Api(e.to_string()))?;

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| StrategyError::Api("cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| StrategyError::Api(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            let wait_secs = 15u64;
            tracing::warn!("429 rate limited, waiting {}s before retry {}/3", wait_secs, attempt + 1);
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(StrategyError::Api("rate limited after 3 retries".to_string()))
    }

    /// Get aggregate bars for a symbol over a date range.
    pub async fn get_aggregates(
        &self,
        symbol: &str,
        multiplier: u32,
        timespan: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, StrategyError> {
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/{}/{}/{}/{}",
            BASE_URL,
            symbol,
            multiplier,
            timespan,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );

        let response = self
            .send_request(self.client.get(&url).query(&[
                ("apiKey", &self.api_key),
                ("adjusted", &"true".to_string()),
                ("limit", &"50000".to_string()),
            ]))
            .await?;

        if !response.status().is_success() {
            return Err(StrategyError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let agg_response: AggregateResponse = response
            .json()
            .await
            .map_err(|e| StrategyError::Api(e.to_string()))?;

        let mut bars: Vec<Bar> = agg_response
            .results
            .into_iter()
            .filter_map(|r| {
                DateTime::from_timestamp_millis(r.t).map(|timestamp| Bar {
                    timestamp,
                    open: r.o,
                    high: r.h,
                    low: r.l,
                    close: r.c,
                    volume: r.v,
                })
            })
            .collect();
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

#[async_trait]
impl BarSource for QuoteClient {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, StrategyError> {
        let (multiplier, timespan) = timeframe.to_query();
        let bars = self.get_aggregates(symbol, multiplier, timespan, from, to).await?;
        if bars.is_empty() {
            return Err(StrategyError::InsufficientData(format!(
                "no bars returned for {symbol}"
            )));
        }
        Ok(bars)
    }
}

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    results: Vec<AggregateResult>,
}

#[derive(Debug, Deserialize)]
struct AggregateResult {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}
