//! fadeboard: fade-strategy dashboard for a single symbol.
//!
//! Fetches bars, computes the indicator set, runs the signal rules and the
//! backtest, then writes an interactive HTML dashboard and prints a text
//! report. Watch mode re-runs the whole pipeline every 60 seconds and
//! rewrites the stable dashboard file in place.
//!
//! Usage:
//!   cargo run -p fade-app -- --symbol QQQ --days 60
//!   cargo run -p fade-app -- --symbol SPY --interval 15m --predict
//!   cargo run -p fade-app -- --offline bars.json --days 90
//!   cargo run -p fade-app -- --watch --out-dir charts

use std::sync::Arc;

use backtest::{BacktestConfig, BacktestEngine};
use chart::{build_dashboard, ChartWriter};
use chrono::{Duration, Utc};
use fade_core::{BarSource, StrategyError, Timeframe};
use indicators::{IndicatorConfig, IndicatorSet};
use market_data::{OfflineBars, QuoteClient};
use predictor::SignalModel;
use signal_engine::{SignalGenerator, StrategyConfig};

const REFRESH_SECS: u64 = 60;

struct RunOptions {
    symbol: String,
    timeframe: Timeframe,
    days: i64,
    predict: bool,
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fadeboard=info,market_data=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let watch = args.iter().any(|a| a == "--watch");
    let predict = args.iter().any(|a| a == "--predict");

    let symbol = flag_value(&args, "--symbol")
        .unwrap_or("QQQ")
        .to_uppercase();
    let days: i64 = flag_value(&args, "--days")
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    let interval = flag_value(&args, "--interval").unwrap_or("1d");
    let timeframe = Timeframe::parse(interval)
        .ok_or_else(|| anyhow::anyhow!("unknown interval {interval:?}, expected 5m/15m/1h/1d"))?;
    let out_dir = flag_value(&args, "--out-dir").unwrap_or("charts");

    let source: Arc<dyn BarSource> = match flag_value(&args, "--offline") {
        Some(path) => Arc::new(OfflineBars::new(path)),
        None => Arc::new(QuoteClient::from_env()?),
    };
    let writer = ChartWriter::new(out_dir);

    let options = RunOptions {
        symbol,
        timeframe,
        days,
        predict,
        watch,
    };

    if watch {
        tracing::info!(
            symbol = %options.symbol,
            "watch mode: refreshing every {}s, dashboard at {}",
            REFRESH_SECS,
            writer.latest_path(&options.symbol).display()
        );
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(REFRESH_SECS));
        loop {
            ticker.tick().await;
            // A failed refresh keeps the previous dashboard on screen
            if let Err(e) = run_once(source.as_ref(), &writer, &options).await {
                tracing::error!("refresh failed: {e}");
            }
        }
    } else {
        run_once(source.as_ref(), &writer, &options).await?;
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

async fn run_once(
    source: &dyn BarSource,
    writer: &ChartWriter,
    options: &RunOptions,
) -> anyhow::Result<()> {
    let to = Utc::now();
    let from = to - Duration::days(options.days);
    let bars = source
        .fetch_bars(&options.symbol, options.timeframe, from, to)
        .await?;
    tracing::info!(symbol = %options.symbol, bars = bars.len(), "fetched bars");

    let set = IndicatorSet::compute(&bars, &IndicatorConfig::default());

    let strategy = StrategyConfig::default();
    let generator = SignalGenerator::new(strategy.clone());
    let mut signals = generator.generate(&bars, &set);

    let engine = BacktestEngine::new(BacktestConfig {
        initial_capital: strategy.initial_capital,
        position_size_pct: strategy.position_size_pct,
        ..BacktestConfig::default()
    });
    let result = engine.run(&bars, &signals)?;

    if options.predict {
        match SignalModel::train(&bars, &set, &result.trades) {
            Ok(model) => model.score(&bars, &set, &mut signals),
            Err(StrategyError::InsufficientData(msg)) => {
                tracing::info!("prediction skipped: {msg}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let plot = build_dashboard(&options.symbol, &bars, &set, &signals);
    let refresh = options.watch.then_some(REFRESH_SECS);
    let (_, latest) = writer.write(&options.symbol, &plot, refresh)?;

    println!("{}", backtest::report::render_text(&options.symbol, &result));
    println!("Dashboard: {}", latest.display());

    if !signals.is_empty() {
        println!("\nRecent signals:");
        for signal in signals.iter().rev().take(5).rev() {
            let prob = signal
                .model_probability
                .map(|p| format!("  p(win) {:.0}%", p * 100.0))
                .unwrap_or_default();
            println!(
                "  {}  {:<16} {:<4} {}  entry {:.2}  stop {:.2}  target {:.2}{}",
                signal.timestamp.format("%Y-%m-%d %H:%M"),
                signal.kind.to_label(),
                signal.direction.to_label(),
                signal.tier.to_label(),
                signal.entry,
                signal.stop,
                signal.target,
                prob
            );
        }
    }
    Ok(())
}
