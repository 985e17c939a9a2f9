use chrono::{DateTime, Utc};
use fade_core::{ConfidenceTier, Direction, SignalKind};
use serde::{Deserialize, Serialize};

/// Configuration for a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Fraction of initial capital committed per trade (0.10 = 10%)
    pub position_size_pct: f64,
    /// Annual risk-free rate used by the risk-adjusted ratios
    pub risk_free_rate: f64,
    /// Bars per year for annualization (252 for daily bars)
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            position_size_pct: 0.10,
            risk_free_rate: 0.02,
            periods_per_year: 252.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Stop,
    Target,
}

/// How and when a trade closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExit {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub reason: ExitReason,
    /// Bars held between entry and exit
    pub holding_bars: usize,
}

/// One simulated trade. `exit` is `None` while the position is still open at
/// the end of the series; `pnl` is then marked to the last close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub kind: SignalKind,
    pub direction: Direction,
    pub tier: ConfidenceTier,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub stop: f64,
    pub target: f64,
    pub shares: f64,
    pub exit: Option<TradeExit>,
    pub pnl: f64,
    pub pnl_pct: f64,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.exit.is_none()
    }

    pub fn is_win(&self) -> bool {
        self.exit.is_some() && self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.exit.is_some() && self.pnl <= 0.0
    }
}

/// A point on the equity curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
    pub drawdown_pct: f64,
}

/// Per-rule breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindStats {
    pub kind: SignalKind,
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Win rate over closed trades, 0-100. `None` when no trade has closed.
    pub win_rate: Option<f64>,
    pub total_pnl: f64,
}

/// Result of a completed backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return_pct: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub open_trades: usize,
    /// Win rate over closed trades, 0-100
    pub win_rate: Option<f64>,
    /// Gross profit / gross loss. `None` when there are no losing trades.
    pub profit_factor: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub sortino_ratio: Option<f64>,
    pub calmar_ratio: Option<f64>,
    pub max_drawdown_pct: f64,
    pub average_win: Option<f64>,
    pub average_loss: Option<f64>,
    pub largest_win: Option<f64>,
    pub largest_loss: Option<f64>,
    pub avg_holding_bars: Option<f64>,
    pub by_kind: Vec<KindStats>,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
}
