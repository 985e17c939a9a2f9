use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fade_core::{Bar, Direction, Signal, SignalKind, StrategyError};

use crate::metrics;
use crate::models::*;

/// Replays signals against the bar series they were generated from.
///
/// Entry fills on the signal bar at the signal's entry price. From the next
/// bar on, each bar's range is checked against the stop and then the target,
/// so a bar spanning both resolves as a stop. Every trade is sized as a fixed
/// fraction of initial capital, independent of the others.
pub struct BacktestEngine {
    config: BacktestConfig,
}

struct SimTrade {
    trade: Trade,
    entry_idx: usize,
    exit_idx: Option<usize>,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, bars: &[Bar], signals: &[Signal]) -> Result<BacktestResult, StrategyError> {
        if bars.is_empty() {
            return Err(StrategyError::InsufficientData(
                "backtest requires at least one bar".into(),
            ));
        }

        let index_by_time: HashMap<DateTime<Utc>, usize> = bars
            .iter()
            .enumerate()
            .map(|(i, b)| (b.timestamp, i))
            .collect();

        let mut sims: Vec<SimTrade> = Vec::with_capacity(signals.len());
        for signal in signals {
            let Some(&entry_idx) = index_by_time.get(&signal.timestamp) else {
                tracing::warn!(timestamp = %signal.timestamp, "signal has no matching bar, skipped");
                continue;
            };
            if signal.entry <= 0.0 {
                continue;
            }
            let shares = self.config.initial_capital * self.config.position_size_pct
                / signal.entry;
            sims.push(self.simulate(bars, signal, entry_idx, shares));
        }

        let equity_curve = self.build_equity_curve(bars, &sims);
        let trades: Vec<Trade> = sims.into_iter().map(|s| s.trade).collect();
        Ok(self.summarize(trades, equity_curve))
    }

    fn simulate(&self, bars: &[Bar], signal: &Signal, entry_idx: usize, shares: f64) -> SimTrade {
        let mut exit = None;
        let mut exit_idx = None;

        for (j, bar) in bars.iter().enumerate().skip(entry_idx + 1) {
            let hit = match signal.direction {
                Direction::Long => {
                    if bar.low <= signal.stop {
                        Some((signal.stop, ExitReason::Stop))
                    } else if bar.high >= signal.target {
                        Some((signal.target, ExitReason::Target))
                    } else {
                        None
                    }
                }
                Direction::Short => {
                    if bar.high >= signal.stop {
                        Some((signal.stop, ExitReason::Stop))
                    } else if bar.low <= signal.target {
                        Some((signal.target, ExitReason::Target))
                    } else {
                        None
                    }
                }
            };

            if let Some((price, reason)) = hit {
                exit = Some(TradeExit {
                    timestamp: bar.timestamp,
                    price,
                    reason,
                    holding_bars: j - entry_idx,
                });
                exit_idx = Some(j);
                break;
            }
        }

        // Open trades are marked to the last close
        let exit_price = exit
            .as_ref()
            .map(|e| e.price)
            .unwrap_or_else(|| bars[bars.len() - 1].close);
        let pnl = match signal.direction {
            Direction::Long => (exit_price - signal.entry) * shares,
            Direction::Short => (signal.entry - exit_price) * shares,
        };
        let pnl_pct = pnl / (signal.entry * shares) * 100.0;

        SimTrade {
            trade: Trade {
                kind: signal.kind,
                direction: signal.direction,
                tier: signal.tier,
                entry_time: signal.timestamp,
                entry_price: signal.entry,
                stop: signal.stop,
                target: signal.target,
                shares,
                exit,
                pnl,
                pnl_pct,
            },
            entry_idx,
            exit_idx,
        }
    }

    fn build_equity_curve(&self, bars: &[Bar], sims: &[SimTrade]) -> Vec<EquityPoint> {
        let mut curve = Vec::with_capacity(bars.len());
        let mut peak = self.config.initial_capital;

        for (t, bar) in bars.iter().enumerate() {
            let mut equity = self.config.initial_capital;
            for sim in sims {
                if t < sim.entry_idx {
                    continue;
                }
                match sim.exit_idx {
                    Some(j) if t >= j => equity += sim.trade.pnl,
                    _ => {
                        // Still open at bar t: mark to this bar's close
                        let mtm = match sim.trade.direction {
                            Direction::Long => (bar.close - sim.trade.entry_price) * sim.trade.shares,
                            Direction::Short => (sim.trade.entry_price - bar.close) * sim.trade.shares,
                        };
                        equity += mtm;
                    }
                }
            }

            peak = peak.max(equity);
            let drawdown_pct = if peak > 0.0 {
                (peak - equity) / peak * 100.0
            } else {
                0.0
            };
            curve.push(EquityPoint {
                timestamp: bar.timestamp,
                equity,
                drawdown_pct,
            });
        }
        curve
    }

    fn summarize(&self, trades: Vec<Trade>, equity_curve: Vec<EquityPoint>) -> BacktestResult {
        let winning_trades = trades.iter().filter(|t| t.is_win()).count();
        let losing_trades = trades.iter().filter(|t| t.is_loss()).count();
        let open_trades = trades.iter().filter(|t| t.is_open()).count();
        let closed = winning_trades + losing_trades;

        let win_rate = if closed > 0 {
            Some(winning_trades as f64 / closed as f64 * 100.0)
        } else {
            None
        };

        let gross_profit: f64 = trades
            .iter()
            .filter(|t| t.is_win())
            .map(|t| t.pnl)
            .sum();
        let gross_loss: f64 = trades
            .iter()
            .filter(|t| t.is_loss())
            .map(|t| t.pnl.abs())
            .sum();
        let profit_factor = if gross_loss > 0.0 {
            Some(gross_profit / gross_loss)
        } else {
            None
        };

        let wins: Vec<f64> = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl).collect();
        let losses: Vec<f64> = trades.iter().filter(|t| t.is_loss()).map(|t| t.pnl).collect();
        let average_win = if wins.is_empty() {
            None
        } else {
            Some(wins.iter().sum::<f64>() / wins.len() as f64)
        };
        let average_loss = if losses.is_empty() {
            None
        } else {
            Some(losses.iter().sum::<f64>() / losses.len() as f64)
        };
        let largest_win = wins.iter().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        });
        let largest_loss = losses.iter().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.min(v)))
        });

        let holding: Vec<usize> = trades
            .iter()
            .filter_map(|t| t.exit.as_ref().map(|e| e.holding_bars))
            .collect();
        let avg_holding_bars = if holding.is_empty() {
            None
        } else {
            Some(holding.iter().sum::<usize>() as f64 / holding.len() as f64)
        };

        let by_kind = SignalKind::ALL
            .iter()
            .map(|&kind| {
                let subset: Vec<&Trade> = trades.iter().filter(|t| t.kind == kind).collect();
                let wins = subset.iter().filter(|t| t.is_win()).count();
                let losses = subset.iter().filter(|t| t.is_loss()).count();
                KindStats {
                    kind,
                    trades: subset.len(),
                    wins,
                    losses,
                    win_rate: if wins + losses > 0 {
                        Some(wins as f64 / (wins + losses) as f64 * 100.0)
                    } else {
                        None
                    },
                    total_pnl: subset.iter().map(|t| t.pnl).sum(),
                }
            })
            .collect();

        let final_capital = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.config.initial_capital);
        let total_return_pct =
            (final_capital - self.config.initial_capital) / self.config.initial_capital * 100.0;

        let returns = metrics::equity_returns(&equity_curve);
        let sharpe_ratio = metrics::sharpe_ratio(
            &returns,
            self.config.risk_free_rate,
            self.config.periods_per_year,
        );
        let sortino_ratio = metrics::sortino_ratio(
            &returns,
            self.config.risk_free_rate,
            self.config.periods_per_year,
        );
        let max_drawdown_pct = equity_curve
            .iter()
            .map(|p| p.drawdown_pct)
            .fold(0.0, f64::max);
        let calmar_ratio =
            metrics::calmar_ratio(&returns, max_drawdown_pct, self.config.periods_per_year);

        tracing::info!(
            trades = trades.len(),
            wins = winning_trades,
            losses = losing_trades,
            open = open_trades,
            return_pct = total_return_pct,
            "backtest complete"
        );

        BacktestResult {
            initial_capital: self.config.initial_capital,
            final_capital,
            total_return_pct,
            total_trades: trades.len(),
            winning_trades,
            losing_trades,
            open_trades,
            win_rate,
            profit_factor,
            sharpe_ratio,
            sortino_ratio,
            calmar_ratio,
            max_drawdown_pct,
            average_win,
            average_loss,
            largest_win,
            largest_loss,
            avg_holding_bars,
            by_kind,
            equity_curve,
            trades,
        }
    }
}

impl Default for BacktestEngine {
    fn default() -> Self {
        Self::new(BacktestConfig::default())
    }
}
