use std::fmt::Write;

use crate::models::BacktestResult;

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Render the backtest summary as a plain-text report for the terminal.
pub fn render_text(symbol: &str, result: &BacktestResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Fade Strategy Backtest: {symbol} ===");
    let _ = writeln!(out);
    let _ = writeln!(out, "Capital:        {:>12.2} -> {:>12.2}", result.initial_capital, result.final_capital);
    let _ = writeln!(out, "Total return:   {:>11.2}%", result.total_return_pct);
    let _ = writeln!(out, "Max drawdown:   {:>11.2}%", result.max_drawdown_pct);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Trades:         {} total ({} wins, {} losses, {} open)",
        result.total_trades, result.winning_trades, result.losing_trades, result.open_trades
    );
    let _ = writeln!(out, "Win rate:       {}%", opt(result.win_rate));
    let _ = writeln!(out, "Profit factor:  {}", opt(result.profit_factor));
    let _ = writeln!(out, "Avg win/loss:   {} / {}", opt(result.average_win), opt(result.average_loss));
    let _ = writeln!(out, "Largest:        {} / {}", opt(result.largest_win), opt(result.largest_loss));
    let _ = writeln!(out, "Avg hold:       {} bars", opt(result.avg_holding_bars));
    let _ = writeln!(out);
    let _ = writeln!(out, "Sharpe:         {}", opt(result.sharpe_ratio));
    let _ = writeln!(out, "Sortino:        {}", opt(result.sortino_ratio));
    let _ = writeln!(out, "Calmar:         {}", opt(result.calmar_ratio));
    let _ = writeln!(out);
    let _ = writeln!(out, "By rule:");
    for stats in &result.by_kind {
        let _ = writeln!(
            out,
            "  {:<18} {:>3} trades  {:>3} wins  win rate {:>6}%  pnl {:>10.2}",
            stats.kind.to_label(),
            stats.trades,
            stats.wins,
            opt(stats.win_rate),
            stats.total_pnl
        );
    }
    out
}
