//! Risk-adjusted return ratios over the equity curve.

use statrs::statistics::Statistics;

use crate::models::EquityPoint;

/// Bar-to-bar simple returns of the equity curve.
pub fn equity_returns(curve: &[EquityPoint]) -> Vec<f64> {
    curve
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
        .collect()
}

/// Annualized Sharpe ratio. `None` when there are too few returns or the
/// volatility is zero.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let mean = returns.mean();
    let std_dev = returns.std_dev();
    if std_dev == 0.0 || !std_dev.is_finite() {
        return None;
    }
    let annualized_return = mean * periods_per_year;
    let annualized_vol = std_dev * periods_per_year.sqrt();
    Some((annualized_return - risk_free_rate) / annualized_vol)
}

/// Annualized Sortino ratio, penalizing only downside deviation below the
/// per-period risk-free rate.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let rf_per_period = risk_free_rate / periods_per_year;
    let downside: Vec<f64> = returns
        .iter()
        .filter(|&&r| r < rf_per_period)
        .map(|&r| (r - rf_per_period).powi(2))
        .collect();
    if downside.is_empty() {
        return None;
    }
    let downside_dev = (downside.iter().sum::<f64>() / returns.len() as f64).sqrt();
    if downside_dev == 0.0 {
        return None;
    }
    let annualized_return = returns.mean() * periods_per_year;
    let annualized_downside = downside_dev * periods_per_year.sqrt();
    Some((annualized_return - risk_free_rate) / annualized_downside)
}

/// Annualized return over maximum drawdown. `None` when no drawdown occurred.
pub fn calmar_ratio(
    returns: &[f64],
    max_drawdown_pct: f64,
    periods_per_year: f64,
) -> Option<f64> {
    if returns.is_empty() || max_drawdown_pct <= 0.0 {
        return None;
    }
    let annualized_return = returns.mean() * periods_per_year * 100.0;
    Some(annualized_return / max_drawdown_pct)
}
