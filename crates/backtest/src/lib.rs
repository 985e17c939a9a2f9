//! Historical evaluation of generated signals.
//!
//! Each signal becomes an independently sized trade. The engine scans the
//! bars after entry for a stop or target touch (stop checked first when both
//! fall inside one bar) and marks still-open trades to the last close. The
//! resulting trade list feeds the statistics and the text report.

pub mod engine;
pub mod metrics;
pub mod models;
pub mod report;


pub use engine::BacktestEngine;
pub use models::{
    BacktestConfig, BacktestResult, EquityPoint, ExitReason, KindStats, Trade, TradeExit,
};
