//! Rule-based fade/mean-reversion signal generation.
//!
//! For each bar the generator evaluates gap size, volume ratio, volatility
//! regime, and Z-score against configured thresholds and emits a `Signal`
//! when a rule's gates all pass. The confidence tier is derived from how far
//! the gating values exceed their thresholds; stop and target come from the
//! bar's ATR. A missing indicator value simply skips the bar.

pub mod config;
pub mod generator;


pub use config::StrategyConfig;
pub use generator::SignalGenerator;
