//! Interactive HTML dashboard: candlestick chart with overlays and signal
//! markers, plus volume, RSI, Z-score, and gap panes stacked below it.

mod dashboard;
mod writer;

pub use dashboard::build_dashboard;
pub use writer::{render_html, ChartWriter};
