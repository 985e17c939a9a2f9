//! Bar sources: a rate-limited HTTP client for the aggregates API and an
//! offline JSON file reader, both behind the [`BarSource`] trait.

mod client;
mod offline;

pub use client::QuoteClient;
pub use offline::OfflineBars;
