pub mod kernels;
pub mod set;

#[cfg(test)]
mod kernels_tests;

pub use kernels::*;
pub use set::{IndicatorConfig, IndicatorSet};
