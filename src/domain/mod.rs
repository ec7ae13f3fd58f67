//! Simulation engine: alignment, allocation, valuation and metrics.

pub mod candle;
pub mod basket;
pub mod series;
pub mod alignment;
pub mod allocation;
pub mod valuation;
pub mod metrics;
pub mod analysis;
pub mod history;
pub mod error;
