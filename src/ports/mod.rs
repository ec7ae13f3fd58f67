//! Port traits for the engine's collaborators.

pub mod candle_port;
pub mod history_port;
pub mod config_port;
pub mod report_port;
