// Engine library root
// Indicator computation for the stock dashboard's candlestick chart.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod services;

pub use error::EngineError;
