//! Data model shared by the indicator engine and the chart adapter.

pub mod models;
pub mod utils;

pub use models::{
    Bar, BarSeries, BollingerSeries, DerivedSeries, Indicator, IndicatorValue, InvalidSeriesError, MacdSeries,
};
