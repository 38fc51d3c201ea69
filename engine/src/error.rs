use shared::models::InvalidSeriesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    // Only produced when the caller opts into validation.
    #[error("Invalid bar series: {source}")]
    InvalidSeries {
        #[from]
        source: InvalidSeriesError,
    },

    #[error("Indicator calculation error: {0}")]
    IndicatorError(String),

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}
