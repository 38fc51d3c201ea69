// Indicator overlay for the candlestick chart, recomputed whenever the bars change
use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{BarSeries, DerivedSeries, Indicator, MacdSeries};
use std::collections::BTreeMap;

use crate::config::settings::IndicatorSettings;
use crate::error::EngineError;
use crate::indicators::macd::DEA_SEED_INDEX;
use crate::indicators::{
    compute_ema_with, compute_macd_with, compute_sma, Ema, IndicatorCalculator, Rsi, Sma, DEFAULT_RSI_PERIOD,
    MACD_FAST, MACD_SLOW,
};

const DEFAULT_PERIOD: usize = 20;

/// Everything the chart adapter draws over the candles. Every series is
/// index-aligned with `dates`; gaps render as no point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOverlay {
    pub dates: Vec<NaiveDate>,
    pub sma: BTreeMap<usize, DerivedSeries>,
    pub ema12: DerivedSeries,
    pub ema26: DerivedSeries,
    pub macd: MacdSeries,
}

pub fn build_overlay(bars: &BarSeries, settings: &IndicatorSettings) -> Result<ChartOverlay, EngineError> {
    tracing::debug!(
        bars = bars.len(),
        sma_windows = ?settings.sma_windows,
        precision = ?settings.precision,
        validate = settings.validate,
        "Building chart overlay"
    );

    if settings.validate {
        bars.validate().map_err(|e| {
            tracing::error!(error_detail = %e, "Rejected bar series");
            EngineError::from(e)
        })?;
    }
    if settings.sma_windows.contains(&0) {
        tracing::error!(sma_windows = ?settings.sma_windows, "Zero SMA window requested");
        return Err(EngineError::IndicatorError("Indicator period cannot be 0".to_string()));
    }
    if bars.len() <= DEA_SEED_INDEX {
        tracing::warn!(
            bars = bars.len(),
            needed = DEA_SEED_INDEX + 1,
            "Series too short for a MACD signal line; DEA and histogram will be empty"
        );
    }

    let sma = settings
        .sma_windows
        .iter()
        .map(|&window| (window, compute_sma(bars, window)))
        .collect();

    Ok(ChartOverlay {
        dates: bars.dates(),
        sma,
        ema12: compute_ema_with(bars, MACD_FAST, settings.precision),
        ema26: compute_ema_with(bars, MACD_SLOW, settings.precision),
        macd: compute_macd_with(bars, settings.precision),
    })
}

/// Answers a single named indicator request (`sma`, `ema`, `rsi`), with
/// JSON parameters such as `{"period": 10}`.
pub fn calculate_indicator(
    bars: &BarSeries,
    indicator_type: &str,
    parameters: &str,
    settings: &IndicatorSettings,
) -> Result<Indicator, EngineError> {
    tracing::debug!(indicator_type = %indicator_type, parameters = %parameters, "Handling indicator request");

    let params: serde_json::Value = if parameters.trim().is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(parameters).map_err(|e| {
            tracing::error!(
                indicator_type = %indicator_type,
                parameters = %parameters,
                error_detail = ?e,
                "Invalid JSON parameters for indicator"
            );
            EngineError::IndicatorError(format!("Invalid JSON parameters for indicator '{}': {}", indicator_type, e))
        })?
    };

    if settings.validate {
        bars.validate()?;
    }

    let indicator_calculator: Box<dyn IndicatorCalculator> = match indicator_type.to_lowercase().as_str() {
        "sma" => Box::new(Sma::new(period_param(&params, DEFAULT_PERIOD)?)),
        "ema" => Box::new(Ema::with_precision(period_param(&params, DEFAULT_PERIOD)?, settings.precision)),
        "rsi" => Box::new(Rsi::new(period_param(&params, DEFAULT_RSI_PERIOD)?)),
        "kdj" => {
            tracing::error!(indicator_type = %indicator_type, "Indicator has no computation");
            return Err(EngineError::IndicatorError("KDJ is not implemented".to_string()));
        }
        _ => {
            tracing::error!(indicator_type = %indicator_type, "Unknown indicator type requested");
            return Err(EngineError::IndicatorError(format!("Unknown indicator type: {}", indicator_type)));
        }
    };

    Ok(Indicator {
        name: indicator_calculator.name().to_string(),
        parameters: indicator_calculator.parameters(),
        values: indicator_calculator.calculate(bars),
    })
}

// A missing `period` takes the default; anything but a positive integer is rejected.
fn period_param(params: &serde_json::Value, default: usize) -> Result<usize, EngineError> {
    let Some(raw) = params.get("period") else {
        return Ok(default);
    };
    let period = raw.as_u64().and_then(|p| usize::try_from(p).ok()).ok_or_else(|| {
        tracing::error!(period = %raw, "Invalid indicator period");
        EngineError::IndicatorError(format!("Indicator period must be a positive integer, got {}", raw))
    })?;
    if period == 0 {
        return Err(EngineError::IndicatorError("Indicator period cannot be 0".to_string()));
    }
    Ok(period)
}
