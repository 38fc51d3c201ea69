// Crossover detection between two derived series (MA cross, MACD golden/death cross)
// and level breaks (RSI oversold/overbought, close outside the Bollinger bands)
use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{BarSeries, DerivedSeries, IndicatorValue, MacdSeries};

use super::bollinger::bollinger_unrounded;
use super::rsi::rsi_unrounded;
use super::sma::compute_sma;
use crate::error::EngineError;

pub const DEFAULT_SHORT_WINDOW: usize = 5;
pub const DEFAULT_LONG_WINDOW: usize = 20;
pub const DEFAULT_THRESHOLD: f64 = 0.02;
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossKind {
    /// Fast line moved above the slow line (buy side).
    Golden,
    /// Fast line moved below the slow line (sell side).
    Death,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossSignal {
    pub index: usize,
    pub date: NaiveDate,
    pub kind: CrossKind,
    pub fast: f64,
    pub slow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// A value breaking through a level: `value` is the indicator (RSI) or the
/// close (bands), `level` the threshold or band it crossed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSignal {
    pub index: usize,
    pub date: NaiveDate,
    pub side: Side,
    pub value: f64,
    pub level: f64,
}

/// Finds the indices where `fast` crosses `slow` by more than `threshold`
/// (a fraction of the slow value). Both series must be aligned with `bars`;
/// a crossing is only reported when both lines are values on the bar and the
/// one before it.
pub fn detect_crosses(
    bars: &BarSeries,
    fast: &DerivedSeries,
    slow: &DerivedSeries,
    threshold: f64,
) -> Result<Vec<CrossSignal>, EngineError> {
    if !threshold.is_finite() || !(0.0..1.0).contains(&threshold) {
        return Err(EngineError::IndicatorError(format!(
            "Cross threshold must be in [0, 1), got {}",
            threshold
        )));
    }
    if fast.len() != bars.len() || slow.len() != bars.len() {
        return Err(EngineError::IndicatorError(format!(
            "Series lengths ({}, {}) do not match the bar count {}",
            fast.len(),
            slow.len(),
            bars.len()
        )));
    }

    let upper = 1.0 + threshold;
    let lower = 1.0 - threshold;
    let mut signals = Vec::new();

    for (index, bar) in bars.bars().iter().enumerate().skip(1) {
        let (Some(prev_fast), Some(prev_slow), Some(cur_fast), Some(cur_slow)) = (
            fast.get(index - 1).and_then(IndicatorValue::value),
            slow.get(index - 1).and_then(IndicatorValue::value),
            fast.get(index).and_then(IndicatorValue::value),
            slow.get(index).and_then(IndicatorValue::value),
        ) else {
            continue;
        };

        let kind = if cur_fast > cur_slow * upper && prev_fast <= prev_slow * upper {
            Some(CrossKind::Golden)
        } else if cur_fast < cur_slow * lower && prev_fast >= prev_slow * lower {
            Some(CrossKind::Death)
        } else {
            None
        };

        if let Some(kind) = kind {
            signals.push(CrossSignal {
                index,
                date: bar.date,
                kind,
                fast: cur_fast,
                slow: cur_slow,
            });
        }
    }
    Ok(signals)
}

/// SMA(short) against SMA(long).
pub fn ma_crosses(
    bars: &BarSeries,
    short_window: usize,
    long_window: usize,
    threshold: f64,
) -> Result<Vec<CrossSignal>, EngineError> {
    if short_window == 0 || long_window == 0 {
        return Err(EngineError::IndicatorError("Indicator period cannot be 0".to_string()));
    }
    let fast = compute_sma(bars, short_window);
    let slow = compute_sma(bars, long_window);
    detect_crosses(bars, &fast, &slow, threshold)
}

/// DIF against DEA, without a threshold.
pub fn macd_crosses(bars: &BarSeries, macd: &MacdSeries) -> Result<Vec<CrossSignal>, EngineError> {
    detect_crosses(bars, &macd.dif, &macd.dea, 0.0)
}

/// Buy when RSI drops below `oversold`, sell when it rises above
/// `overbought`. Decided on unrounded RSI.
pub fn rsi_signals(
    bars: &BarSeries,
    period: usize,
    oversold: f64,
    overbought: f64,
) -> Result<Vec<LevelSignal>, EngineError> {
    if period == 0 {
        return Err(EngineError::IndicatorError("Indicator period cannot be 0".to_string()));
    }
    let in_range = |level: f64| level.is_finite() && (0.0..=100.0).contains(&level);
    if !in_range(oversold) || !in_range(overbought) || oversold >= overbought {
        return Err(EngineError::IndicatorError(format!(
            "RSI levels must satisfy 0 <= oversold < overbought <= 100, got {} / {}",
            oversold, overbought
        )));
    }

    let rsi = rsi_unrounded(bars, period);
    let mut signals = Vec::new();
    for (index, bar) in bars.bars().iter().enumerate().skip(1) {
        let (Some(prev), Some(cur)) = (
            rsi.get(index - 1).and_then(IndicatorValue::value),
            rsi.get(index).and_then(IndicatorValue::value),
        ) else {
            continue;
        };

        let crossed = if cur < oversold && prev >= oversold {
            Some((Side::Buy, oversold))
        } else if cur > overbought && prev <= overbought {
            Some((Side::Sell, overbought))
        } else {
            None
        };

        if let Some((side, level)) = crossed {
            signals.push(LevelSignal { index, date: bar.date, side, value: cur, level });
        }
    }
    Ok(signals)
}

/// Buy when the close falls to the lower band from above it, sell when it
/// reaches the upper band from below.
pub fn bollinger_signals(bars: &BarSeries, window: usize, num_std: f64) -> Result<Vec<LevelSignal>, EngineError> {
    if window < 2 {
        return Err(EngineError::IndicatorError(format!(
            "Bollinger window must be at least 2, got {}",
            window
        )));
    }
    if !num_std.is_finite() || num_std <= 0.0 {
        return Err(EngineError::IndicatorError(format!(
            "Bollinger width must be a positive number of deviations, got {}",
            num_std
        )));
    }

    let bands = bollinger_unrounded(bars, window, num_std);
    let closes = bars.closes();
    let mut signals = Vec::new();
    for (index, bar) in bars.bars().iter().enumerate().skip(1) {
        let (Some(prev_upper), Some(prev_lower), Some(upper), Some(lower)) = (
            bands.upper.get(index - 1).and_then(IndicatorValue::value),
            bands.lower.get(index - 1).and_then(IndicatorValue::value),
            bands.upper.get(index).and_then(IndicatorValue::value),
            bands.lower.get(index).and_then(IndicatorValue::value),
        ) else {
            continue;
        };
        let (prev_close, close) = (closes[index - 1], closes[index]);

        let crossed = if close <= lower && prev_close > prev_lower {
            Some((Side::Buy, lower))
        } else if close >= upper && prev_close < prev_upper {
            Some((Side::Sell, upper))
        } else {
            None
        };

        if let Some((side, level)) = crossed {
            signals.push(LevelSignal { index, date: bar.date, side, value: close, level });
        }
    }
    Ok(signals)
}
