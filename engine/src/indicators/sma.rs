// Simple Moving Average (SMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::{BarSeries, DerivedSeries, IndicatorValue};
use shared::utils::{mean, round2};

/// Mean of the last `window` closes ending at each index, rounded to cents.
///
/// Indices before `window - 1` are `InsufficientHistory`; so is every index
/// when the series is shorter than the window. A zero window yields an
/// all-gap series. Each window is summed afresh rather than with a running
/// sum, so values are bit-identical to a per-window mean.
pub fn compute_sma(bars: &BarSeries, window: usize) -> DerivedSeries {
    let closes = bars.closes();
    if window == 0 || closes.len() < window {
        return DerivedSeries::insufficient(closes.len());
    }

    let mut results = vec![IndicatorValue::InsufficientHistory; window - 1];
    results.extend(
        closes
            .windows(window)
            .map(|w| mean(w).map_or(IndicatorValue::InsufficientHistory, |m| IndicatorValue::Value(round2(m)))),
    );
    DerivedSeries::new(results)
}

pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("SMA({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, bars: &BarSeries) -> DerivedSeries {
        compute_sma(bars, self.period)
    }
}
