// Relative Strength Index (RSI) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::{BarSeries, DerivedSeries, IndicatorValue};
use shared::utils::mean;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI from plain (rolling-mean) averages of the last `period` gains and
/// losses, as the strategy screens compute it. The first value needs
/// `period` price changes, so it lands at index `period`.
pub fn compute_rsi(bars: &BarSeries, period: usize) -> DerivedSeries {
    rsi_unrounded(bars, period).rounded()
}

pub(crate) fn rsi_unrounded(bars: &BarSeries, period: usize) -> DerivedSeries {
    let closes = bars.closes();
    if period == 0 || closes.len() <= period {
        return DerivedSeries::insufficient(closes.len());
    }

    let gains: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = closes.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    let mut results = vec![IndicatorValue::InsufficientHistory; period];
    for end in period..=gains.len() {
        let avg_gain = mean(&gains[end - period..end]).unwrap_or(0.0);
        let avg_loss = mean(&losses[end - period..end]).unwrap_or(0.0);
        results.push(IndicatorValue::Value(rsi_from_averages(avg_gain, avg_loss)));
    }
    DerivedSeries::new(results)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // Flat window reads as neutral; only gains reads as 100.
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("RSI({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, bars: &BarSeries) -> DerivedSeries {
        compute_rsi(bars, self.period)
    }
}
