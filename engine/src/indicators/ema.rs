// Exponential Moving Average (EMA) indicator implementation
use super::{IndicatorCalculator, Precision};
use serde_json::Value;
use shared::models::{BarSeries, DerivedSeries, IndicatorValue};
use shared::utils::mean;

/// EMA of the closes with the dashboard's seeding: the first value, at index
/// `window - 1`, is the plain mean of the first `window` closes; later values
/// follow `(close - prev) * k + prev` with `k = 2 / (window + 1)`, each step
/// rounded to cents before it feeds the next.
pub fn compute_ema(bars: &BarSeries, window: usize) -> DerivedSeries {
    compute_ema_with(bars, window, Precision::Legacy)
}

pub fn compute_ema_with(bars: &BarSeries, window: usize, precision: Precision) -> DerivedSeries {
    precision.publish(ema_unpublished(bars, window, precision))
}

// Values as they feed further recurrences (unrounded in full precision).
pub(crate) fn ema_unpublished(bars: &BarSeries, window: usize, precision: Precision) -> DerivedSeries {
    if window == 0 {
        return DerivedSeries::insufficient(bars.len());
    }
    let closes: Vec<IndicatorValue> = bars.bars().iter().map(|b| IndicatorValue::Value(b.close)).collect();
    seeded_smoothing(&closes, window, window - 1, precision)
}

/// Seeded exponential smoothing of an already-derived series.
///
/// Gaps before `seed_at`; at `seed_at` the mean of the `window` inputs ending
/// there (a gap if any of them is one); afterwards the EMA recurrence. When
/// the previous output is a gap the input value is taken as-is for that step,
/// and a gap in the input stays a gap.
pub(crate) fn seeded_smoothing(
    input: &[IndicatorValue],
    window: usize,
    seed_at: usize,
    precision: Precision,
) -> DerivedSeries {
    let mut results = vec![IndicatorValue::InsufficientHistory; input.len()];
    if window == 0 || seed_at + 1 < window || seed_at >= input.len() {
        return DerivedSeries::new(results);
    }

    let seed_inputs: Option<Vec<f64>> = input[seed_at + 1 - window..=seed_at].iter().map(|v| v.value()).collect();
    if let Some(seed) = seed_inputs.as_deref().and_then(mean) {
        results[seed_at] = IndicatorValue::Value(precision.step(seed));
    }

    let multiplier = 2.0 / (window as f64 + 1.0);
    for i in (seed_at + 1)..input.len() {
        results[i] = match (input[i], results[i - 1]) {
            (IndicatorValue::InsufficientHistory, _) => IndicatorValue::InsufficientHistory,
            (IndicatorValue::Value(x), IndicatorValue::Value(prev)) => {
                IndicatorValue::Value(precision.step((x - prev) * multiplier + prev))
            }
            (IndicatorValue::Value(x), IndicatorValue::InsufficientHistory) => IndicatorValue::Value(x),
        };
    }
    DerivedSeries::new(results)
}

pub struct Ema {
    name: String,
    period: usize,
    precision: Precision,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self::with_precision(period, Precision::Legacy)
    }

    pub fn with_precision(period: usize, precision: Precision) -> Self {
        Self {
            name: format!("EMA({})", period),
            period,
            precision,
        }
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, bars: &BarSeries) -> DerivedSeries {
        compute_ema_with(bars, self.period, self.precision)
    }
}
