// Bollinger Bands indicator implementation
use shared::models::{BarSeries, BollingerSeries, DerivedSeries, IndicatorValue};
use shared::utils::mean;

pub const DEFAULT_BAND_WINDOW: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;

/// Bands over the closes: middle is the `window`-bar mean, upper/lower sit
/// `num_std` sample standard deviations (n - 1 denominator) away from it.
/// Published values are rounded to cents.
pub fn compute_bollinger(bars: &BarSeries, window: usize, num_std: f64) -> BollingerSeries {
    let raw = bollinger_unrounded(bars, window, num_std);
    BollingerSeries {
        middle: raw.middle.rounded(),
        upper: raw.upper.rounded(),
        lower: raw.lower.rounded(),
    }
}

pub(crate) fn bollinger_unrounded(bars: &BarSeries, window: usize, num_std: f64) -> BollingerSeries {
    let closes = bars.closes();
    let len = closes.len();
    let mut middle = vec![IndicatorValue::InsufficientHistory; len];
    let mut upper = vec![IndicatorValue::InsufficientHistory; len];
    let mut lower = vec![IndicatorValue::InsufficientHistory; len];

    if window > 0 && len >= window {
        for end in window..=len {
            let slice = &closes[end - window..end];
            let Some(avg) = mean(slice) else { continue };
            middle[end - 1] = IndicatorValue::Value(avg);
            // A single close has no sample deviation.
            if let Some(std_dev) = sample_std(slice, avg) {
                upper[end - 1] = IndicatorValue::Value(avg + num_std * std_dev);
                lower[end - 1] = IndicatorValue::Value(avg - num_std * std_dev);
            }
        }
    }

    BollingerSeries {
        middle: DerivedSeries::new(middle),
        upper: DerivedSeries::new(upper),
        lower: DerivedSeries::new(lower),
    }
}

fn sample_std(values: &[f64], avg: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance = values.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
