// MACD (DIF / DEA / histogram) built on the EMA recurrence
use super::ema::{ema_unpublished, seeded_smoothing};
use super::Precision;
use shared::models::{BarSeries, DerivedSeries, IndicatorValue, MacdSeries};
use shared::utils::round2;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// First index where DEA (and so the histogram) can be a value: DIF starts at
/// `MACD_SLOW - 1`, and its smoothing is seeded `MACD_SIGNAL` bars later.
pub const DEA_SEED_INDEX: usize = (MACD_SLOW - 1) + MACD_SIGNAL;

pub fn compute_macd(bars: &BarSeries) -> MacdSeries {
    compute_macd_with(bars, Precision::Legacy)
}

/// DIF = EMA12 - EMA26, DEA = 9-period smoothing of DIF seeded at index 34
/// with the mean of DIF over indices 26..=34, histogram = 2 * (DIF - DEA).
pub fn compute_macd_with(bars: &BarSeries, precision: Precision) -> MacdSeries {
    let fast = ema_unpublished(bars, MACD_FAST, precision);
    let slow = ema_unpublished(bars, MACD_SLOW, precision);

    let dif: DerivedSeries = fast
        .iter()
        .zip(slow.iter())
        .map(|pair| match pair {
            (IndicatorValue::Value(f), IndicatorValue::Value(s)) => IndicatorValue::Value(precision.step(f - s)),
            _ => IndicatorValue::InsufficientHistory,
        })
        .collect();

    let dea = seeded_smoothing(dif.as_slice(), MACD_SIGNAL, DEA_SEED_INDEX, precision);
    let dif = precision.publish(dif);
    let dea = precision.publish(dea);

    // Always derived from the published lines, so the identity holds in both modes.
    let histogram: DerivedSeries = dif
        .iter()
        .zip(dea.iter())
        .map(|pair| match pair {
            (IndicatorValue::Value(d), IndicatorValue::Value(e)) => IndicatorValue::Value(round2(2.0 * (d - e))),
            _ => IndicatorValue::InsufficientHistory,
        })
        .collect();

    MacdSeries { dif, dea, histogram }
}
