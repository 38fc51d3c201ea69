// Technical indicators module
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod signals;
pub mod sma;

pub use bollinger::{compute_bollinger, DEFAULT_BAND_WINDOW, DEFAULT_NUM_STD};
pub use ema::{compute_ema, compute_ema_with, Ema};
pub use macd::{compute_macd, compute_macd_with, MACD_FAST, MACD_SIGNAL, MACD_SLOW};
pub use rsi::{compute_rsi, Rsi, DEFAULT_RSI_PERIOD};
pub use sma::{compute_sma, Sma};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{BarSeries, DerivedSeries};
use shared::utils::round2;

// Common trait for indicators answered by name (see services::chart_overlay)
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, bars: &BarSeries) -> DerivedSeries;
}

/// Where rounding to two decimals happens in the recursive indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Round at every recurrence step, matching historical chart values.
    #[default]
    Legacy,
    /// Carry full precision internally and round only published values.
    Full,
}

impl Precision {
    pub(crate) fn step(self, value: f64) -> f64 {
        match self {
            Precision::Legacy => round2(value),
            Precision::Full => value,
        }
    }

    pub(crate) fn publish(self, series: DerivedSeries) -> DerivedSeries {
        match self {
            Precision::Legacy => series,
            Precision::Full => series.rounded(),
        }
    }
}
