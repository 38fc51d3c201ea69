use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::utils::round2;

/// Gap marker understood by the chart library.
pub const GAP_MARKER: &str = "-";

/// One trading day's quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Why a bar series was rejected by [`BarSeries::validated`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidSeriesError {
    #[error("duplicate date {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("date {date} at index {index} is earlier than the previous date {previous}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("non-finite {field} at index {index}")]
    NonFinite { index: usize, field: &'static str },

    #[error("non-positive {field} ({value}) at index {index}")]
    NonPositivePrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("negative volume ({value}) at index {index}")]
    NegativeVolume { index: usize, value: f64 },
}

/// Ordered daily bars, ascending by date.
///
/// Owned by the caller and never mutated by the calculators. Construction via
/// [`BarSeries::new`] trusts the input; [`BarSeries::validated`] checks it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn validated(bars: Vec<Bar>) -> Result<Self, InvalidSeriesError> {
        let series = Self::new(bars);
        series.validate()?;
        Ok(series)
    }

    /// Reports the first offending bar, in index order.
    pub fn validate(&self) -> Result<(), InvalidSeriesError> {
        for (index, bar) in self.bars.iter().enumerate() {
            if index > 0 {
                let previous = self.bars[index - 1].date;
                if bar.date == previous {
                    return Err(InvalidSeriesError::DuplicateDate { index, date: bar.date });
                }
                if bar.date < previous {
                    return Err(InvalidSeriesError::OutOfOrder {
                        index,
                        previous,
                        date: bar.date,
                    });
                }
            }

            let prices = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ];
            for (field, value) in prices.iter().copied().chain(std::iter::once(("volume", bar.volume))) {
                if !value.is_finite() {
                    return Err(InvalidSeriesError::NonFinite { index, field });
                }
            }
            for (field, value) in prices {
                if value <= 0.0 {
                    return Err(InvalidSeriesError::NonPositivePrice { index, field, value });
                }
            }
            if bar.volume < 0.0 {
                return Err(InvalidSeriesError::NegativeVolume {
                    index,
                    value: bar.volume,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

impl From<Vec<Bar>> for BarSeries {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

/// A single point of a derived series.
///
/// `InsufficientHistory` is a regular value, not an error: it marks an index
/// that has too few preceding bars for the indicator. It deliberately has no
/// numeric conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Value(f64),
    InsufficientHistory,
}

impl IndicatorValue {
    pub fn value(self) -> Option<f64> {
        match self {
            IndicatorValue::Value(x) => Some(x),
            IndicatorValue::InsufficientHistory => None,
        }
    }

    pub fn is_value(self) -> bool {
        matches!(self, IndicatorValue::Value(_))
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            IndicatorValue::Value(x) => IndicatorValue::Value(f(x)),
            IndicatorValue::InsufficientHistory => IndicatorValue::InsufficientHistory,
        }
    }
}

// Numbers stay numbers; gaps become the chart's "-" marker.
impl Serialize for IndicatorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IndicatorValue::Value(x) => serializer.serialize_f64(*x),
            IndicatorValue::InsufficientHistory => serializer.serialize_str(GAP_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for IndicatorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IndicatorValueVisitor;

        impl<'de> Visitor<'de> for IndicatorValueVisitor {
            type Value = IndicatorValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a number or the gap marker \"{}\"", GAP_MARKER)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<IndicatorValue, E> {
                Ok(IndicatorValue::Value(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<IndicatorValue, E> {
                Ok(IndicatorValue::Value(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<IndicatorValue, E> {
                Ok(IndicatorValue::Value(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<IndicatorValue, E> {
                if v == GAP_MARKER {
                    Ok(IndicatorValue::InsufficientHistory)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(IndicatorValueVisitor)
    }
}

/// Output of a calculator: one entry per input bar, index-aligned with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DerivedSeries {
    values: Vec<IndicatorValue>,
}

impl DerivedSeries {
    pub fn new(values: Vec<IndicatorValue>) -> Self {
        Self { values }
    }

    pub fn insufficient(len: usize) -> Self {
        Self::new(vec![IndicatorValue::InsufficientHistory; len])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<IndicatorValue> {
        self.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = IndicatorValue> + '_ {
        self.values.iter().copied()
    }

    pub fn as_slice(&self) -> &[IndicatorValue] {
        &self.values
    }

    pub fn first_value_index(&self) -> Option<usize> {
        self.values.iter().position(|v| v.is_value())
    }

    /// Applies [`round2`] to every value, leaving gaps in place.
    pub fn rounded(&self) -> Self {
        Self::new(self.values.iter().map(|v| v.map(round2)).collect())
    }
}

impl From<Vec<IndicatorValue>> for DerivedSeries {
    fn from(values: Vec<IndicatorValue>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<IndicatorValue> for DerivedSeries {
    fn from_iter<I: IntoIterator<Item = IndicatorValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// DIF / DEA / histogram triple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub dif: DerivedSeries,
    pub dea: DerivedSeries,
    pub histogram: DerivedSeries,
}

/// Middle (SMA) and upper/lower bands at a multiple of the sample standard deviation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerSeries {
    pub middle: DerivedSeries,
    pub upper: DerivedSeries,
    pub lower: DerivedSeries,
}

/// A named, parameterised series answered for an ad-hoc request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,
    pub parameters: serde_json::Value,
    pub values: DerivedSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> Bar {
        Bar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_validated_accepts_ascending_series() {
        let series = BarSeries::validated(vec![bar("2024-01-02", 10.0), bar("2024-01-03", 11.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 11.0]);
    }

    #[test]
    fn test_validated_accepts_empty_series() {
        assert!(BarSeries::validated(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_validate_duplicate_date() {
        let err = BarSeries::validated(vec![bar("2024-01-02", 10.0), bar("2024-01-02", 11.0)]).unwrap_err();
        assert!(matches!(err, InvalidSeriesError::DuplicateDate { index: 1, .. }));
    }

    #[test]
    fn test_validate_out_of_order() {
        let err = BarSeries::validated(vec![bar("2024-01-03", 10.0), bar("2024-01-02", 11.0)]).unwrap_err();
        assert!(matches!(err, InvalidSeriesError::OutOfOrder { index: 1, .. }));
        assert!(err.to_string().contains("earlier than the previous date 2024-01-03"));
    }

    #[test]
    fn test_validate_non_finite_close() {
        let mut bad = bar("2024-01-03", 10.0);
        bad.close = f64::NAN;
        let err = BarSeries::validated(vec![bar("2024-01-02", 10.0), bad]).unwrap_err();
        assert_eq!(err, InvalidSeriesError::NonFinite { index: 1, field: "close" });
    }

    #[test]
    fn test_validate_non_finite_volume() {
        let mut bad = bar("2024-01-02", 10.0);
        bad.volume = f64::INFINITY;
        let err = BarSeries::validated(vec![bad]).unwrap_err();
        assert_eq!(err, InvalidSeriesError::NonFinite { index: 0, field: "volume" });
    }

    #[test]
    fn test_validate_non_positive_price_and_negative_volume() {
        let mut zero_low = bar("2024-01-02", 10.0);
        zero_low.low = 0.0;
        assert!(matches!(
            BarSeries::validated(vec![zero_low]).unwrap_err(),
            InvalidSeriesError::NonPositivePrice { field: "low", .. }
        ));

        let mut negative_volume = bar("2024-01-02", 10.0);
        negative_volume.volume = -1.0;
        assert!(matches!(
            BarSeries::validated(vec![negative_volume]).unwrap_err(),
            InvalidSeriesError::NegativeVolume { index: 0, .. }
        ));
    }

    #[test]
    fn test_unchecked_series_keeps_bad_input() {
        let series = BarSeries::new(vec![bar("2024-01-03", 10.0), bar("2024-01-02", 11.0)]);
        assert_eq!(series.len(), 2);
        assert!(series.validate().is_err());
    }

    #[test]
    fn test_indicator_value_is_not_numeric() {
        assert_eq!(IndicatorValue::InsufficientHistory.value(), None);
        assert_eq!(IndicatorValue::Value(0.0).value(), Some(0.0));
        assert_ne!(IndicatorValue::Value(0.0), IndicatorValue::InsufficientHistory);
    }

    #[test]
    fn test_derived_series_serializes_gaps_as_marker() {
        let series = DerivedSeries::new(vec![
            IndicatorValue::InsufficientHistory,
            IndicatorValue::Value(11.5),
            IndicatorValue::Value(0.0),
        ]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"["-",11.5,0.0]"#);

        let back: DerivedSeries = serde_json::from_str(r#"["-",11.5,0]"#).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn test_derived_series_rejects_unknown_marker() {
        assert!(serde_json::from_str::<DerivedSeries>(r#"["n/a"]"#).is_err());
    }

    #[test]
    fn test_first_value_index_and_rounded() {
        let series = DerivedSeries::new(vec![
            IndicatorValue::InsufficientHistory,
            IndicatorValue::Value(1.23456),
        ]);
        assert_eq!(series.first_value_index(), Some(1));
        assert_eq!(series.rounded().get(1), Some(IndicatorValue::Value(1.23)));
        assert_eq!(DerivedSeries::insufficient(3).first_value_index(), None);
    }
}
