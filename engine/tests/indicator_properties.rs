use chrono::{Duration, NaiveDate};
use engine::config::settings::IndicatorSettings;
use engine::data::csv_parser::DailyCsvParser;
use engine::indicators::{compute_bollinger, compute_ema, compute_macd, compute_rsi, compute_sma};
use engine::services::build_overlay;
use shared::models::IndicatorValue::{InsufficientHistory, Value};
use shared::models::{Bar, BarSeries, DerivedSeries};
use shared::utils::round2;

fn series(closes: &[f64]) -> BarSeries {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
    BarSeries::validated(
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1_000.0 + i as f64,
            })
            .collect(),
    )
    .unwrap()
}

fn wavy(len: usize) -> Vec<f64> {
    (0..len).map(|i| 30.0 + (i as f64 * 0.31).sin() * 2.7 + i as f64 * 0.05).collect()
}

fn assert_warmup(series: &DerivedSeries, window: usize, len: usize) {
    assert_eq!(series.len(), len);
    for (i, v) in series.iter().enumerate() {
        if len >= window && i + 1 >= window {
            assert!(v.is_value(), "expected a value at {} (window {}, len {})", i, window, len);
        } else {
            assert_eq!(v, InsufficientHistory, "expected a gap at {} (window {}, len {})", i, window, len);
        }
    }
}

#[test]
fn test_warmup_boundaries_for_sma_and_ema() {
    for len in [0, 1, 4, 5, 6, 30, 61] {
        let bars = series(&wavy(len));
        for window in [1, 2, 5, 20, 60] {
            assert_warmup(&compute_sma(&bars, window), window, len);
            assert_warmup(&compute_ema(&bars, window), window, len);
        }
    }
}

#[test]
fn test_constant_closes_converge_to_the_constant() {
    let bars = series(&[17.35; 80]);
    for window in [5, 10, 20, 30, 60] {
        for v in compute_sma(&bars, window).iter().chain(compute_ema(&bars, window).iter()) {
            if let Value(x) = v {
                assert_eq!(x, 17.35);
            }
        }
    }
}

#[test]
fn test_histogram_is_twice_dif_minus_dea() {
    let bars = series(&wavy(120));
    let macd = compute_macd(&bars);
    let mut checked = 0;
    for i in 0..bars.len() {
        if let (Some(Value(d)), Some(Value(e))) = (macd.dif.get(i), macd.dea.get(i)) {
            assert_eq!(macd.histogram.get(i), Some(Value(round2(2.0 * (d - e)))));
            checked += 1;
        }
    }
    assert_eq!(checked, 120 - 34);
}

#[test]
fn test_repeated_calls_are_identical() {
    let bars = series(&wavy(90));
    assert_eq!(compute_sma(&bars, 10), compute_sma(&bars, 10));
    assert_eq!(compute_ema(&bars, 12), compute_ema(&bars, 12));
    let a = serde_json::to_vec(&compute_macd(&bars)).unwrap();
    let b = serde_json::to_vec(&compute_macd(&bars)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_concrete_sma_example() {
    let bars = series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
    assert_eq!(
        compute_sma(&bars, 3).as_slice(),
        &[InsufficientHistory, InsufficientHistory, Value(11.0), Value(12.0), Value(13.0), Value(14.0)]
    );
}

#[test]
fn test_concrete_ema_example() {
    let bars = series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
    assert_eq!(
        compute_ema(&bars, 2).as_slice(),
        &[InsufficientHistory, Value(15.0), Value(25.0), Value(35.0), Value(45.0)]
    );
}

#[test]
fn test_macd_signal_line_needs_35_bars() {
    let macd = compute_macd(&series(&wavy(34)));
    assert!(macd.dea.iter().all(|v| v == InsufficientHistory));
    assert!(macd.histogram.iter().all(|v| v == InsufficientHistory));

    let macd = compute_macd(&series(&wavy(35)));
    assert_eq!(macd.dea.first_value_index(), Some(34));
    assert_eq!(macd.histogram.first_value_index(), Some(34));
}

#[test]
fn test_input_bars_are_untouched() {
    let bars = series(&wavy(40));
    let before = bars.clone();
    let _ = compute_macd(&bars);
    let _ = compute_sma(&bars, 5);
    assert_eq!(bars, before);
}

#[test]
fn test_independent_calls_can_run_in_parallel() {
    let bars = series(&wavy(200));
    let expected: Vec<DerivedSeries> = [5, 10, 20, 30, 60].iter().map(|&w| compute_sma(&bars, w)).collect();

    let results: Vec<DerivedSeries> = std::thread::scope(|scope| {
        let handles: Vec<_> = [5, 10, 20, 30, 60]
            .iter()
            .map(|&w| {
                let bars = &bars;
                scope.spawn(move || compute_sma(bars, w))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, expected);
}

#[test]
fn test_csv_to_overlay_end_to_end() {
    let mut csv = String::from("ts_code,trade_date,open,high,low,close,vol\n");
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    // Newest first, as the quote store returns it.
    for (i, close) in wavy(40).iter().enumerate().rev() {
        let date = (start + Duration::days(i as i64)).format("%Y%m%d");
        csv.push_str(&format!("600000.SH,{},{c:.2},{c:.2},{c:.2},{c:.2},1000\n", date, c = close));
    }

    let bars = BarSeries::validated(DailyCsvParser::parse_bars(csv.as_bytes()).unwrap()).unwrap();
    let settings = IndicatorSettings { validate: true, ..IndicatorSettings::default() };
    let overlay = build_overlay(&bars, &settings).unwrap();

    assert_eq!(overlay.dates.first(), Some(&start));
    assert_eq!(overlay.sma[&30].first_value_index(), Some(29));
    assert_eq!(overlay.sma[&60], DerivedSeries::insufficient(40));
    assert_eq!(overlay.macd.dea.first_value_index(), Some(34));
}

#[test]
fn test_rsi_is_bounded_and_bands_are_ordered() {
    let bars = series(&wavy(90));
    let rsi = compute_rsi(&bars, 14);
    assert_eq!(rsi.first_value_index(), Some(14));
    assert!(rsi.iter().filter_map(|v| v.value()).all(|x| (0.0..=100.0).contains(&x)));

    let bands = compute_bollinger(&bars, 20, 2.0);
    assert_eq!(bands.middle, compute_sma(&bars, 20));
    for i in 19..90 {
        let (Some(Value(lo)), Some(Value(mid)), Some(Value(hi))) =
            (bands.lower.get(i), bands.middle.get(i), bands.upper.get(i))
        else {
            panic!("expected bands at {}", i);
        };
        assert!(lo <= mid && mid <= hi, "{} <= {} <= {} at {}", lo, mid, hi, i);
    }
}
