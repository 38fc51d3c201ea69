// Numeric helpers shared by the engine and the chart adapter.

/// Rounds to two decimal places the way the dashboard formats prices
/// (`toFixed(2)` followed by a parse back to a number).
///
/// The result is the nearest two-decimal value. When the input sits exactly
/// halfway between two cent values (only possible for odd multiples of 1/8),
/// the larger magnitude wins. Non-finite input is returned unchanged.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let magnitude = value.abs();
    let eighths = magnitude * 8.0;
    let rounded = if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        // Exact tie: x.125, x.375, x.625, x.875
        (magnitude * 100.0 + 0.5).floor() / 100.0
    } else {
        // `{:.2}` rounds the exact binary value, which only ties in the case above.
        format!("{:.2}", magnitude).parse::<f64>().unwrap_or(magnitude)
    };
    rounded.copysign(value)
}

/// Arithmetic mean, summed left to right. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

/// Two-decimal display string, e.g. for log lines and CLI output.
pub fn format_price(value: f64) -> String {
    format!("{:.2}", round2(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_plain_values() {
        assert_eq!(round2(11.0), 11.0);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(12.346), 12.35);
        assert_eq!(round2(-3.14159), -3.14);
    }

    #[test]
    fn test_round2_exact_ties_round_up_in_magnitude() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.375), 2.38);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_round2_near_ties_follow_binary_value() {
        // 1.005 is stored as 1.00499999999999989...
        assert_eq!(round2(1.005), 1.0);
    }

    #[test]
    fn test_round2_is_idempotent() {
        for x in [0.1, 0.125, 25.000000000000004, 13.333333, -7.777, 1234567.891] {
            assert_eq!(round2(round2(x)), round2(x));
        }
    }

    #[test]
    fn test_round2_non_finite_passthrough() {
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10.0, 20.0]), Some(15.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(15.0), "15.00");
        assert_eq!(format_price(0.125), "0.13");
    }
}
