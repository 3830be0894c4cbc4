//! Numeric conversion helpers centralizing the casts used by price scaling.

use num_traits::cast::cast;

/// Round a f64 half away from zero and clamp it to the i64 range, returning 0
/// for non-finite values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Scale an amount tabulated for `reference` people to `count` people,
/// rounding the result to the nearest whole currency unit.
#[must_use]
pub fn scale_amount(amount: i64, count: i32, reference: i32) -> i64 {
    if reference == 0 {
        return 0;
    }
    let factor = f64::from(count) / f64::from(reference);
    round_f64_to_i64(i64_to_f64(amount) * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_goes_half_away_from_zero() {
        assert_eq!(round_f64_to_i64(2.5), 3);
        assert_eq!(round_f64_to_i64(-2.5), -3);
        assert_eq!(round_f64_to_i64(2.4), 2);
        assert_eq!(round_f64_to_i64(f64::NAN), 0);
        assert_eq!(round_f64_to_i64(f64::INFINITY), 0);
    }

    #[test]
    fn scaling_is_linear_from_the_reference() {
        assert_eq!(scale_amount(700_000, 2, 2), 700_000);
        assert_eq!(scale_amount(700_000, 4, 2), 1_400_000);
        assert_eq!(scale_amount(700_000, 1, 2), 350_000);
        assert_eq!(scale_amount(700_001, 1, 2), 350_001);
        assert_eq!(scale_amount(700_000, 3, 0), 0);
    }
}
