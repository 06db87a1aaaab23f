use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal digits kept in SMA and Bollinger outputs.
pub(crate) const INDICATOR_DIGITS: u32 = 4;

/// Decimal digits kept in percent-return outputs.
pub(crate) const RETURN_DIGITS: u32 = 2;

/// Rounds the exact binary value of `value` to `digits` decimal places,
/// ties away from zero.
///
/// A double just below a tie stays below it: `28.19625` is stored as
/// `28.196249999...` and rounds down to `28.1962`. Applied to every batch
/// output so that long series produce the same values regardless of
/// accumulated floating-point drift. Non-finite values pass through.
#[inline]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub(crate) fn round_to(value: f64, digits: u32) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let rounded = exact.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);

    // an integer over a power of ten, so the division rounds only once
    rounded.mantissa() as f64 / 10f64.powi(rounded.scale() as i32)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_four_digits() {
        assert_eq!(round_to(20.123_449, INDICATOR_DIGITS), 20.1234);
        assert_eq!(round_to(20.123_451, INDICATOR_DIGITS), 20.1235);
    }

    #[test]
    fn rounds_negative_values_away_from_zero() {
        assert_eq!(round_to(-9.999_999_999_999_998, RETURN_DIGITS), -10.0);
        assert_eq!(round_to(-0.125, RETURN_DIGITS), -0.13);
    }

    #[test]
    fn just_below_a_tie_rounds_down() {
        // stored as 28.196249999999999147...
        assert_eq!(round_to(28.196_25, INDICATOR_DIGITS), 28.1962);
        // stored as -96.974999999999994316...
        assert_eq!(round_to(-96.975, RETURN_DIGITS), -96.97);
    }

    #[test]
    fn exact_ties_round_away_from_zero() {
        // 0.03125 and 2.5 are exact in binary
        assert_eq!(round_to(0.031_25, INDICATOR_DIGITS), 0.0313);
        assert_eq!(round_to(-0.031_25, INDICATOR_DIGITS), -0.0313);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn non_finite_passes_through() {
        assert!(round_to(f64::NAN, INDICATOR_DIGITS).is_nan());
        assert_eq!(round_to(f64::INFINITY, RETURN_DIGITS), f64::INFINITY);
    }

    #[test]
    fn absorbs_drift() {
        assert_eq!(round_to(0.1 + 0.2, INDICATOR_DIGITS), 0.3);
    }
}
