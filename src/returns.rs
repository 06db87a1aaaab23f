use tracing::trace;

use crate::{
    Error, Result, Series,
    precision::{RETURN_DIGITS, round_to},
};

/// Percent returns relative to the first observation.
///
/// `out[i] = (values[i] / values[0] - 1) × 100`, rounded to two decimals.
/// Works for equity curves and price series alike.
///
/// # Errors
///
/// [`Error::MissingBase`] for an empty input, [`Error::InvalidBase`] when the
/// first value is zero or not finite. The base is never substituted.
///
/// # Example
///
/// ```
/// use kline_ta::normalize_returns;
///
/// assert_eq!(
///     normalize_returns(&[100.0, 110.0, 90.0]).unwrap(),
///     vec![0.0, 10.0, -10.0]
/// );
/// assert!(normalize_returns(&[0.0, 5.0]).is_err());
/// ```
pub fn normalize_returns(values: &[f64]) -> Result<Vec<f64>> {
    let &base = values.first().ok_or(Error::MissingBase)?;
    if base == 0.0 || !base.is_finite() {
        return Err(Error::InvalidBase(base));
    }
    trace!(base, len = values.len(), "normalizing returns");

    Ok(values
        .iter()
        .map(|value| round_to((value / base - 1.0) * 100.0, RETURN_DIGITS))
        .collect())
}

/// Buy-and-hold percent returns of the series' closing prices.
///
/// # Errors
///
/// Same as [`normalize_returns`] applied to the closes.
pub fn benchmark_returns(series: &Series) -> Result<Vec<f64>> {
    normalize_returns(&series.closes())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::series_of;

    #[test]
    fn relative_to_first_value() {
        assert_eq!(
            normalize_returns(&[100.0, 110.0, 90.0]).unwrap(),
            vec![0.0, 10.0, -10.0]
        );
    }

    #[test]
    fn rounds_to_two_decimals() {
        // 1/3 - 1 = -66.666...%
        assert_eq!(normalize_returns(&[3.0, 1.0]).unwrap(), vec![0.0, -66.67]);
    }

    #[test]
    fn return_just_below_a_tie_rounds_toward_zero() {
        // (2.42 / 80 - 1) * 100 is stored as -96.974999999...
        assert_eq!(normalize_returns(&[80.0, 2.42]).unwrap(), vec![0.0, -96.97]);
    }

    #[test]
    fn output_is_aligned() {
        let equity = [1000.0, 1010.0, 990.5, 1200.0, 50.0];
        assert_eq!(normalize_returns(&equity).unwrap().len(), equity.len());
    }

    #[test]
    fn zero_base_is_rejected() {
        assert_eq!(
            normalize_returns(&[0.0, 5.0]),
            Err(Error::InvalidBase(0.0))
        );
    }

    #[test]
    fn non_finite_base_is_rejected() {
        assert!(matches!(
            normalize_returns(&[f64::NAN, 5.0]),
            Err(Error::InvalidBase(_))
        ));
    }

    #[test]
    fn empty_input_has_no_base() {
        assert_eq!(normalize_returns(&[]), Err(Error::MissingBase));
    }

    #[test]
    fn later_zeros_are_fine() {
        assert_eq!(normalize_returns(&[4.0, 0.0]).unwrap(), vec![0.0, -100.0]);
    }

    #[test]
    fn benchmark_uses_closes() {
        let series = series_of(&[50.0, 75.0, 25.0]);
        assert_eq!(
            benchmark_returns(&series).unwrap(),
            vec![0.0, 50.0, -50.0]
        );
    }
}
