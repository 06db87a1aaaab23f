use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    num::NonZero,
};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IndicatorOutput, Ohlcv, Price,
    PriceSource, Result, Series,
    precision::{INDICATOR_DIGITS, round_to},
    price_window::{PriceWindow, PriceWindowWithSumOfSquares},
};

/// Standard deviation multiplier for Bollinger Bands.
///
/// Wraps a positive, finite `f64`. Defaults to `2.0`.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct StdDev(f64);

impl StdDev {
    /// Creates a new standard deviation multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `value` is zero, negative, or NaN. See
    /// [`try_new`](Self::try_new) for the fallible version.
    #[must_use]
    pub fn new(value: f64) -> Self {
        assert!(!value.is_nan(), "std_dev must not be NaN");
        assert!(value > 0.0, "std_dev must be positive");
        Self(value)
    }

    /// Creates a new standard deviation multiplier.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMultiplier`] if `value` is not positive and finite.
    pub fn try_new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidMultiplier(value))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for StdDev {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for StdDev {}

impl Hash for StdDev {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for StdDev {
    fn default() -> Self {
        Self(2.0)
    }
}

/// Configuration for the Bollinger Bands ([`Bb`]) indicator.
///
/// # Example
///
/// ```
/// use kline_ta::{BbConfig, IndicatorConfig};
///
/// // length 20, close, 2.0 std devs
/// let config = BbConfig::default_20();
/// assert_eq!(config.length(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BbConfig {
    length: usize,
    source: PriceSource,
    std_dev: StdDev,
}

impl IndicatorConfig for BbConfig {
    type Builder = BbConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        BbConfigBuilder::new()
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }

    #[inline]
    fn source(&self) -> &PriceSource {
        &self.source
    }
}

impl BbConfig {
    /// Standard deviation multiplier for the upper and lower bands.
    #[inline]
    #[must_use]
    pub fn std_dev(&self) -> StdDev {
        self.std_dev
    }

    /// BB(20, Close, 2σ), the standard Bollinger Bands setting.
    #[allow(clippy::missing_panics_doc)]
    #[must_use]
    pub fn default_20() -> Self {
        Self::builder().length(NonZero::new(20).unwrap()).build()
    }

    /// BB with custom length, close price, 2σ.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }
}

impl Display for BbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BbConfig({}, {}, {})",
            self.length,
            self.source,
            self.std_dev.value()
        )
    }
}

/// Builder for [`BbConfig`].
///
/// Defaults: source = [`PriceSource::Close`], `std_dev` = `2.0`.
/// Length must be set before calling [`build`](IndicatorConfigBuilder::build).
pub struct BbConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
    std_dev: StdDev,
}

impl BbConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Close,
            std_dev: StdDev::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn std_dev(mut self, std_dev: StdDev) -> Self {
        self.std_dev = std_dev;
        self
    }
}

impl IndicatorConfigBuilder<BbConfig> for BbConfigBuilder {
    #[inline]
    fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length.get());
        self
    }

    #[inline]
    fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    #[inline]
    fn build(self) -> BbConfig {
        BbConfig {
            length: self.length.expect("length is required"),
            source: self.source,
            std_dev: self.std_dev,
        }
    }
}

/// Bollinger Bands output for one bar.
///
/// ```text
/// upper  = SMA + k × σ
/// middle = SMA
/// lower  = SMA − k × σ
/// ```
///
/// `σ` is the population standard deviation of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BbValue {
    upper: Price,
    middle: Price,
    lower: Price,
}

impl BbValue {
    /// Upper band: `SMA + k × σ`.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// Middle band: SMA of the window.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    /// Lower band: `SMA − k × σ`.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }

    /// Band width: `upper − lower`.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Display for BbValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB(u: {}, m: {}, l: {})",
            self.upper, self.middle, self.lower
        )
    }
}

/// Bollinger Bands (BB).
///
/// A simple moving average (middle) with upper and lower bands offset by a
/// configurable number of population standard deviations.
///
/// Mean and variance come from a running sum and sum of squares, both
/// updated in O(1) per bar. Variance is `E[X²] − E[X]²`, clamped at zero
/// because cancellation can push it slightly negative.
///
/// Feeding a bar with the same `open_time` replaces the current value without
/// advancing the window.
#[derive(Clone, Debug)]
pub struct Bb {
    config: BbConfig,
    divisor: f64,
    std_dev_multiplier: f64,
    window: PriceWindowWithSumOfSquares,
    current: Option<BbValue>,
}

impl Indicator for Bb {
    type Config = BbConfig;
    type Output = BbValue;

    fn new(config: Self::Config) -> Self {
        let window = PriceWindow::with_sum_of_squares(config.length, config.source);

        Self {
            config,
            #[allow(clippy::cast_precision_loss)]
            divisor: config.length as f64,
            std_dev_multiplier: config.std_dev.0,
            window,
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Self::Output> {
        self.window.add(ohlcv);

        self.current = match (self.window.sum(), self.window.sum_of_squares()) {
            (Some(sum), Some(sum_of_squares)) => {
                let mean = sum / self.divisor;
                let variance = (sum_of_squares / self.divisor - mean * mean).max(0.0);
                let offset = self.std_dev_multiplier * variance.sqrt();

                Some(Self::Output {
                    upper: mean + offset,
                    middle: mean,
                    lower: mean - offset,
                })
            }
            _ => None,
        };

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Self::Output> {
        self.current
    }
}

impl Display for Bb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB({}, {}, {})",
            self.config.length, self.config.source, self.std_dev_multiplier,
        )
    }
}

/// Bollinger Bands over a whole series, one entry per bar in every band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: IndicatorOutput,
    pub middle: IndicatorOutput,
    pub lower: IndicatorOutput,
}

impl BollingerBands {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.middle.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

/// Bollinger Bands of closing prices over a whole series.
///
/// All three bands have one entry per bar, `None` before index `window - 1`
/// and rounded to four decimals afterwards. `middle` equals
/// [`sma`](crate::sma) with the same window. A window longer than the series
/// yields all `None`.
///
/// # Errors
///
/// [`Error::InvalidWindow`] if `window` is zero, [`Error::InvalidMultiplier`]
/// if `k` is not positive and finite.
pub fn bollinger(series: &Series, window: usize, k: f64) -> Result<BollingerBands> {
    let length = NonZero::new(window).ok_or(Error::InvalidWindow {
        name: "window",
        value: window,
    })?;
    let std_dev = StdDev::try_new(k)?;
    trace!(window, k, bars = series.len(), "computing bollinger bands");

    let mut indicator = Bb::new(BbConfig::builder().length(length).std_dev(std_dev).build());
    let mut bands = BollingerBands {
        upper: Vec::with_capacity(series.len()),
        middle: Vec::with_capacity(series.len()),
        lower: Vec::with_capacity(series.len()),
    };

    for bar in series.indexed() {
        let value = indicator.compute(&bar);
        let round = |band: fn(&BbValue) -> Price| {
            value
                .as_ref()
                .map(|v| round_to(band(v), INDICATOR_DIGITS))
        };

        bands.upper.push(round(BbValue::upper));
        bands.middle.push(round(BbValue::middle));
        bands.lower.push(round(BbValue::lower));
    }

    Ok(bands)
}
