use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use tracing::trace;

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, IndicatorOutput, Ohlcv, Price,
    PriceSource, Result, Series,
    precision::{INDICATOR_DIGITS, round_to},
    price_window::PriceWindow,
};

/// Configuration for the Simple Moving Average ([`Sma`]) indicator.
///
/// # Example
///
/// ```rust
/// use kline_ta::{IndicatorConfig, SmaConfig};
/// use std::num::NonZero;
///
/// let config = SmaConfig::close(NonZero::new(20).unwrap());
/// assert_eq!(config.length(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SmaConfig {
    length: usize,
    source: PriceSource,
}

impl IndicatorConfig for SmaConfig {
    type Builder = SmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SmaConfigBuilder::new()
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

impl SmaConfig {
    /// SMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// SMA on median price: `(high + low) / 2`.
    #[must_use]
    pub fn hl2(length: NonZero<usize>) -> Self {
        Self::builder()
            .length(length)
            .source(PriceSource::HL2)
            .build()
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SmaConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`SmaConfig`].
///
/// Defaults: source = [`PriceSource::Close`].
/// Length must be set before calling [`build`](IndicatorConfigBuilder::build).
pub struct SmaConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
}

impl SmaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Close,
        }
    }
}

impl IndicatorConfigBuilder<SmaConfig> for SmaConfigBuilder {
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
    fn build(self) -> SmaConfig {
        SmaConfig {
            length: self.length.expect("length is required"),
            source: self.source,
        }
    }
}

/// Simple Moving Average (SMA).
///
/// Computes the unweighted mean of the last *n* values, where *n* is the
/// configured window length. Returns `None` until the window is full.
///
/// Uses a running sum for O(1) updates per bar. Feeding a bar with the same
/// `open_time` replaces the current value without advancing the window, so
/// the last bar of a live chart can be updated in place.
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
    window: PriceWindow,
    divisor: f64,
    current: Option<Price>,
}

impl Indicator for Sma {
    type Config = SmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let window = PriceWindow::new(config.length, config.source);

        Self {
            config,
            window,
            #[allow(clippy::cast_precision_loss)]
            divisor: config.length as f64,
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
        self.window.add(ohlcv);

        self.current = self.window.sum().map(|sum| sum / self.divisor);

        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({}, {})", self.config.length, self.config.source)
    }
}

/// Simple moving average of closing prices over a whole series.
///
/// The output has one entry per bar. Entries before index `window - 1` are
/// `None`; the rest hold the mean of the trailing `window` closes rounded to
/// four decimals. A window longer than the series yields all `None`.
///
/// # Errors
///
/// [`Error::InvalidWindow`] if `window` is zero.
///
/// # Example
///
/// ```
/// use kline_ta::{Bar, Series, sma};
///
/// let series: Series = [1.0, 2.0, 3.0]
///     .into_iter()
///     .enumerate()
///     .map(|(i, close)| Bar {
///         time: i as u64, open: close, high: close, low: close, close,
///         volume: 0.0, amount: None,
///     })
///     .collect();
///
/// assert_eq!(sma(&series, 2).unwrap(), vec![None, Some(1.5), Some(2.5)]);
/// assert_eq!(sma(&series, 10).unwrap(), vec![None, None, None]);
/// ```
pub fn sma(series: &Series, window: usize) -> Result<IndicatorOutput> {
    let length = NonZero::new(window).ok_or(Error::InvalidWindow {
        name: "window",
        value: window,
    })?;
    trace!(window, bars = series.len(), "computing sma");

    let mut indicator = Sma::new(SmaConfig::close(length));

    Ok(series
        .indexed()
        .map(|bar| {
            indicator
                .compute(&bar)
                .map(|value| round_to(value, INDICATOR_DIGITS))
        })
        .collect())
}
