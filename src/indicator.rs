//! Traits behind the streaming [`Sma`](crate::Sma) and [`Bb`](crate::Bb).

use crate::{Ohlcv, PriceSource};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
    num::NonZero,
};

/// Window length and price source of an [`Indicator`].
pub trait IndicatorConfig: Sized + PartialEq + Eq + Hash + Display + Debug {
    type Builder: IndicatorConfigBuilder<Self>;

    /// A builder with the close as price source and no length yet.
    fn builder() -> Self::Builder;

    /// Bars in the window.
    fn length(&self) -> usize;

    fn source(&self) -> &PriceSource;
}

pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    #[must_use]
    fn length(self, length: NonZero<usize>) -> Self;

    #[must_use]
    fn source(self, source: PriceSource) -> Self;

    /// # Panics
    ///
    /// When no length was set.
    #[must_use]
    fn build(self) -> Config;
}

/// An overlay updated one bar at a time.
///
/// Bars are told apart by [`open_time`](Ohlcv::open_time). A bar with a new
/// time slides the window forward. A bar with the same time as the last one
/// is a live update of that bar and replaces its price. Values are not
/// rounded here; the batch functions [`sma`](crate::sma) and
/// [`bollinger`](crate::bollinger) round what they collect and address bars
/// by position instead of by time.
///
/// ```
/// use kline_ta::{Bar, Indicator, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let bar = |close, time| Bar {
///     time, open: close, high: close, low: close, close,
///     volume: 0.0, amount: None,
/// };
///
/// let mut sma = Sma::new(SmaConfig::close(NonZero::new(2).unwrap()));
///
/// assert_eq!(sma.compute(&bar(10.0, 1)), None);
/// assert_eq!(sma.compute(&bar(20.0, 2)), Some(15.0));
/// // the last bar ticks to 30 before it closes
/// assert_eq!(sma.compute(&bar(30.0, 2)), Some(20.0));
/// assert_eq!(sma.compute(&bar(40.0, 3)), Some(35.0));
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    type Config: IndicatorConfig;

    /// [`Price`](crate::Price) for a single line, [`BbValue`](crate::BbValue)
    /// for the bands.
    type Output: Send + Sync + Display + Debug;

    fn new(config: Self::Config) -> Self;

    /// Feeds one bar. `None` while fewer than `length` distinct bars have
    /// been seen.
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Self::Output>;

    /// The value after the last [`compute`](Indicator::compute), without
    /// feeding anything.
    fn value(&self) -> Option<Self::Output>;
}
