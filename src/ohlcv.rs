/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar open time in milliseconds since the Unix epoch, or a sequence number.
///
/// Streaming indicators use it for bar boundary detection, so it must be
/// non-decreasing between consecutive calls to [`Indicator::compute`](crate::Indicator::compute).
pub type Timestamp = u64;

/// OHLCV bar data used as input to all indicators.
///
/// Implement this on your own candle type to avoid conversion into
/// [`Bar`](crate::Bar). Indicators accept `&impl Ohlcv` and extract the
/// configured [`PriceSource`](crate::PriceSource) internally.
///
/// # Bar boundaries
///
/// Streaming indicators detect new bars by comparing
/// [`open_time`](Ohlcv::open_time) values: the same timestamp repaints the
/// current bar, a new timestamp advances the window. Batch functions such as
/// [`sma`](crate::sma) address bars by index and never repaint.
///
/// # Example
///
/// ```
/// use kline_ta::{Ohlcv, Price, Timestamp};
///
/// struct MyCandle {
///     o: f64, h: f64, l: f64, c: f64,
///     ts: u64,
/// }
///
/// impl Ohlcv for MyCandle {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn open_time(&self) -> Timestamp { self.ts }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bar.
    fn close(&self) -> Price;

    /// Bar open timestamp or sequence number.
    ///
    /// Values must be non-decreasing between calls. Behaviour is undefined if
    /// `open_time` decreases.
    fn open_time(&self) -> Timestamp;

    /// Traded volume during the bar. Defaults to `0.0`.
    fn volume(&self) -> f64 {
        0.0
    }

    /// Traded value during the bar, if the feed reports it.
    ///
    /// `None` means "no data", which is distinct from a reported zero.
    fn amount(&self) -> Option<f64> {
        None
    }
}
