//! Technical indicators and turning points for OHLCV candlestick series.
//!
//! Raw candles are decoded into [`RawBar`]s, normalized by [`normalize`]
//! into a [`Series`], and analysed by batch functions whose outputs line up
//! with the series index: [`sma`], [`bollinger`], [`vertices`] and
//! [`normalize_returns`]. Undefined positions are `None`, never zero.
//!
//! The batch functions are driven by streaming indicators that accept any
//! type implementing [`Ohlcv`]. [`Sma`] and [`Bb`] expose
//! [`new`](Sma::new), [`compute`](Sma::compute), and
//! [`value`](Sma::value) as inherent methods, so no trait import is needed.
//! Import [`Indicator`] only for generic code.
//!
//! ```
//! use kline_ta::{PriceScale, RawBar, normalize, sma};
//!
//! let raw: Vec<RawBar> = serde_json::from_str(
//!     r#"[
//!         {"date": "2024-01-02", "open": 10, "high": 11, "low": 9, "close": 10},
//!         {"date": "2024-01-03", "open": 10, "high": 12, "low": 10, "close": 12},
//!         {"date": "2024-01-04", "open": 12, "high": 13, "low": 11, "close": 11}
//!     ]"#,
//! )
//! .unwrap();
//!
//! let series = normalize(raw, PriceScale::Unit).unwrap();
//! assert_eq!(sma(&series, 2).unwrap(), vec![None, Some(11.0), Some(11.5)]);
//! ```

mod bar;
mod bb;
mod error;
mod indicator;
mod ohlcv;
mod overlay;
mod pattern;
mod precision;
mod preprocess;
mod price_source;
mod price_window;
mod returns;
mod sma;
mod study;
mod vertex;

pub use crate::bar::{Bar, Series};
pub use crate::error::{Error, Result};
pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::ohlcv::{Ohlcv, Price, Timestamp};
pub use crate::price_source::PriceSource;

pub use crate::bb::{Bb, BbConfig, BbConfigBuilder, BbValue, BollingerBands, StdDev, bollinger};
pub use crate::sma::{Sma, SmaConfig, SmaConfigBuilder, sma};

pub use crate::overlay::{
    MarkerKind, MarkerPoint, ParseSideError, Side, TradeMarker, signal_points, trade_points,
};
pub use crate::pattern::{
    DEFAULT_ALIGNMENT_WINDOWS, LimitUpBreakout, RisingTrend, fresh_bullish_alignment,
    three_rising_closes,
};
pub use crate::preprocess::{
    AUTO_SCALE_DIVISOR, AUTO_SCALE_THRESHOLD, PriceScale, RawBar, normalize,
};
pub use crate::returns::{benchmark_returns, normalize_returns};
pub use crate::study::{BandSettings, SmaLine, Study, StudyConfig};
pub use crate::vertex::{TurningPoint, VertexKind, VertexSet, detect_all, vertices};

/// One value per input bar; `None` where the indicator is undefined.
pub type IndicatorOutput = Vec<Option<Price>>;

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            #[inline]
            pub fn compute(&mut self, kline: &impl Ohlcv) -> Option<$output> {
                <Self as Indicator>::compute(self, kline)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<$output> {
                <Self as Indicator>::value(self)
            }
        }
    };
}

impl_indicator_methods!(Sma, SmaConfig, Price);
impl_indicator_methods!(Bb, BbConfig, BbValue);

#[cfg(test)]
mod test_util;


#[cfg(test)]
mod thread_safety {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn public_types_are_send_and_sync() {
        assert_send_sync::<Series>();
        assert_send_sync::<RawBar>();
        assert_send_sync::<Sma>();
        assert_send_sync::<Bb>();
        assert_send_sync::<BollingerBands>();
        assert_send_sync::<VertexSet>();
        assert_send_sync::<LimitUpBreakout>();
        assert_send_sync::<StudyConfig>();
        assert_send_sync::<Study>();
        assert_send_sync::<Error>();
    }
}
