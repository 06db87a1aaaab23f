use crate::{Ohlcv, Price, PriceSource, Timestamp};
use std::collections::VecDeque;

/// Sliding window of extracted prices with a running sum, and optionally a
/// running sum of squares.
///
/// Every price that enters adds to both sums and every price that leaves
/// subtracts from both, so the sums always describe exactly the prices held.
#[derive(Clone, Debug)]
pub(crate) struct PriceWindow<const SUM_OF_SQUARES: bool = false> {
    size: usize,
    window: VecDeque<Price>,
    /// Maintained incrementally, may accumulate FP rounding drift over very
    /// long runs, negligible for chart-sized series.
    sum: Price,
    sum_of_squares: f64,
    source: PriceSource,
    last_open_time: Option<Timestamp>,
}

pub(crate) type PriceWindowWithSumOfSquares = PriceWindow<true>;

impl<const SUM_OF_SQUARES: bool> PriceWindow<SUM_OF_SQUARES> {
    fn empty(size: usize, source: PriceSource) -> Self {
        Self {
            size,
            source,
            sum: 0.0,
            sum_of_squares: 0.0,
            window: VecDeque::with_capacity(size + 1),
            last_open_time: None,
        }
    }
}

impl PriceWindow {
    pub fn new(size: usize, source: PriceSource) -> Self {
        Self::empty(size, source)
    }
}

impl PriceWindow<true> {
    pub fn with_sum_of_squares(size: usize, source: PriceSource) -> Self {
        Self::empty(size, source)
    }
}

impl<const SUM_OF_SQUARES: bool> PriceWindow<SUM_OF_SQUARES> {
    #[inline]
    pub fn add(&mut self, ohlcv: &impl Ohlcv) {
        debug_assert!(
            self.last_open_time.is_none_or(|t| t <= ohlcv.open_time()),
            "open_time must be non-decreasing: last={}, got={}",
            self.last_open_time.unwrap_or(0),
            ohlcv.open_time(),
        );

        let is_next_timeframe = self.last_open_time.is_none_or(|t| t < ohlcv.open_time());
        let price = self.source.extract(ohlcv);

        if is_next_timeframe {
            self.last_open_time = Some(ohlcv.open_time());
            // The incoming price joins the sums before the oldest one leaves.
            self.push(price);
            if self.window.len() > self.size {
                self.evict(true);
            }
        } else {
            // Repaint: the last price belongs to the bar being replaced.
            self.evict(false);
            self.push(price);
        }
    }

    #[inline]
    fn push(&mut self, price: Price) {
        self.window.push_back(price);
        self.sum += price;
        if SUM_OF_SQUARES {
            self.sum_of_squares += price * price;
        }
    }

    #[inline]
    pub fn sum(&self) -> Option<Price> {
        self.is_ready().then_some(self.sum)
    }

    #[inline]
    pub fn sum_of_squares(&self) -> Option<Price> {
        assert!(SUM_OF_SQUARES, "sum_of_squares requires PriceWindow<true>");
        self.is_ready().then_some(self.sum_of_squares)
    }

    #[inline]
    fn is_ready(&self) -> bool {
        self.window.len() == self.size
    }

    #[inline]
    fn evict(&mut self, oldest: bool) {
        let old_price = if oldest {
            self.window.pop_front()
        } else {
            self.window.pop_back()
        };

        if let Some(old_price) = old_price {
            self.sum -= old_price;
            if SUM_OF_SQUARES {
                self.sum_of_squares -= old_price * old_price;
            }
        }
    }
}
