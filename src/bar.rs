use std::{ops::Index, slice};

use serde::{Deserialize, Serialize};

use crate::{Ohlcv, Price, Timestamp};

/// One time-stamped OHLCV observation in canonical shape.
///
/// `low <= high` is assumed but not enforced. Use
/// [`normalize`](crate::normalize) to build bars from loosely-shaped feed
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    #[serde(default)]
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl Ohlcv for Bar {
    #[inline]
    fn open(&self) -> Price {
        self.open
    }

    #[inline]
    fn high(&self) -> Price {
        self.high
    }

    #[inline]
    fn low(&self) -> Price {
        self.low
    }

    #[inline]
    fn close(&self) -> Price {
        self.close
    }

    #[inline]
    fn open_time(&self) -> Timestamp {
        self.time
    }

    #[inline]
    fn volume(&self) -> f64 {
        self.volume
    }

    #[inline]
    fn amount(&self) -> Option<f64> {
        self.amount
    }
}

/// An ordered, time-ascending sequence of bars.
///
/// The position of a bar is the coordinate shared by every indicator output,
/// turning point and overlay computed from the series. A series is never
/// mutated; new data produces a new series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    #[must_use]
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    #[inline]
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Closing prices, index-aligned with the series.
    #[must_use]
    pub fn closes(&self) -> Vec<Price> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// High prices, index-aligned with the series.
    #[must_use]
    pub fn highs(&self) -> Vec<Price> {
        self.bars.iter().map(|bar| bar.high).collect()
    }

    /// Low prices, index-aligned with the series.
    #[must_use]
    pub fn lows(&self) -> Vec<Price> {
        self.bars.iter().map(|bar| bar.low).collect()
    }

    /// Bars wrapped so that their position becomes their `open_time`.
    ///
    /// Feeding these into a streaming indicator advances the window on every
    /// bar, even when the underlying timestamps repeat.
    pub(crate) fn indexed(&self) -> impl Iterator<Item = Indexed<'_, Bar>> {
        self.bars.iter().enumerate().map(|(index, bar)| Indexed {
            index: index as Timestamp,
            inner: bar,
        })
    }
}

impl From<Vec<Bar>> for Series {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

impl FromIterator<Bar> for Series {
    fn from_iter<T: IntoIterator<Item = Bar>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for Series {
    type Output = Bar;

    fn index(&self, index: usize) -> &Bar {
        &self.bars[index]
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Bar;
    type IntoIter = slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

/// A bar viewed through its position in a series.
pub(crate) struct Indexed<'a, T> {
    index: Timestamp,
    inner: &'a T,
}

impl<T: Ohlcv> Ohlcv for Indexed<'_, T> {
    #[inline]
    fn open(&self) -> Price {
        self.inner.open()
    }

    #[inline]
    fn high(&self) -> Price {
        self.inner.high()
    }

    #[inline]
    fn low(&self) -> Price {
        self.inner.low()
    }

    #[inline]
    fn close(&self) -> Price {
        self.inner.close()
    }

    #[inline]
    fn open_time(&self) -> Timestamp {
        self.index
    }

    #[inline]
    fn volume(&self) -> f64 {
        self.inner.volume()
    }

    #[inline]
    fn amount(&self) -> Option<f64> {
        self.inner.amount()
    }
}
