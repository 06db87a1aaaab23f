//! Screening predicates over a whole series.

use std::num::NonZero;

use serde::{Deserialize, Serialize};

use crate::{Bar, Error, Price, Result, Series, Sma, SmaConfig, TurningPoint, VertexSet};

/// Moving-average windows checked by [`fresh_bullish_alignment`] in the
/// usual 5/10/20/30 screen.
pub const DEFAULT_ALIGNMENT_WINDOWS: [usize; 4] = [5, 10, 20, 30];

/// Higher highs and higher lows across the two latest swings.
///
/// With `H1, H2` the two latest peaks and `L1, L2` the two latest valleys,
/// the series matches when they alternate `H1 < L1 < H2 < L2` in time, both
/// pairs step up (`H2 > H1`, `L2 > L1`), and each valley sits below the peak
/// before it.
///
/// Swings come from the strict [`VertexSet`]: a bar tied with a neighbour
/// inside its window is not a turning point. Screens that only reject a
/// strictly higher neighbour, or that compare prices truncated to integer
/// exchange units, accept flat-topped swings this check rejects, so their
/// results will not always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RisingTrend {
    /// Half-window of the turning point detector.
    pub half_window: usize,
    /// Series shorter than this never match.
    pub min_bars: usize,
}

impl Default for RisingTrend {
    fn default() -> Self {
        Self {
            half_window: 8,
            min_bars: 30,
        }
    }
}

impl RisingTrend {
    /// # Errors
    ///
    /// [`Error::InvalidWindow`] if `half_window` is zero.
    pub fn matches(&self, series: &Series) -> Result<bool> {
        if self.half_window == 0 {
            return Err(Error::InvalidWindow {
                name: "half_window",
                value: 0,
            });
        }
        if series.len() < self.min_bars {
            return Ok(false);
        }

        let set = VertexSet::detect(series, self.half_window)?;
        let (Some([h1, h2]), Some([l1, l2])) = (latest_two(set.peaks()), latest_two(set.valleys()))
        else {
            return Ok(false);
        };

        let alternating = h1.index < l1.index && l1.index < h2.index && h2.index < l2.index;
        let stepping_up = h2.value > h1.value && l2.value > l1.value;
        let valleys_below = l1.value < h1.value && l2.value < h2.value;

        Ok(alternating && stepping_up && valleys_below)
    }
}

/// The two last points of an index-ordered run, oldest first.
fn latest_two<'a>(
    points: impl DoubleEndedIterator<Item = &'a TurningPoint>,
) -> Option<[&'a TurningPoint; 2]> {
    let mut newest_first = points.rev();
    let newest = newest_first.next()?;
    let previous = newest_first.next()?;
    Some([previous, newest])
}

/// Moving averages that just fanned out in bullish order.
///
/// On the last bar the SMAs of `windows` are strictly decreasing in the
/// given order (shortest on top for the usual ascending windows), on the bar
/// before they were not, and every one of them rose since that bar.
/// Returns `false` when the series has fewer than `max(windows) + 1` bars or
/// `windows` is empty. Compares unrounded averages.
///
/// # Errors
///
/// [`Error::InvalidWindow`] if any window is zero.
pub fn fresh_bullish_alignment(series: &Series, windows: &[usize]) -> Result<bool> {
    let lengths = windows
        .iter()
        .map(|&window| {
            NonZero::new(window).ok_or(Error::InvalidWindow {
                name: "window",
                value: window,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let Some(longest) = windows.iter().max() else {
        return Ok(false);
    };
    if series.len() <= *longest {
        return Ok(false);
    }

    let (previous, current): (Vec<Price>, Vec<Price>) = lengths
        .into_iter()
        .filter_map(|length| last_two_averages(series, length))
        .unzip();

    let ordered = |values: &[Price]| values.windows(2).all(|pair| pair[0] > pair[1]);
    let rising = previous.iter().zip(&current).all(|(before, now)| now > before);

    Ok(ordered(&current) && !ordered(&previous) && rising)
}

/// The last three closes rise strictly, bar over bar.
///
/// Series with fewer than three bars never match.
#[must_use]
pub fn three_rising_closes(series: &Series) -> bool {
    match series.bars() {
        [.., a, b, c] => c.close > b.close && b.close > a.close,
        _ => false,
    }
}

/// A limit-up day, a gap up the next morning and a volume surge on the last
/// bar.
///
/// Among the last `lookback` bars (never the first or the last one) the
/// series needs a bar whose close gained at least `limit_up` over the
/// previous close. The next bar must open above that close and, starting with
/// it, `bull_bars` consecutive bars must close above their open. Finally the
/// last bar's volume must exceed both the previous bar's volume and the mean
/// volume of up to `volume_bars` bars before it.
///
/// Series shorter than `lookback` never match. A previous close of zero
/// skips the bar.
///
/// ```
/// use kline_ta::LimitUpBreakout;
///
/// let screen = LimitUpBreakout::default();
/// assert_eq!(screen.lookback, 20);
/// assert!(!screen.matches(&Default::default()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitUpBreakout {
    /// Minimum close-to-close gain of the limit-up bar, as a fraction.
    pub limit_up: f64,
    pub lookback: usize,
    pub bull_bars: usize,
    pub volume_bars: usize,
}

impl Default for LimitUpBreakout {
    fn default() -> Self {
        Self {
            limit_up: 0.098,
            lookback: 20,
            bull_bars: 2,
            volume_bars: 5,
        }
    }
}

impl LimitUpBreakout {
    #[must_use]
    pub fn matches(&self, series: &Series) -> bool {
        let bars = series.bars();
        let n = bars.len();
        if n < self.lookback || n < 2 {
            return false;
        }

        let start = n.saturating_sub(self.lookback).max(1);
        (start..n - 1).any(|i| self.gaps_up_after(bars, i)) && self.volume_expands(bars)
    }

    fn gaps_up_after(&self, bars: &[Bar], i: usize) -> bool {
        let (prev, limit_up, next) = (&bars[i - 1], &bars[i], &bars[i + 1]);
        if prev.close == 0.0 {
            return false;
        }

        let gain = (limit_up.close - prev.close) / prev.close;
        let bullish = |j: usize| bars.get(j).is_some_and(|bar| bar.close > bar.open);

        gain >= self.limit_up
            && next.open > limit_up.close
            && (i + 1..i + 1 + self.bull_bars).all(bullish)
    }

    fn volume_expands(&self, bars: &[Bar]) -> bool {
        let Some((last, earlier)) = bars.split_last() else {
            return false;
        };
        let Some(prev) = earlier.last() else {
            return false;
        };
        let recent = &earlier[earlier.len().saturating_sub(self.volume_bars)..];
        if recent.is_empty() {
            return false;
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = recent.iter().map(|bar| bar.volume).sum::<f64>() / recent.len() as f64;
        last.volume > mean && last.volume > prev.volume
    }
}

fn last_two_averages(series: &Series, length: NonZero<usize>) -> Option<(Price, Price)> {
    let mut sma = Sma::new(SmaConfig::close(length));
    let mut previous = None;
    for bar in series.indexed() {
        previous = sma.value();
        sma.compute(&bar);
    }
    Some((previous?, sma.value()?))
}
