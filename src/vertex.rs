//! Turning point (vertex) detection.
//!
//! A bar is a peak when its high is strictly above every other high within
//! `half_window` bars on either side, and a valley when its low is strictly
//! below every other low in that span. Equal values disqualify both bars, and
//! the first and last `half_window` bars are never evaluated because their
//! neighbourhood is incomplete.
//!
//! Each bar is tested against its whole neighbourhood, O(n × `half_window`).
//! A monotonic-deque sliding extremum would make this O(n) should windows
//! grow well beyond single digits.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Error, Price, Result, Series};

/// Which extremum a [`TurningPoint`] marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexKind {
    /// Local maximum of the highs.
    Peak,
    /// Local minimum of the lows.
    Valley,
}

impl Display for VertexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Peak => f.write_str("peak"),
            Self::Valley => f.write_str("valley"),
        }
    }
}

/// A local extremum at a series index.
///
/// `value` is the bar's high for a peak and its low for a valley.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningPoint {
    pub index: usize,
    pub kind: VertexKind,
    pub value: Price,
}

/// Turning points found by one detector, tagged with its half-window.
///
/// Sets from detectors with different windows are kept apart; the same bar
/// may appear in several of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexSet {
    pub half_window: usize,
    pub points: Vec<TurningPoint>,
}

impl VertexSet {
    /// Runs a detector with the given half-window over a series.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWindow`] if `half_window` is zero.
    pub fn detect(series: &Series, half_window: usize) -> Result<Self> {
        let points = vertices(&series.highs(), &series.lows(), half_window)?;
        Ok(Self {
            half_window,
            points,
        })
    }

    /// Peaks only, in index order.
    pub fn peaks(&self) -> impl DoubleEndedIterator<Item = &TurningPoint> {
        self.points.iter().filter(|p| p.kind == VertexKind::Peak)
    }

    /// Valleys only, in index order.
    pub fn valleys(&self) -> impl DoubleEndedIterator<Item = &TurningPoint> {
        self.points.iter().filter(|p| p.kind == VertexKind::Valley)
    }
}

/// Runs one independent detector per half-window, in the given order.
///
/// # Errors
///
/// [`Error::InvalidWindow`] if any half-window is zero; nothing is computed
/// in that case.
pub fn detect_all(series: &Series, half_windows: &[usize]) -> Result<Vec<VertexSet>> {
    if let Some(&bad) = half_windows.iter().find(|&&hw| hw == 0) {
        return Err(invalid_half_window(bad));
    }

    let (highs, lows) = (series.highs(), series.lows());
    half_windows
        .iter()
        .map(|&half_window| {
            Ok(VertexSet {
                half_window,
                points: vertices(&highs, &lows, half_window)?,
            })
        })
        .collect()
}

/// Finds peaks in `highs` and valleys in `lows`.
///
/// Points are ordered by index; when a bar is both a peak and a valley the
/// peak comes first. Series shorter than `2 × half_window + 1` have no
/// evaluable bar and yield an empty vector.
///
/// # Errors
///
/// [`Error::InvalidWindow`] if `half_window` is zero,
/// [`Error::LengthMismatch`] if `highs` and `lows` differ in length.
///
/// # Example
///
/// ```
/// use kline_ta::{TurningPoint, VertexKind, vertices};
///
/// let highs = [1.0, 2.0, 3.0, 2.0, 1.0];
/// let points = vertices(&highs, &highs, 1).unwrap();
///
/// assert_eq!(
///     points,
///     vec![TurningPoint { index: 2, kind: VertexKind::Peak, value: 3.0 }]
/// );
/// ```
pub fn vertices(highs: &[Price], lows: &[Price], half_window: usize) -> Result<Vec<TurningPoint>> {
    if half_window == 0 {
        return Err(invalid_half_window(half_window));
    }
    if highs.len() != lows.len() {
        return Err(Error::LengthMismatch {
            highs: highs.len(),
            lows: lows.len(),
        });
    }

    let len = highs.len();
    let mut points = Vec::new();
    if len <= 2 * half_window {
        return Ok(points);
    }

    for index in half_window..len - half_window {
        let span = index - half_window..=index + half_window;

        if is_extremum(highs, index, span.clone(), |other, current| other >= current) {
            points.push(TurningPoint {
                index,
                kind: VertexKind::Peak,
                value: highs[index],
            });
        }
        if is_extremum(lows, index, span, |other, current| other <= current) {
            points.push(TurningPoint {
                index,
                kind: VertexKind::Valley,
                value: lows[index],
            });
        }
    }

    trace!(half_window, bars = len, found = points.len(), "detected vertices");
    Ok(points)
}

/// `true` unless some other bar in `span` `beats` the bar at `index`.
#[inline]
fn is_extremum(
    values: &[Price],
    index: usize,
    span: std::ops::RangeInclusive<usize>,
    beats: impl Fn(Price, Price) -> bool,
) -> bool {
    let current = values[index];
    span.filter(|&j| j != index)
        .all(|j| !beats(values[j], current))
}

fn invalid_half_window(value: usize) -> Error {
    Error::InvalidWindow {
        name: "half_window",
        value,
    }
}
