//! Chart-level selection of overlays, computed in one pass over a series.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    BollingerBands, IndicatorOutput, Result, Series, VertexSet, benchmark_returns, bollinger,
    detect_all, sma,
};

/// Bollinger band parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandSettings {
    pub window: usize,
    pub k: f64,
}

impl Default for BandSettings {
    fn default() -> Self {
        Self { window: 20, k: 2.0 }
    }
}

/// Which overlays to compute for a chart.
///
/// Missing fields fall back to their defaults when deserializing, so
/// `{}` is the stock chart: SMA 5 and 20, 20-bar 2σ bands, 8-bar turning
/// points and a buy-and-hold line. `"bollinger": null` turns the bands off.
///
/// ```
/// use kline_ta::StudyConfig;
///
/// let config: StudyConfig = serde_json::from_str(r#"{"sma_windows": [10]}"#).unwrap();
/// assert_eq!(config.sma_windows, vec![10]);
/// assert_eq!(config.vertex_windows, vec![8]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub sma_windows: Vec<usize>,
    pub bollinger: Option<BandSettings>,
    pub vertex_windows: Vec<usize>,
    pub benchmark: bool,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            sma_windows: vec![5, 20],
            bollinger: Some(BandSettings::default()),
            vertex_windows: vec![8],
            benchmark: true,
        }
    }
}

/// A moving average line tagged with its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaLine {
    pub window: usize,
    pub values: IndicatorOutput,
}

/// Everything a [`StudyConfig`] asked for, aligned to the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub sma: Vec<SmaLine>,
    pub bollinger: Option<BollingerBands>,
    pub vertices: Vec<VertexSet>,
    /// `None` when not requested or when the series is empty.
    pub benchmark: Option<Vec<f64>>,
}

impl StudyConfig {
    /// Computes every requested overlay.
    ///
    /// # Errors
    ///
    /// The first error of any underlying computation: a zero window or
    /// half-window, a bad multiplier, or a zero or non-finite first close
    /// when the benchmark is on.
    pub fn compute(&self, series: &Series) -> Result<Study> {
        debug!(
            bars = series.len(),
            smas = self.sma_windows.len(),
            bands = self.bollinger.is_some(),
            vertex_sets = self.vertex_windows.len(),
            "computing study"
        );

        let sma = self
            .sma_windows
            .iter()
            .map(|&window| {
                Ok(SmaLine {
                    window,
                    values: sma(series, window)?,
                })
            })
            .collect::<Result<_>>()?;

        let bollinger = self
            .bollinger
            .map(|band| bollinger(series, band.window, band.k))
            .transpose()?;

        let vertices = detect_all(series, &self.vertex_windows)?;

        let benchmark = if self.benchmark && !series.is_empty() {
            Some(benchmark_returns(series)?)
        } else {
            None
        };

        Ok(Study {
            sma,
            bollinger,
            vertices,
            benchmark,
        })
    }
}
