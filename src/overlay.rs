use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Price, Series};

/// Direction of a trade fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSideError(String);

impl fmt::Display for ParseSideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown trade side '{}'", self.0)
    }
}

impl std::error::Error for ParseSideError {}

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(ParseSideError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Side {
    type Error = ParseSideError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A trade placed on the bar at `index`, as reported by a backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeMarker {
    #[serde(alias = "idx", alias = "bar_index")]
    pub index: i64,
    #[serde(alias = "Side")]
    pub side: Side,
}

/// What a [`MarkerPoint`] marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Buy,
    Sell,
    Signal,
}

impl From<Side> for MarkerKind {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Self::Buy,
            Side::Sell => Self::Sell,
        }
    }
}

/// An overlay point positioned on the price axis of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerPoint {
    pub index: usize,
    pub kind: MarkerKind,
    pub value: Price,
}

/// Trades of one side, placed at the close of their bar.
///
/// Trades whose index falls outside the series are dropped.
#[must_use]
pub fn trade_points(series: &Series, trades: &[TradeMarker], side: Side) -> Vec<MarkerPoint> {
    trades
        .iter()
        .filter(|trade| trade.side == side)
        .filter_map(|trade| {
            let index = usize::try_from(trade.index).ok()?;
            let bar = series.bars().get(index)?;
            Some(MarkerPoint {
                index,
                kind: side.into(),
                value: bar.close,
            })
        })
        .collect()
}

/// Bars whose aligned signal is `1`, placed at the bar's low.
///
/// Signals past the end of the series are ignored.
#[must_use]
pub fn signal_points(series: &Series, signals: &[i32]) -> Vec<MarkerPoint> {
    signals
        .iter()
        .zip(series.iter())
        .enumerate()
        .filter(|(_, (signal, _))| **signal == 1)
        .map(|(index, (_, bar))| MarkerPoint {
            index,
            kind: MarkerKind::Signal,
            value: bar.low,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::Bar;

    fn series() -> Series {
        (0u32..4)
            .map(|i| {
                let close = 10.0 + f64::from(i);
                crate::Bar::from(Bar::new(close, close + 1.0, close - 1.0, close).at(i.into()))
            })
            .collect()
    }

    fn trade(index: i64, side: Side) -> TradeMarker {
        TradeMarker { index, side }
    }

    mod side {
        use super::*;

        #[test]
        fn parses_case_insensitively() {
            assert_eq!("BUY".parse::<Side>(), Ok(Side::Buy));
            assert_eq!(" Sell ".parse::<Side>(), Ok(Side::Sell));
        }

        #[test]
        fn rejects_unknown() {
            let err = "hold".parse::<Side>().unwrap_err();
            assert_eq!(err.to_string(), "unknown trade side 'hold'");
        }

        #[test]
        fn decodes_with_aliases() {
            let marker: TradeMarker =
                serde_json::from_str(r#"{"bar_index": 3, "Side": "Buy"}"#).unwrap();
            assert_eq!(marker, trade(3, Side::Buy));

            let marker: TradeMarker = serde_json::from_str(r#"{"idx": 1, "side": "sell"}"#).unwrap();
            assert_eq!(marker, trade(1, Side::Sell));
        }
    }

    mod trades {
        use super::*;

        #[test]
        fn anchored_at_close() {
            let points = trade_points(&series(), &[trade(2, Side::Buy)], Side::Buy);
            assert_eq!(
                points,
                vec![MarkerPoint {
                    index: 2,
                    kind: MarkerKind::Buy,
                    value: 12.0
                }]
            );
        }

        #[test]
        fn filters_by_side() {
            let trades = [trade(0, Side::Buy), trade(1, Side::Sell), trade(3, Side::Sell)];
            let sells: Vec<_> = trade_points(&series(), &trades, Side::Sell)
                .iter()
                .map(|p| p.index)
                .collect();
            assert_eq!(sells, vec![1, 3]);
        }

        #[test]
        fn drops_out_of_range() {
            let trades = [trade(-1, Side::Buy), trade(4, Side::Buy), trade(1, Side::Buy)];
            let points = trade_points(&series(), &trades, Side::Buy);
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].index, 1);
        }
    }

    mod signals {
        use super::*;

        #[test]
        fn anchored_at_low() {
            let points = signal_points(&series(), &[0, 1, 0, 1]);
            assert_eq!(points.len(), 2);
            assert_eq!(points[0].index, 1);
            assert_eq!(points[0].value, 10.0);
            assert_eq!(points[1].kind, MarkerKind::Signal);
        }

        #[test]
        fn ignores_signals_past_the_series() {
            let points = signal_points(&series(), &[0, 0, 0, 0, 1, 1]);
            assert!(points.is_empty());
        }

        #[test]
        fn only_exact_one_counts() {
            let points = signal_points(&series(), &[2, -1, 1, 0]);
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].index, 2);
        }
    }
}
