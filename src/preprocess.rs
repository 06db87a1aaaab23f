//! Boundary between loosely-shaped feed records and the canonical [`Bar`].
//!
//! Feeds disagree on field names (`Open`, `open`, `o`, `OpenPrice`, ...),
//! on the unit of timestamps and on the scale of prices. [`RawBar`] accepts
//! every known alias in one place, and [`normalize`] applies a single price
//! scale to a whole batch.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use tracing::{debug, warn};

use crate::{Bar, Error, Price, Result, Series, Timestamp};

/// Maximum price under which [`PriceScale::Auto`] leaves a batch unscaled.
pub const AUTO_SCALE_THRESHOLD: Price = 1000.0;

/// Divisor applied by [`PriceScale::Auto`] above the threshold.
pub const AUTO_SCALE_DIVISOR: Price = 1000.0;

/// Integer epochs above this are taken as milliseconds, below as seconds.
const EPOCH_MILLIS_CUTOFF: u64 = 10_000_000_000;

/// A bar as reported by an upstream feed.
///
/// Each field is looked up under the names below, in order, and the first
/// one present wins. A `null` counts as absent, so a record may carry several
/// spellings of the same field. Open, high, low, close and time are
/// required; a missing price is a decoding error rather than zero.
///
/// | field  | accepted names, by priority                    |
/// |--------|------------------------------------------------|
/// | time   | `Time`, `time`, `timestamp`, `ts`, `date`      |
/// | open   | `Open`, `open`, `o`, `OpenPrice`               |
/// | high   | `High`, `high`, `h`, `HighPrice`               |
/// | low    | `Low`, `low`, `l`, `LowPrice`                  |
/// | close  | `Close`, `close`, `c`, `ClosePrice`            |
/// | volume | `Volume`, `volume`, `v`, `TradeVolume`         |
/// | amount | `Amount`, `amount`, `Turnover`, `trade_amount` |
///
/// Times are integer epochs (seconds, or milliseconds when larger than
/// `10_000_000_000`), RFC 3339 date-times, or `YYYY-MM-DD` dates at midnight
/// UTC. They are stored as milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "FeedRecord")]
pub struct RawBar {
    pub time: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Option<f64>,
    pub amount: Option<f64>,
}

/// Every spelling a feed may use, each decoded on its own.
#[derive(Default, Deserialize)]
#[serde(default)]
struct FeedRecord {
    #[serde(rename = "Time")]
    time_title: Option<FeedTime>,
    time: Option<FeedTime>,
    timestamp: Option<FeedTime>,
    ts: Option<FeedTime>,
    date: Option<FeedTime>,

    #[serde(rename = "Open")]
    open_title: Option<Price>,
    open: Option<Price>,
    o: Option<Price>,
    #[serde(rename = "OpenPrice")]
    open_price: Option<Price>,

    #[serde(rename = "High")]
    high_title: Option<Price>,
    high: Option<Price>,
    h: Option<Price>,
    #[serde(rename = "HighPrice")]
    high_price: Option<Price>,

    #[serde(rename = "Low")]
    low_title: Option<Price>,
    low: Option<Price>,
    l: Option<Price>,
    #[serde(rename = "LowPrice")]
    low_price: Option<Price>,

    #[serde(rename = "Close")]
    close_title: Option<Price>,
    close: Option<Price>,
    c: Option<Price>,
    #[serde(rename = "ClosePrice")]
    close_price: Option<Price>,

    #[serde(rename = "Volume")]
    volume_title: Option<f64>,
    volume: Option<f64>,
    v: Option<f64>,
    #[serde(rename = "TradeVolume")]
    trade_volume: Option<f64>,

    #[serde(rename = "Amount")]
    amount_title: Option<f64>,
    amount: Option<f64>,
    #[serde(rename = "Turnover")]
    turnover: Option<f64>,
    trade_amount: Option<f64>,
}

/// A required field none of whose spellings is present.
#[derive(Debug, thiserror::Error)]
#[error("missing field `{0}`")]
struct MissingField(&'static str);

/// First present value of an ordered list of spellings.
fn first_of<T, const N: usize>(spellings: [Option<T>; N]) -> Option<T> {
    spellings.into_iter().flatten().next()
}

impl TryFrom<FeedRecord> for RawBar {
    type Error = MissingField;

    fn try_from(r: FeedRecord) -> std::result::Result<Self, MissingField> {
        let FeedTime(time) = first_of([r.time_title, r.time, r.timestamp, r.ts, r.date])
            .ok_or(MissingField("Time"))?;

        Ok(Self {
            time,
            open: first_of([r.open_title, r.open, r.o, r.open_price]).ok_or(MissingField("Open"))?,
            high: first_of([r.high_title, r.high, r.h, r.high_price]).ok_or(MissingField("High"))?,
            low: first_of([r.low_title, r.low, r.l, r.low_price]).ok_or(MissingField("Low"))?,
            close: first_of([r.close_title, r.close, r.c, r.close_price])
                .ok_or(MissingField("Close"))?,
            volume: first_of([r.volume_title, r.volume, r.v, r.trade_volume]),
            amount: first_of([r.amount_title, r.amount, r.turnover, r.trade_amount]),
        })
    }
}

/// A feed timestamp in milliseconds.
#[derive(Clone, Copy)]
struct FeedTime(Timestamp);

impl<'de> Deserialize<'de> for FeedTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TimeVisitor).map(FeedTime)
    }
}

impl From<RawBar> for Bar {
    /// Converts without scaling: missing volume becomes `0`, missing amount
    /// stays `None`.
    fn from(raw: RawBar) -> Self {
        Self {
            time: raw.time,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume.unwrap_or(0.0),
            amount: raw.amount,
        }
    }
}

/// Unit of the prices in a batch of [`RawBar`]s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceScale {
    /// Prices are already in the display unit.
    Unit,
    /// Every open, high, low and close is divided by this value.
    Divisor(f64),
    /// Guess from magnitude: divide by [`AUTO_SCALE_DIVISOR`] when the largest
    /// open, high, low or close in the batch exceeds [`AUTO_SCALE_THRESHOLD`].
    ///
    /// Only a fallback for feeds with an unknown unit. The whole batch shares
    /// one divisor, so a batch mixing instruments of very different
    /// magnitudes will mis-scale some of them.
    Auto,
}

impl PriceScale {
    /// Resolves the divisor for a batch.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidScale`] for a divisor that is not positive and finite.
    pub fn divisor(self, bars: &[RawBar]) -> Result<Price> {
        match self {
            Self::Unit => Ok(1.0),
            Self::Divisor(d) if d.is_finite() && d > 0.0 => Ok(d),
            Self::Divisor(d) => Err(Error::InvalidScale(d)),
            Self::Auto => {
                let max = bars
                    .iter()
                    .flat_map(|b| [b.open, b.high, b.low, b.close])
                    .fold(f64::NEG_INFINITY, f64::max);

                Ok(if max > AUTO_SCALE_THRESHOLD {
                    AUTO_SCALE_DIVISOR
                } else {
                    1.0
                })
            }
        }
    }
}

/// Builds a [`Series`] from feed records.
///
/// Prices are divided by the divisor `scale` resolves to; volume and amount
/// are never scaled. Bars keep their input order.
///
/// # Errors
///
/// [`Error::InvalidScale`] for an invalid [`PriceScale::Divisor`].
///
/// # Example
///
/// ```
/// use kline_ta::{PriceScale, RawBar, normalize};
///
/// let raw: Vec<RawBar> = serde_json::from_str(
///     r#"[{"Time": 1700000000, "Open": 5000, "High": 5200, "Low": 4900, "Close": 5100}]"#,
/// ).unwrap();
///
/// let series = normalize(raw, PriceScale::Auto).unwrap();
/// assert_eq!(series[0].close, 5.1);
/// assert_eq!(series[0].volume, 0.0);
/// ```
pub fn normalize(raw: impl IntoIterator<Item = RawBar>, scale: PriceScale) -> Result<Series> {
    let raw: Vec<RawBar> = raw.into_iter().collect();
    let divisor = scale.divisor(&raw)?;
    debug!(?scale, divisor, bars = raw.len(), "normalizing bars");

    let inverted = raw.iter().filter(|b| b.low > b.high).count();
    if inverted > 0 {
        warn!(inverted, "bars with low above high");
    }
    let out_of_order = raw.windows(2).filter(|w| w[1].time < w[0].time).count();
    if out_of_order > 0 {
        warn!(out_of_order, "bar timestamps going backwards");
    }

    Ok(raw
        .into_iter()
        .map(|raw| {
            let mut bar = Bar::from(raw);
            bar.open /= divisor;
            bar.high /= divisor;
            bar.low /= divisor;
            bar.close /= divisor;
            bar
        })
        .collect())
}

struct TimeVisitor;

impl Visitor<'_> for TimeVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an epoch in seconds or milliseconds, an RFC 3339 date-time, or a YYYY-MM-DD date")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Timestamp, E> {
        Ok(epoch_millis(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Timestamp, E> {
        u64::try_from(v)
            .map(epoch_millis)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Timestamp, E> {
        parse_time(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

fn epoch_millis(epoch: u64) -> Timestamp {
    if epoch > EPOCH_MILLIS_CUTOFF {
        epoch
    } else {
        epoch * 1000
    }
}

fn parse_time(text: &str) -> Option<Timestamp> {
    let text = text.trim();

    if let Ok(epoch) = text.parse::<u64>() {
        return Some(epoch_millis(epoch));
    }

    let instant = OffsetDateTime::parse(text, &Rfc3339).ok().or_else(|| {
        Date::parse(text, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|date| date.midnight().assume_utc())
    })?;

    u64::try_from(instant.unix_timestamp_nanos() / 1_000_000).ok()
}
