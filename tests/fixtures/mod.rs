#![allow(dead_code)]

use kline_ta::{IndicatorOutput, PriceScale, RawBar, Series, normalize};
use serde::{Deserialize, de::DeserializeOwned};

/// Reference value at a series index.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub index: usize,
    pub expected: f64,
}

/// Reference BB value at a series index.
#[derive(Debug, Deserialize)]
pub struct RefBbValue {
    pub index: usize,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Reference turning point.
#[derive(Debug, Deserialize)]
pub struct RefVertex {
    pub index: usize,
    pub kind: String,
    pub value: f64,
}

const OHLCV_PATH: &str = "tests/fixtures/data/sample-daily.csv";
const TIES_PATH: &str = "tests/fixtures/data/ties-daily.csv";

/// Daily bars quoted in thousandths, as a feed would deliver them.
pub fn load_raw_bars() -> Vec<RawBar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// The sample bars auto-scaled into a series.
pub fn load_reference_series() -> Series {
    normalize(load_raw_bars(), PriceScale::Auto).expect("auto scale never fails")
}

/// Bars quoted in cents whose averages and returns keep landing next to
/// rounding ties.
pub fn load_ties_series() -> Series {
    let raw: Vec<RawBar> = load_records(TIES_PATH, "invalid OHLCV record");
    normalize(raw, PriceScale::Unit).expect("unit scale never fails")
}

/// Load single-value reference data (SMA, returns).
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

/// Load BB reference data (upper, middle, lower).
pub fn load_bb_ref(path: &str) -> Vec<RefBbValue> {
    load_records(path, "invalid BB reference record")
}

/// Load turning point reference data.
pub fn load_vertex_ref(path: &str) -> Vec<RefVertex> {
    load_records(path, "invalid vertex reference record")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert an aligned output is `None` everywhere except the referenced
/// indices, where it matches the reference.
pub fn assert_output_matches(
    name: &str,
    output: &IndicatorOutput,
    reference: &[(usize, f64)],
    len: usize,
    tolerance: f64,
) {
    assert_eq!(output.len(), len, "{name} is not aligned with the series");

    let mut expected = reference.iter().peekable();
    for (index, value) in output.iter().enumerate() {
        match (value, expected.next_if(|(i, _)| *i == index)) {
            (None, None) => {}
            (Some(actual), Some(&(_, reference))) => {
                assert_near(*actual, reference, tolerance, &format!("{name} at bar {index}"));
            }
            (actual, reference) => {
                panic!("{name} definedness mismatch at bar {index}: got {actual:?}, reference {reference:?}");
            }
        }
    }

    assert!(
        expected.next().is_none(),
        "not all reference values checked for {name}"
    );
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
