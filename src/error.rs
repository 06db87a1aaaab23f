use thiserror::Error;

/// Invalid input rejected by a computation.
///
/// Every variant is a programming or configuration error: computations are
/// pure, so retrying with the same input fails the same way. Too little data
/// for a window is not an error; it yields undefined positions instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("{name} must be positive, got {value}")]
    InvalidWindow { name: &'static str, value: usize },

    #[error("band multiplier must be positive and finite, got {0}")]
    InvalidMultiplier(f64),

    #[error("price scale divisor must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("return series has no base value")]
    MissingBase,
    #[error("return base must be non-zero and finite, got {0}")]
    InvalidBase(f64),

    #[error("highs and lows differ in length: {highs} vs {lows}")]
    LengthMismatch { highs: usize, lows: usize },
}

/// Result alias for fallible computations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
