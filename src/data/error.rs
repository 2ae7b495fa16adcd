use thiserror::Error;

/// Failures of the axis / reshaping core.
///
/// Slices that run past either end of the raw trace are not an error: the
/// missing samples are filled with `NaN` (see [`crate::data::reshape`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("no D1 row at or before blank time {blank_time:.4} min (first row is at {first:.4} min)")]
    NoBlankRow { blank_time: f64, first: f64 },
    #[error("time has {time} values but intensity has {intensity}")]
    LengthMismatch { time: usize, intensity: usize },
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
