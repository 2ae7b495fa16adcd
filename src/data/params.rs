use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::{ProcessingError, ProcessingResult};

// ---------------------------------------------------------------------------
// ProcessingParameters – everything the user types into the sidebar
// ---------------------------------------------------------------------------

/// Parameters of one processing run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingParameters {
    /// Modulation (D2 cycle) time in minutes.
    pub sampling_time: f64,
    /// Constant timing offset in seconds, applied before reshaping.
    #[serde(default)]
    pub shift: f64,
    /// Per-cycle skew in samples.
    #[serde(default)]
    pub correction_factor: f64,
    /// D1 time (minutes) of the row used as blank, if any.
    #[serde(default)]
    pub blank_time: Option<f64>,
}

impl Default for ProcessingParameters {
    fn default() -> Self {
        Self {
            sampling_time: 0.5,
            shift: 0.0,
            correction_factor: 0.0,
            blank_time: None,
        }
    }
}

impl ProcessingParameters {
    /// Reject values the core cannot work with.
    pub fn validate(&self) -> ProcessingResult<()> {
        if !self.sampling_time.is_finite() || self.sampling_time <= 0.0 {
            return Err(ProcessingError::InvalidParameter(format!(
                "sampling time must be a positive number of minutes, got {}",
                self.sampling_time
            )));
        }
        if !self.shift.is_finite() {
            return Err(ProcessingError::InvalidParameter(format!(
                "shift must be finite, got {}",
                self.shift
            )));
        }
        if !self.correction_factor.is_finite() {
            return Err(ProcessingError::InvalidParameter(format!(
                "correction factor must be finite, got {}",
                self.correction_factor
            )));
        }
        if let Some(b) = self.blank_time {
            if !b.is_finite() {
                return Err(ProcessingError::InvalidParameter(format!(
                    "blank time must be finite, got {b}"
                )));
            }
        }
        Ok(())
    }
}

/// Read a JSON parameter preset, e.g.
///
/// ```json
/// { "sampling_time": 0.5078, "shift": 1.2, "blank_time": 3.0 }
/// ```
pub fn load_params(path: &Path) -> Result<ProcessingParameters> {
    let text = std::fs::read_to_string(path).context("reading parameter preset")?;
    let params: ProcessingParameters =
        serde_json::from_str(&text).context("parsing parameter preset")?;
    params.validate().context("invalid parameter preset")?;
    Ok(params)
}
