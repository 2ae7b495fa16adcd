use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::{Colormap, HeatScale, HeatStyle};
use crate::data::model::{Chromatogram2D, RawSeries};
use crate::data::params::ProcessingParameters;
use crate::worker::WorkerMessage;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which output view fills the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Contour,
    Overlay,
    Raw,
    Projections,
    Matrix,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Contour,
        View::Overlay,
        View::Raw,
        View::Projections,
        View::Matrix,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Contour => "2D Contour",
            View::Overlay => "Overlay",
            View::Raw => "Raw",
            View::Projections => "Projections",
            View::Matrix => "Matrix",
        }
    }
}

/// Sidebar inputs, kept as text the way the user typed them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInputs {
    pub sampling_time: String,
    pub shift: String,
    pub correction_factor: String,
    pub blank_enabled: bool,
    pub blank_time: String,
}

impl Default for ParameterInputs {
    fn default() -> Self {
        Self::from_params(&ProcessingParameters::default())
    }
}

impl ParameterInputs {
    pub fn from_params(p: &ProcessingParameters) -> Self {
        Self {
            sampling_time: p.sampling_time.to_string(),
            shift: p.shift.to_string(),
            correction_factor: p.correction_factor.to_string(),
            blank_enabled: p.blank_time.is_some(),
            blank_time: p.blank_time.map(|b| b.to_string()).unwrap_or_default(),
        }
    }

    /// Parse and validate. Empty shift / correction fields mean 0.
    pub fn parse(&self) -> Result<ProcessingParameters> {
        let sampling_time = self
            .sampling_time
            .trim()
            .parse::<f64>()
            .context("Invalid sampling time input")?;
        let shift = parse_optional(&self.shift).context("Invalid shift input")?;
        let correction_factor =
            parse_optional(&self.correction_factor).context("Invalid correction factor input")?;
        let blank_time = if self.blank_enabled {
            Some(
                self.blank_time
                    .trim()
                    .parse::<f64>()
                    .context("Invalid blank time input")?,
            )
        } else {
            None
        };

        let params = ProcessingParameters {
            sampling_time,
            shift,
            correction_factor,
            blank_time,
        };
        params.validate()?;
        Ok(params)
    }
}

fn parse_optional(s: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    Ok(s.parse::<f64>()?)
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded raw trace (None until user loads a file).
    pub raw: Option<Arc<RawSeries>>,
    pub source_path: Option<PathBuf>,

    /// Treat the first line of text files as column headers.
    pub has_headers: bool,

    pub inputs: ParameterInputs,

    /// Latest successful processing result.
    pub result: Option<Chromatogram2D>,
    /// Cached mesh table for the matrix view.
    pub mesh: Vec<Vec<String>>,

    /// Heat-map colour limits; reset to the data range on every new result.
    pub heat_scale: Option<HeatScale>,
    /// Colour map and extreme colours; kept across results.
    pub heat_style: HeatStyle,
    /// Set when the heat-map texture must be re-rendered.
    pub heat_dirty: bool,

    pub view: View,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
    /// Whether a processing run is in progress.
    pub processing: bool,
}

impl AppState {
    /// Loading or processing: new requests are refused until it finishes.
    pub fn busy(&self) -> bool {
        self.loading || self.processing
    }

    /// Ingest a newly loaded trace. Results of the previous file are dropped.
    pub fn set_raw(&mut self, path: PathBuf, raw: Arc<RawSeries>) {
        self.raw = Some(raw);
        self.source_path = Some(path);
        self.result = None;
        self.mesh.clear();
        self.heat_scale = None;
        self.heat_dirty = true;
        self.status_message = None;
        self.loading = false;
    }

    /// Install a fresh processing result.
    pub fn set_result(&mut self, chrom: Chromatogram2D) {
        self.mesh = chrom.mesh_rows();
        self.heat_scale = chrom
            .matrix
            .finite_range()
            .map(|(lo, hi)| HeatScale::new(lo, hi));
        self.heat_dirty = true;
        self.status_message = None;
        self.processing = false;
        self.result = Some(chrom);
    }

    /// Apply a background job's outcome. A failure keeps whatever was shown
    /// before.
    pub fn apply(&mut self, msg: WorkerMessage) {
        match msg {
            WorkerMessage::Loaded(path, raw) => self.set_raw(path, raw),
            WorkerMessage::LoadFailed(e) => {
                self.status_message = Some(format!("Error: {e}"));
                self.loading = false;
            }
            WorkerMessage::Processed(chrom) => self.set_result(*chrom),
            WorkerMessage::ProcessFailed(e) => {
                self.status_message = Some(format!("Error: {e}"));
                self.processing = false;
            }
        }
    }
}
