use super::error::{ProcessingError, ProcessingResult};

// ---------------------------------------------------------------------------
// RawSeries – the two columns handed over by the loader
// ---------------------------------------------------------------------------

/// The raw 1D acquisition: one long trace of back-to-back D2 cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    /// Acquisition time in minutes.
    time: Vec<f64>,
    /// Detector response, same length as `time`.
    intensity: Vec<f64>,
}

impl RawSeries {
    pub fn new(time: Vec<f64>, intensity: Vec<f64>) -> ProcessingResult<Self> {
        if time.len() != intensity.len() {
            return Err(ProcessingError::LengthMismatch {
                time: time.len(),
                intensity: intensity.len(),
            });
        }
        Ok(Self { time, intensity })
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

// ---------------------------------------------------------------------------
// IntensityMatrix – row = D1 cycle, column = D2 position
// ---------------------------------------------------------------------------

/// Dense row-major matrix. Missing samples are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityMatrix {
    n_rows: usize,
    n_cols: usize,
    values: Vec<f64>,
}

impl IntensityMatrix {
    /// Build from pre-filled row-major storage.
    pub(crate) fn from_row_major(n_rows: usize, n_cols: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), n_rows * n_cols);
        Self {
            n_rows,
            n_cols,
            values,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(rows, cols)`, numpy style.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// One D2 chromatogram.
    pub fn row(&self, n: usize) -> &[f64] {
        &self.values[n * self.n_cols..(n + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks_exact(0)` panics, and a zero-width matrix has no rows anyway.
        self.values.chunks_exact(self.n_cols.max(1)).take(self.n_rows)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.n_rows && col < self.n_cols {
            Some(self.values[row * self.n_cols + col])
        } else {
            None
        }
    }

    /// All values in row-major order (the "raw" view of the reshaped data).
    pub fn as_flat(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn as_flat_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Sum of every row, i.e. the matrix collapsed onto the D1 axis.
    /// Missing samples are skipped; an all-`NaN` row sums to zero.
    pub fn row_sums(&self) -> Vec<f64> {
        self.rows()
            .map(|row| row.iter().filter(|v| !v.is_nan()).sum::<f64>())
            .collect()
    }

    /// Sum of every column, i.e. the matrix collapsed onto the D2 axis.
    pub fn col_sums(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.n_cols];
        for row in self.rows() {
            for (acc, v) in out.iter_mut().zip(row) {
                if !v.is_nan() {
                    *acc += v;
                }
            }
        }
        out
    }

    /// Smallest and largest finite value, `None` if there is none.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// ---------------------------------------------------------------------------
// Chromatogram2D – one complete processing result
// ---------------------------------------------------------------------------

/// Axes plus matrix, as produced by [`crate::data::pipeline::process`].
#[derive(Debug, Clone)]
pub struct Chromatogram2D {
    /// D1 axis in minutes, one entry per matrix row.
    pub ax_d1: Vec<f64>,
    /// D2 axis in seconds, one entry per matrix column.
    pub ax_d2: Vec<f64>,
    pub matrix: IntensityMatrix,
    /// D1 time of the row that was subtracted, if blank subtraction ran.
    pub blank_row_time: Option<f64>,
    /// Index into the raw trace of each row's first cell. Shifts and skew can
    /// push it outside the trace.
    pub cycle_starts: Vec<i64>,
}

/// Total intensity along each dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Projections {
    /// One value per D1 point.
    pub d1: Vec<f64>,
    /// One value per D2 point.
    pub d2: Vec<f64>,
}

impl Chromatogram2D {
    pub fn projections(&self) -> Projections {
        Projections {
            d1: self.matrix.row_sums(),
            d2: self.matrix.col_sums(),
        }
    }

    /// Acquisition time at which each row begins, for rows that begin inside
    /// the trace.
    pub fn cycle_start_times(&self, time: &[f64]) -> Vec<f64> {
        self.cycle_starts
            .iter()
            .filter_map(|&i| usize::try_from(i).ok())
            .filter_map(|i| time.get(i).copied())
            .collect()
    }

    /// The "mesh" table: a header row holding the D2 axis, then one row per
    /// D1 cycle prefixed with its D1 time. The corner cell is empty.
    pub fn mesh_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.ax_d1.len() + 1);

        let mut header = Vec::with_capacity(self.ax_d2.len() + 1);
        header.push(String::new());
        header.extend(self.ax_d2.iter().map(|v| format!("{v:.3}")));
        out.push(header);

        for (d1, row) in self.ax_d1.iter().zip(self.matrix.rows()) {
            let mut line = Vec::with_capacity(row.len() + 1);
            line.push(format!("{d1:.3}"));
            line.extend(row.iter().map(|v| format!("{v:.3}")));
            out.push(line);
        }
        out
    }
}
