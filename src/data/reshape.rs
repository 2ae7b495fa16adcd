//! Cut the flat intensity trace into one row per D1 modulation cycle.
//!
//! Missing samples, whether padded in by a shift or addressed past either
//! end of the trace by a row window, are always `NaN`. Rows are never
//! shortened.

use super::axes::STEP_EPS;
use super::error::{ProcessingError, ProcessingResult};
use super::model::IntensityMatrix;

/// Fixed one-sample offset added to the start of every row after the first.
pub const IDX_START: i64 = 1;

/// Number of samples a shift of `shift` seconds moves the trace by: the
/// count of D2 axis points lying within `|shift|`.
pub fn shift_samples(ax_d2: &[f64], shift: f64) -> usize {
    if shift == 0.0 {
        return 0;
    }
    ax_d2.iter().filter(|&&t| t <= shift.abs()).count()
}

/// Signed version of [`shift_samples`]: positive when the trace is delayed.
/// `shifted[i] == raw[i - offset]` wherever both exist.
pub fn shift_offset(ax_d2: &[f64], shift: f64) -> i64 {
    let num = shift_samples(ax_d2, shift) as i64;
    if shift > 0.0 {
        num
    } else {
        -num
    }
}

/// Delay (`shift > 0`) or advance (`shift < 0`) the trace by
/// [`shift_samples`]. Length is preserved; the vacated end is filled with
/// `NaN`.
pub fn shift_intensity(intensity: &[f64], ax_d2: &[f64], shift: f64) -> Vec<f64> {
    let len = intensity.len();
    let num = shift_samples(ax_d2, shift).min(len);
    if num == 0 {
        return intensity.to_vec();
    }

    let mut out = Vec::with_capacity(len);
    if shift > 0.0 {
        out.extend(std::iter::repeat(f64::NAN).take(num));
        out.extend_from_slice(&intensity[..len - num]);
    } else {
        out.extend_from_slice(&intensity[num..]);
        out.extend(std::iter::repeat(f64::NAN).take(num));
    }
    out
}

/// First index (into the shifted trace) of row `n`.
///
/// Row 0 is the head of the trace. Row `n >= 1` is the window cut on pass
/// `n - 1` of the cycle loop, so both the nominal cycle start and the skew
/// are taken at `n - 1`. `frequency` is in samples per minute and
/// `d1_step` in minutes.
pub fn row_start(n: usize, d1_step: f64, frequency: f64, correction_factor: f64) -> i64 {
    if n == 0 {
        return 0;
    }
    let pass = (n - 1) as f64;
    // Float → int casts saturate, so extreme factors end up as far-off
    // (all-NaN) windows rather than overflowing.
    let nominal = (pass * d1_step * frequency + STEP_EPS).floor() as i64;
    let skew = (pass * correction_factor).floor() as i64;
    nominal.saturating_add(IDX_START).saturating_sub(skew)
}

/// Start index of every row, checking that the axes describe a usable
/// sampling.
pub fn row_starts(
    ax_d1: &[f64],
    ax_d2: &[f64],
    correction_factor: f64,
) -> ProcessingResult<Vec<i64>> {
    if ax_d2.len() < 2 {
        return Err(ProcessingError::DegenerateInput(format!(
            "D2 axis needs at least 2 points, got {}",
            ax_d2.len()
        )));
    }
    if ax_d1.is_empty() {
        return Err(ProcessingError::DegenerateInput("D1 axis is empty".into()));
    }
    if !correction_factor.is_finite() {
        return Err(ProcessingError::InvalidParameter(format!(
            "correction factor must be finite, got {correction_factor}"
        )));
    }

    let frequency = 60.0 / ax_d2[1];
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(ProcessingError::DegenerateInput(format!(
            "D2 axis step {} s does not give a usable sampling frequency",
            ax_d2[1]
        )));
    }
    // A single-row matrix only ever reads row 0, which ignores the step.
    let d1_step = ax_d1.get(1).copied().unwrap_or(0.0);

    Ok((0..ax_d1.len())
        .map(|n| row_start(n, d1_step, frequency, correction_factor))
        .collect())
}

/// Reshape `intensity` into a `len(ax_d1) × len(ax_d2)` matrix.
///
/// The sampling frequency is recovered from the D2 axis step and the cycle
/// length from the D1 axis step, so both stay consistent with
/// [`crate::data::axes::build_axes`].
pub fn build_matrix(
    intensity: &[f64],
    ax_d1: &[f64],
    ax_d2: &[f64],
    shift: f64,
    correction_factor: f64,
) -> ProcessingResult<IntensityMatrix> {
    if !shift.is_finite() {
        return Err(ProcessingError::InvalidParameter(format!(
            "shift must be finite, got {shift}"
        )));
    }
    let starts = row_starts(ax_d1, ax_d2, correction_factor)?;

    let values = shift_intensity(intensity, ax_d2, shift);
    let n_rows = ax_d1.len();
    let n_cols = ax_d2.len();
    let len = values.len() as i64;

    let mut out = Vec::with_capacity(n_rows * n_cols);
    for start in starts {
        out.extend((0..n_cols as i64).map(|j| {
            match start.checked_add(j) {
                Some(idx) if (0..len).contains(&idx) => values[idx as usize],
                _ => f64::NAN,
            }
        }));
    }

    Ok(IntensityMatrix::from_row_major(n_rows, n_cols, out))
}

/// Index of the last D1 row at or before `blank_time` (minutes).
pub fn blank_row_index(ax_d1: &[f64], blank_time: f64) -> ProcessingResult<usize> {
    ax_d1
        .iter()
        .rposition(|&t| t <= blank_time)
        .ok_or(ProcessingError::NoBlankRow {
            blank_time,
            first: ax_d1.first().copied().unwrap_or(f64::NAN),
        })
}

/// Subtract row `blank_line` from every row, returning a new matrix.
pub fn subtract_blank_row(
    matrix: &IntensityMatrix,
    blank_line: usize,
) -> ProcessingResult<IntensityMatrix> {
    if blank_line >= matrix.n_rows() {
        return Err(ProcessingError::DegenerateInput(format!(
            "blank row {blank_line} is outside a matrix of {} rows",
            matrix.n_rows()
        )));
    }
    let blank = matrix.row(blank_line).to_vec();

    let mut out = matrix.clone();
    let n_cols = out.n_cols().max(1);
    for row in out.as_flat_mut().chunks_exact_mut(n_cols) {
        for (v, b) in row.iter_mut().zip(&blank) {
            *v -= b;
        }
    }
    Ok(out)
}

/// Subtract the D1 row at `blank_time` from every row, returning a new
/// matrix. The blank row itself becomes zero wherever it is finite.
pub fn subtract_blank(
    matrix: &IntensityMatrix,
    ax_d1: &[f64],
    blank_time: f64,
) -> ProcessingResult<IntensityMatrix> {
    if ax_d1.len() != matrix.n_rows() {
        return Err(ProcessingError::DegenerateInput(format!(
            "D1 axis has {} points but the matrix has {} rows",
            ax_d1.len(),
            matrix.n_rows()
        )));
    }
    subtract_blank_row(matrix, blank_row_index(ax_d1, blank_time)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::axes::build_axes;

    fn scenario() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..100).map(f64::from).collect();
        let (d1, d2) = build_axes(&time, 5.0).unwrap();
        (time, d1, d2)
    }

    /// Compare with `NaN == NaN`.
    fn same(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
    }

    #[test]
    fn row_zero_is_the_head_of_the_trace() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 0.0).unwrap();
        assert_eq!(m.shape(), (18, 6));
        assert_eq!(m.row(0), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn later_rows_carry_the_one_sample_offset() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 0.0).unwrap();
        // Row 1 is cut on the first pass: floor(0) + 1.
        assert_eq!(m.row(1), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.row(2)[0], 6.0);
        assert_eq!(m.row(17)[0], 81.0);
        assert!(m.as_flat().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn row_starts_follow_the_cycle_pass() {
        let (_, d1, d2) = scenario();
        let starts = row_starts(&d1, &d2, 0.0).unwrap();
        assert_eq!(&starts[..4], &[0, 1, 6, 11]);
        assert_eq!(starts.len(), d1.len());
    }

    #[test]
    fn correction_factor_skews_rows_back() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 1.5).unwrap();
        // row 2, pass 1: floor(5) + 1 - floor(1.5)
        assert_eq!(m.row(2)[0], 5.0);
        // row 3, pass 2: floor(10) + 1 - floor(3.0)
        assert_eq!(m.row(3)[0], 8.0);
        // pass 0 is never skewed
        assert_eq!(m.row(1)[0], 1.0);
        assert_eq!(m.row(0)[0], 0.0);
    }

    #[test]
    fn windows_past_the_end_are_nan_filled() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, -1.0).unwrap();
        // pass 16: 80 + 1 + 16
        assert!(same(
            m.row(17),
            &[97.0, 98.0, 99.0, f64::NAN, f64::NAN, f64::NAN]
        ));
        assert_eq!(m.n_cols(), 6);

        let m = build_matrix(&intensity, &d1, &d2, 0.0, -2.0).unwrap();
        assert!(same(
            m.row(15),
            &[99.0, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN]
        ));
        assert!(m.row(16).iter().all(|v| v.is_nan()));
        assert!(m.row(17).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn windows_before_the_start_are_nan_filled() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 10.0).unwrap();
        assert_eq!(m.row(1)[0], 1.0);
        // pass 1: 5 + 1 - 10
        assert!(same(
            m.row(2),
            &[f64::NAN, f64::NAN, f64::NAN, f64::NAN, 0.0, 1.0]
        ));
    }

    #[test]
    fn positive_shift_delays_the_trace() {
        let (intensity, d1, d2) = scenario();
        // 0 s and 60 s are within 90 s: two samples.
        let m = build_matrix(&intensity, &d1, &d2, 90.0, 0.0).unwrap();
        assert!(same(m.row(0), &[f64::NAN, f64::NAN, 0.0, 1.0, 2.0, 3.0]));
        assert!(same(m.row(1), &[f64::NAN, 0.0, 1.0, 2.0, 3.0, 4.0]));
        assert_eq!(m.row(2), &[4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn negative_shift_advances_the_trace() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, -90.0, 0.0).unwrap();
        assert_eq!(m.row(0), &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let shifted = shift_intensity(&intensity, &d2, -90.0);
        assert_eq!(shifted.len(), intensity.len());
        assert!(shifted[98].is_nan() && shifted[99].is_nan());
    }

    #[test]
    fn shift_realigns_with_unshifted_rows() {
        let time: Vec<f64> = (0..3_000).map(|i| i as f64 * 0.004).collect();
        let intensity: Vec<f64> = (0..3_000).map(|i| (i as f64 * 0.37).sin()).collect();
        let (d1, d2) = build_axes(&time, 0.5078).unwrap();
        let shift = 2.0;
        let num = d2.iter().filter(|&&t| t <= shift).count() as i64;
        assert_eq!(shift_offset(&d2, shift), num);

        let plain = build_matrix(&intensity, &d1, &d2, 0.0, 0.0).unwrap();
        let moved = build_matrix(&intensity, &d1, &d2, shift, 0.0).unwrap();
        let freq = 60.0 / d2[1];
        assert_eq!(row_start(1, d1[1], freq, 0.0), IDX_START);
        for n in 0..d1.len() {
            let start = row_start(n, d1[1], freq, 0.0);
            for j in 0..d2.len() {
                let src = start + j as i64 - num;
                let got = moved.get(n, j).unwrap();
                if src < 0 {
                    assert!(got.is_nan());
                } else {
                    assert_eq!(got, intensity[src as usize]);
                }
            }
        }
        assert_eq!(plain.shape(), moved.shape());
    }

    #[test]
    fn extreme_correction_factor_keeps_the_shape() {
        let (intensity, d1, d2) = scenario();
        for cf in [1e300, -1e300, f64::MAX, -f64::MAX] {
            let m = build_matrix(&intensity, &d1, &d2, 0.0, cf).unwrap();
            assert_eq!(m.shape(), (18, 6));
            assert_eq!(m.row(0), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
            assert_eq!(m.row(1), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
            assert!(m.rows().skip(2).flatten().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn row_start_saturates() {
        assert_eq!(row_start(3, 5.0, 1.0, -1e300), i64::MAX);
        assert!(row_start(3, 5.0, 1.0, 1e300) < -(1_i64 << 62));
    }

    #[test]
    fn negative_shift_offset_is_signed() {
        let (_, _, d2) = scenario();
        assert_eq!(shift_offset(&d2, 90.0), 2);
        assert_eq!(shift_offset(&d2, -90.0), -2);
        assert_eq!(shift_offset(&d2, 0.0), 0);
    }

    #[test]
    fn tiny_shift_still_moves_one_sample() {
        let (intensity, _, d2) = scenario();
        let out = shift_intensity(&intensity, &d2, 0.5);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn shift_longer_than_trace_blanks_everything() {
        let intensity = vec![1.0, 2.0, 3.0];
        let d2: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert!(shift_intensity(&intensity, &d2, 100.0).iter().all(|v| v.is_nan()));
        assert!(shift_intensity(&intensity, &d2, -100.0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn degenerate_axes_are_rejected() {
        let intensity = vec![0.0; 10];
        assert!(matches!(
            build_matrix(&intensity, &[0.0], &[0.0], 0.0, 0.0),
            Err(ProcessingError::DegenerateInput(_))
        ));
        assert!(matches!(
            build_matrix(&intensity, &[], &[0.0, 1.0], 0.0, 0.0),
            Err(ProcessingError::DegenerateInput(_))
        ));
    }

    #[test]
    fn single_row_matrix() {
        let intensity: Vec<f64> = (0..10).map(f64::from).collect();
        let m = build_matrix(&intensity, &[0.0], &[0.0, 60.0, 120.0], 0.0, 0.0).unwrap();
        assert_eq!(m.shape(), (1, 3));
        assert_eq!(m.row(0), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn blank_row_becomes_zero() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 0.0).unwrap();
        for k in [0, 4, 17] {
            let out = subtract_blank(&m, &d1, d1[k]).unwrap();
            assert!(out.row(k).iter().all(|&v| v == 0.0));
        }
        let out = subtract_blank(&m, &d1, d1[3]).unwrap();
        // rows 3 and 5 start at 11 and 21
        assert_eq!(out.row(5), &[10.0; 6]);
    }

    #[test]
    fn blank_row_subtraction_by_index() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 0.0).unwrap();
        let line = blank_row_index(&d1, 12.0).unwrap();
        assert_eq!(
            subtract_blank_row(&m, line).unwrap(),
            subtract_blank(&m, &d1, 12.0).unwrap()
        );
        assert!(matches!(
            subtract_blank_row(&m, 18),
            Err(ProcessingError::DegenerateInput(_))
        ));
    }

    #[test]
    fn blank_picks_last_row_at_or_before_time() {
        let (_, d1, _) = scenario();
        assert_eq!(blank_row_index(&d1, 7.0).unwrap(), 1);
        assert_eq!(blank_row_index(&d1, 10.0).unwrap(), 2);
        assert_eq!(blank_row_index(&d1, 1_000.0).unwrap(), 17);
    }

    #[test]
    fn blank_before_first_row_fails() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 0.0).unwrap();
        let err = subtract_blank(&m, &d1, -1.0).unwrap_err();
        assert!(matches!(err, ProcessingError::NoBlankRow { .. }));
    }

    #[test]
    fn blank_subtraction_leaves_input_untouched() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 0.0).unwrap();
        let before = m.clone();
        let _ = subtract_blank(&m, &d1, 20.0).unwrap();
        assert_eq!(m, before);
    }

    #[test]
    fn blank_rejects_mismatched_axis() {
        let (intensity, d1, d2) = scenario();
        let m = build_matrix(&intensity, &d1, &d2, 0.0, 0.0).unwrap();
        assert!(matches!(
            subtract_blank(&m, &d1[..3], 0.0),
            Err(ProcessingError::DegenerateInput(_))
        ));
    }
}
