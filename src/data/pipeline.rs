use log::{debug, info};

use super::axes::{build_axes, sample_spacing};
use super::error::ProcessingResult;
use super::model::{Chromatogram2D, RawSeries};
use super::params::ProcessingParameters;
use super::reshape::{
    blank_row_index, build_matrix, row_starts, shift_offset, subtract_blank_row,
};

/// Full run: axes → matrix → optional blank subtraction.
///
/// Returns fresh containers every time; nothing from an earlier run is
/// reused or modified.
pub fn process(raw: &RawSeries, params: &ProcessingParameters) -> ProcessingResult<Chromatogram2D> {
    params.validate()?;

    info!("Constructing time vectors...");
    let delta = sample_spacing(raw.time())?;
    info!(
        "Sampling time: {:.4} min  --  Frequency: {:.4} Hz",
        params.sampling_time,
        1.0 / (60.0 * delta)
    );
    let (ax_d1, ax_d2) = build_axes(raw.time(), params.sampling_time)?;
    debug!(
        "Number of points along D1: {}, along D2: {}",
        ax_d1.len(),
        ax_d2.len()
    );

    info!("Reshaping values into 2D matrix...");
    let mut matrix = build_matrix(
        raw.intensity(),
        &ax_d1,
        &ax_d2,
        params.shift,
        params.correction_factor,
    )?;
    debug!("Values reshaped into {:?}.", matrix.shape());

    let offset = shift_offset(&ax_d2, params.shift);
    let cycle_starts = row_starts(&ax_d1, &ax_d2, params.correction_factor)?
        .into_iter()
        .map(|start| start.saturating_sub(offset))
        .collect();

    let mut blank_row_time = None;
    if let Some(blank_time) = params.blank_time {
        let line = blank_row_index(&ax_d1, blank_time)?;
        info!("Subtracting data at {:.4} min.", ax_d1[line]);
        matrix = subtract_blank_row(&matrix, line)?;
        blank_row_time = Some(ax_d1[line]);
    }

    info!("Processing complete.");
    Ok(Chromatogram2D {
        ax_d1,
        ax_d2,
        matrix,
        blank_row_time,
        cycle_starts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::ProcessingError;

    fn ramp_series() -> RawSeries {
        let v: Vec<f64> = (0..100).map(f64::from).collect();
        RawSeries::new(v.clone(), v).unwrap()
    }

    #[test]
    fn process_without_blank() {
        let params = ProcessingParameters {
            sampling_time: 5.0,
            ..Default::default()
        };
        let out = process(&ramp_series(), &params).unwrap();
        assert_eq!(out.matrix.shape(), (out.ax_d1.len(), out.ax_d2.len()));
        assert_eq!(out.matrix.row(0), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(out.blank_row_time, None);
    }

    #[test]
    fn process_with_blank_records_row_time() {
        let params = ProcessingParameters {
            sampling_time: 5.0,
            blank_time: Some(12.0),
            ..Default::default()
        };
        let out = process(&ramp_series(), &params).unwrap();
        assert_eq!(out.blank_row_time, Some(10.0));
        assert!(out.matrix.row(2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn cycle_starts_point_into_the_raw_trace() {
        let raw = ramp_series();
        let params = ProcessingParameters {
            sampling_time: 5.0,
            ..Default::default()
        };
        let out = process(&raw, &params).unwrap();
        assert_eq!(&out.cycle_starts[..4], &[0, 1, 6, 11]);
        assert_eq!(out.cycle_start_times(raw.time())[..3], [0.0, 1.0, 6.0]);

        // A 90 s delay moves the trace two samples later, so each row
        // begins two raw samples earlier.
        let params = ProcessingParameters {
            sampling_time: 5.0,
            shift: 90.0,
            ..Default::default()
        };
        let out = process(&raw, &params).unwrap();
        assert_eq!(&out.cycle_starts[..3], &[-2, -1, 4]);
        for (n, &start) in out.cycle_starts.iter().enumerate().skip(2) {
            assert_eq!(out.matrix.row(n)[0], raw.intensity()[start as usize]);
        }
        assert_eq!(out.cycle_start_times(raw.time())[0], 4.0);
    }

    #[test]
    fn process_propagates_errors() {
        let params = ProcessingParameters {
            sampling_time: 5.0,
            blank_time: Some(-3.0),
            ..Default::default()
        };
        assert!(matches!(
            process(&ramp_series(), &params),
            Err(ProcessingError::NoBlankRow { .. })
        ));

        let params = ProcessingParameters {
            sampling_time: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            process(&ramp_series(), &params),
            Err(ProcessingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn reprocessing_returns_independent_results() {
        let raw = ramp_series();
        let first = process(
            &raw,
            &ProcessingParameters {
                sampling_time: 5.0,
                ..Default::default()
            },
        )
        .unwrap();
        let snapshot = first.matrix.clone();
        let second = process(
            &raw,
            &ProcessingParameters {
                sampling_time: 5.0,
                blank_time: Some(0.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(first.matrix, snapshot);
        assert_ne!(first.matrix, second.matrix);
    }
}
