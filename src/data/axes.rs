use super::error::{ProcessingError, ProcessingResult};

/// Relative slack when counting how many steps fit in a span, so that a
/// sampling time which is an exact multiple of the sample spacing is not
/// lost to representation error.
pub const STEP_EPS: f64 = 1e-9;

/// Nominal spacing between two raw samples, in the raw time unit (minutes).
pub fn sample_spacing(time: &[f64]) -> ProcessingResult<f64> {
    if time.len() < 2 {
        return Err(ProcessingError::DegenerateInput(format!(
            "need at least 2 samples to derive a spacing, got {}",
            time.len()
        )));
    }
    let delta = (time[time.len() - 1] - time[0]) / (time.len() - 1) as f64;
    if !delta.is_finite() || delta <= 0.0 {
        return Err(ProcessingError::DegenerateInput(format!(
            "sample spacing must be positive, got {delta}"
        )));
    }
    Ok(delta)
}

/// Build the D1 (minutes) and D2 (seconds) axes.
///
/// * D2 runs from 0 to `sampling_time` inclusive in steps of the raw
///   spacing: `floor(sampling_time / delta) + 1` points, then converted to
///   seconds.
/// * D1 runs from 0 in steps of `sampling_time` and stays strictly below
///   `time[-1] - 2 * sampling_time`, leaving room for the last row's window.
pub fn build_axes(time: &[f64], sampling_time: f64) -> ProcessingResult<(Vec<f64>, Vec<f64>)> {
    if !sampling_time.is_finite() || sampling_time <= 0.0 {
        return Err(ProcessingError::InvalidParameter(format!(
            "sampling time must be positive, got {sampling_time}"
        )));
    }
    let delta = sample_spacing(time)?;
    if sampling_time < delta {
        return Err(ProcessingError::InvalidParameter(format!(
            "sampling time {sampling_time} min is shorter than one sample ({delta} min)"
        )));
    }

    let n_d2 = (sampling_time / delta + STEP_EPS).floor() as usize + 1;
    let ax_d2: Vec<f64> = (0..n_d2).map(|i| i as f64 * delta * 60.0).collect();

    let stop = time[time.len() - 1] - 2.0 * sampling_time;
    let n_d1 = if stop > 0.0 {
        (stop / sampling_time - STEP_EPS).ceil() as usize
    } else {
        0
    };
    if n_d1 == 0 {
        return Err(ProcessingError::DegenerateInput(format!(
            "run of {:.4} min is too short for a {sampling_time} min modulation",
            time[time.len() - 1]
        )));
    }
    let ax_d1: Vec<f64> = (0..n_d1).map(|k| k as f64 * sampling_time).collect();

    Ok((ax_d1, ax_d2))
}
