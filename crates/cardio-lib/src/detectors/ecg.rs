use crate::{
    config::ClassifierConfig,
    dsp::{
        butterworth::ButterworthBandpass,
        find_peaks,
        stats::{mean, std_dev},
    },
    error::ClassifyError,
    signal::PeakSet,
};
use log::debug;

/// Design the band-pass described by `cfg.filter` for `cfg.sampling_rate`.
pub fn design_bandpass(cfg: &ClassifierConfig) -> Result<ButterworthBandpass, ClassifyError> {
    ButterworthBandpass::design(
        cfg.filter.order,
        cfg.filter.lowcut_hz,
        cfg.filter.highcut_hz,
        cfg.fs(),
    )
}

/// Band-pass the raw lead with zero phase and normalize to zero mean, unit variance.
pub fn preprocess(raw: &[f64], cfg: &ClassifierConfig) -> Result<Vec<f64>, ClassifyError> {
    let filter = design_bandpass(cfg)?;
    preprocess_with(&filter, raw)
}

/// Same as [`preprocess`] with an already designed filter.
pub fn preprocess_with(
    filter: &ButterworthBandpass,
    raw: &[f64],
) -> Result<Vec<f64>, ClassifyError> {
    if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
        return Err(ClassifyError::NonFiniteSample { index });
    }
    let filtered = filter.filtfilt(raw)?;
    let scale = raw.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    normalize(filtered, scale)
}

/// Filtered spread below this fraction of the raw amplitude is rounding noise.
const FLAT_TOLERANCE: f64 = 1e-9;

fn normalize(mut data: Vec<f64>, scale: f64) -> Result<Vec<f64>, ClassifyError> {
    let m = mean(&data);
    let sd = std_dev(&data);
    if sd <= FLAT_TOLERANCE * scale || sd <= 0.0 || !sd.is_finite() {
        return Err(ClassifyError::DegenerateSignal);
    }
    for v in data.iter_mut() {
        *v = (*v - m) / sd;
    }
    Ok(data)
}

/// QRS peaks: local maxima at least `height_factor` standard deviations tall,
/// separated by the refractory period.
pub fn detect_peaks(filtered: &[f64], cfg: &ClassifierConfig) -> PeakSet {
    if filtered.is_empty() {
        return PeakSet::default();
    }
    let height = cfg.peaks.height_factor * std_dev(filtered);
    let distance = cfg.min_peak_distance();
    let indices = find_peaks(filtered, height, distance);
    debug!(
        "detected {} peaks (height >= {:.3}, distance {} samples)",
        indices.len(),
        height,
        distance
    );
    PeakSet::from_indices(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::SyntheticEcg;
    use std::f64::consts::PI;

    #[test]
    fn preprocess_normalizes_output() {
        let cfg = ClassifierConfig::default();
        let raw = SyntheticEcg::default().generate();
        let out = preprocess(&raw, &cfg).expect("preprocess");
        assert_eq!(out.len(), raw.len());
        assert!(mean(&out).abs() < 1e-9);
        assert!((std_dev(&out) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_signal_is_degenerate() {
        let cfg = ClassifierConfig::default();
        let err = preprocess(&[0.7; 1000], &cfg).unwrap_err();
        assert_eq!(err, ClassifyError::DegenerateSignal);
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let cfg = ClassifierConfig::default();
        let mut raw = vec![0.0; 500];
        raw[42] = f64::NAN;
        let err = preprocess(&raw, &cfg).unwrap_err();
        assert_eq!(err, ClassifyError::NonFiniteSample { index: 42 });
    }

    #[test]
    fn short_signal_is_rejected() {
        let cfg = ClassifierConfig::default();
        let err = preprocess(&[1.0, 2.0, 3.0], &cfg).unwrap_err();
        assert!(matches!(err, ClassifyError::SignalTooShort { len: 3, .. }));
    }

    #[test]
    fn detects_synthetic_beats() {
        let cfg = ClassifierConfig::default();
        let raw = SyntheticEcg::default().generate();
        let filtered = preprocess(&raw, &cfg).expect("preprocess");
        let peaks = detect_peaks(&filtered, &cfg);
        assert_eq!(
            peaks.indices,
            vec![156, 469, 781, 1094, 1406, 1719, 2031, 2344]
        );
    }

    #[test]
    fn peaks_respect_refractory_period() {
        let cfg = ClassifierConfig::default();
        let synth = SyntheticEcg {
            beat_count: 30,
            ..SyntheticEcg::default()
        };
        let filtered = preprocess(&synth.generate(), &cfg).expect("preprocess");
        let peaks = detect_peaks(&filtered, &cfg);
        assert!(peaks.len() >= 20);
        for w in peaks.indices.windows(2) {
            assert!(w[1] - w[0] >= cfg.min_peak_distance());
        }
    }

    #[test]
    fn pure_sine_has_no_qrs_peaks() {
        // A sine never rises 1.5 standard deviations above its mean.
        let cfg = ClassifierConfig::default();
        let raw: Vec<f64> = (0..2500)
            .map(|i| (2.0 * PI * 1.0 * i as f64 / 250.0).sin())
            .collect();
        let filtered = preprocess(&raw, &cfg).expect("preprocess");
        assert!(detect_peaks(&filtered, &cfg).is_empty());
    }
}
