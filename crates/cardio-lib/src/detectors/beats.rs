use crate::{
    config::ClassifierConfig,
    signal::{BeatSet, PeakSet},
};
use log::debug;

/// Cut one fixed-length window per peak, a third before and two thirds after it.
///
/// Windows are clamped to the signal; a clamped window shorter than half the
/// beat length is skipped. Accepted windows are zero-padded on the right to
/// exactly `cfg.beat_len()` samples.
pub fn extract_beats(filtered: &[f64], peaks: &PeakSet, cfg: &ClassifierConfig) -> BeatSet {
    let beat_len = cfg.beat_len();
    let before = beat_len / 3;
    let after = beat_len.saturating_mul(2) / 3;
    let mut set = BeatSet::new(beat_len);

    for &peak in &peaks.indices {
        let start = peak.saturating_sub(before);
        let end = peak.saturating_add(after).min(filtered.len());
        if end <= start || end - start < beat_len / 2 {
            continue;
        }
        let mut beat = filtered[start..end].to_vec();
        beat.truncate(beat_len);
        beat.resize(beat_len, 0.0);
        set.push(peak, beat);
    }

    debug!(
        "extracted {} of {} beats ({} samples each)",
        set.len(),
        peaks.len(),
        beat_len
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn interior_peak_yields_full_window() {
        let cfg = ClassifierConfig::default();
        let signal = ramp(1000);
        let beats = extract_beats(&signal, &PeakSet::from_indices(vec![500]), &cfg);
        assert_eq!(beats.len(), 1);
        let beat = &beats.beats[0];
        assert_eq!(beat.len(), 200);
        // 200 / 3 = 66 samples before the peak.
        assert_eq!(beat[0], 434.0);
        assert_eq!(beat[66], 500.0);
        // Window ends 2 * 200 / 3 = 133 samples after the peak.
        assert_eq!(beat[198], 632.0);
        assert_eq!(beat[199], 0.0);
    }

    #[test]
    fn peak_near_start_is_clamped_and_padded() {
        let cfg = ClassifierConfig::default();
        let signal = ramp(1000);
        let beats = extract_beats(&signal, &PeakSet::from_indices(vec![10]), &cfg);
        assert_eq!(beats.len(), 1);
        let beat = &beats.beats[0];
        assert_eq!(beat.len(), 200);
        assert_eq!(beat[0], 0.0);
        assert_eq!(beat[142], 142.0);
        assert!(beat[143..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn peak_too_close_to_end_is_dropped() {
        let cfg = ClassifierConfig::default();
        let signal = ramp(1000);
        // 66 + 10 = 76 samples survive the clamp, fewer than half a beat.
        let peaks = PeakSet::from_indices(vec![300, 990, 600]);
        let beats = extract_beats(&signal, &peaks, &cfg);
        assert_eq!(beats.peaks, vec![300, 600]);
    }

    #[test]
    fn window_longer_than_signal_is_skipped() {
        let mut cfg = ClassifierConfig::default();
        cfg.beats.window_s = 1e20;
        let beats = extract_beats(&ramp(1000), &PeakSet::from_indices(vec![500]), &cfg);
        assert!(beats.is_empty());
    }

    #[test]
    fn every_beat_has_window_length() {
        for fs in [125, 250, 360, 500] {
            let cfg = ClassifierConfig::with_sampling_rate(fs);
            let signal = ramp(fs as usize * 4);
            let peaks: Vec<usize> = (0..signal.len()).step_by(fs as usize / 3).collect();
            let beats = extract_beats(&signal, &PeakSet::from_indices(peaks), &cfg);
            assert!(!beats.is_empty());
            assert!(beats.iter().all(|b| b.len() == cfg.beat_len()));
            assert_eq!(cfg.beat_len(), (0.8 * fs as f64) as usize);
        }
    }
}
