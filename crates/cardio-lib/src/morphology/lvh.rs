//! Simplified Estes point score on the average beat.
//!
//! Three criteria contribute points: QRS voltage (R or S deeper than the
//! voltage threshold), QRS duration and an R/S ratio used as a stand-in for
//! left axis deviation. The record is flagged once the score reaches
//! `detection_score`.

use crate::{
    config::ClassifierConfig,
    dsp::stats::{argmax, argmin},
    signal::BeatSet,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LvhFinding {
    pub detected: bool,
    pub score: u32,
    pub r_amplitude: f64,
    /// Absolute depth of the S wave.
    pub s_amplitude: f64,
    /// QRS width in samples.
    pub qrs_duration: usize,
}

pub fn analyze_lvh(beats: &BeatSet, cfg: &ClassifierConfig) -> LvhFinding {
    let lvh = &cfg.lvh;
    if beats.is_empty() {
        return LvhFinding::default();
    }
    let avg = beats.average_beat();
    if avg.len() < lvh.min_beat_len {
        return LvhFinding::default();
    }
    let Some(r) = argmax(&avg) else {
        return LvhFinding::default();
    };
    let r_amplitude = avg[r];

    let s_end = r.saturating_add(cfg.samples(lvh.s_search_s)).min(avg.len());
    let s_amplitude = argmin(&avg[r..s_end])
        .map(|i| avg[r + i].abs())
        .unwrap_or(0.0);

    let mut score = 0;
    if r_amplitude > lvh.voltage_threshold || s_amplitude > lvh.voltage_threshold {
        score += lvh.voltage_points;
    }
    let qrs_duration = estimate_qrs_duration(&avg, r, cfg);
    if qrs_duration as f64 > lvh.qrs_duration_s * cfg.fs() {
        score += lvh.qrs_points;
    }
    if r_amplitude > s_amplitude * lvh.axis_ratio {
        score += lvh.axis_points;
    }

    let detected = score >= lvh.detection_score;
    debug!(
        "estes score {} (R {:.3}, S {:.3}, QRS {} samples), lvh {}",
        score, r_amplitude, s_amplitude, qrs_duration, detected
    );
    LvhFinding {
        detected,
        score,
        r_amplitude,
        s_amplitude,
        qrs_duration,
    }
}

/// Samples between QRS onset and the end of the S wave around peak `r`.
///
/// Onset is the latest sample at or before `r` that departs from the value at
/// the start of the search span by more than `q_onset_delta`. The S wave ends
/// at the first sample from `r` onward whose forward difference falls below
/// `s_offset_slope`; without one the span end is used.
pub fn estimate_qrs_duration(beat: &[f64], r: usize, cfg: &ClassifierConfig) -> usize {
    let lvh = &cfg.lvh;
    let q_search_start = r.saturating_sub(cfg.samples(lvh.q_search_s));
    let reference = beat[q_search_start];
    let q_start = (q_search_start + 1..=r)
        .rev()
        .find(|&i| (beat[i] - reference).abs() > lvh.q_onset_delta)
        .unwrap_or(q_search_start);

    let s_search_end = r.saturating_add(cfg.samples(lvh.s_search_end_s)).min(beat.len());
    let s_end = (r..s_search_end)
        .find(|&i| i + 1 < beat.len() && (beat[i + 1] - beat[i]).abs() < lvh.s_offset_slope)
        .unwrap_or(s_search_end);

    s_end.saturating_sub(q_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{detectors, synth::SyntheticEcg};

    fn single(beat: Vec<f64>) -> BeatSet {
        let mut set = BeatSet::new(beat.len());
        set.push(66, beat);
        set
    }

    /// Sharp R of 3 at sample 66 with a shallow S two samples later.
    fn narrow_beat() -> Vec<f64> {
        let mut beat = vec![0.0; 200];
        beat[64] = 1.0;
        beat[65] = 2.0;
        beat[66] = 3.0;
        beat[67] = 0.5;
        beat[68] = -1.0;
        beat
    }

    #[test]
    fn empty_or_short_beats_score_zero() {
        let cfg = ClassifierConfig::default();
        assert_eq!(analyze_lvh(&BeatSet::new(200), &cfg), LvhFinding::default());
        let mut short = BeatSet::new(50);
        short.push(10, vec![5.0; 50]);
        assert_eq!(analyze_lvh(&short, &cfg), LvhFinding::default());
    }

    #[test]
    fn narrow_beat_qrs_duration() {
        let cfg = ClassifierConfig::default();
        // Onset at R itself, flat again from sample 69.
        assert_eq!(estimate_qrs_duration(&narrow_beat(), 66, &cfg), 3);
    }

    #[test]
    fn far_search_ends_are_clamped_to_beat_end() {
        let mut cfg = ClassifierConfig::default();
        cfg.lvh.s_search_s = 1e20;
        cfg.lvh.s_search_end_s = 1e20;
        assert_eq!(estimate_qrs_duration(&narrow_beat(), 66, &cfg), 3);
        let finding = analyze_lvh(&single(narrow_beat()), &cfg);
        assert_eq!(finding.s_amplitude, 1.0);
    }

    #[test]
    fn tall_r_with_shallow_s_scores_voltage_and_axis() {
        let cfg = ClassifierConfig::default();
        let finding = analyze_lvh(&single(narrow_beat()), &cfg);
        assert_eq!(finding.r_amplitude, 3.0);
        assert_eq!(finding.s_amplitude, 1.0);
        assert_eq!(finding.qrs_duration, 3);
        assert_eq!(finding.score, 5);
        assert!(finding.detected);
    }

    #[test]
    fn slow_downstroke_adds_duration_point() {
        let cfg = ClassifierConfig::default();
        let mut beat = vec![0.0; 200];
        for k in 0..=35 {
            beat[66 + k] = 3.0 - 0.1 * k as f64;
        }
        // No flat stretch within 30 samples of R: the span end is used.
        assert_eq!(estimate_qrs_duration(&beat, 66, &cfg), 30);
        let finding = analyze_lvh(&single(beat), &cfg);
        assert_eq!(finding.score, 6);
    }

    #[test]
    fn deep_s_wave_blocks_axis_points() {
        let cfg = ClassifierConfig::default();
        let mut beat = narrow_beat();
        beat[68] = -2.5;
        let finding = analyze_lvh(&single(beat), &cfg);
        assert_eq!(finding.s_amplitude, 2.5);
        assert_eq!(finding.score, 3);
        assert!(!finding.detected);
    }

    #[test]
    fn onset_defaults_to_search_start_when_flat() {
        let cfg = ClassifierConfig::default();
        let beat = vec![0.0; 200];
        // Q scan finds nothing and the very first forward difference is flat.
        assert_eq!(estimate_qrs_duration(&beat, 66, &cfg), 66 - 46);
    }

    fn synthetic_beats(synth: SyntheticEcg) -> BeatSet {
        let cfg = ClassifierConfig::default();
        let filtered = detectors::preprocess(&synth.generate(), &cfg).expect("preprocess");
        let peaks = detectors::detect_peaks(&filtered, &cfg);
        detectors::extract_beats(&filtered, &peaks, &cfg)
    }

    #[test]
    fn biphasic_synthetic_complex_is_not_lvh() {
        let cfg = ClassifierConfig::default();
        let finding = analyze_lvh(&synthetic_beats(SyntheticEcg::default()), &cfg);
        assert_eq!(finding.score, 3);
        assert!(!finding.detected);
    }

    #[test]
    fn monophasic_synthetic_complex_is_lvh() {
        let cfg = ClassifierConfig::default();
        let synth = SyntheticEcg {
            s_amplitude: 0.0,
            ..SyntheticEcg::default()
        };
        let finding = analyze_lvh(&synthetic_beats(synth), &cfg);
        assert_eq!(finding.score, 5);
        assert!(finding.detected);
    }
}
