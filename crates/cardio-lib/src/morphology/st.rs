use crate::{
    config::ClassifierConfig,
    dsp::stats::{argmax, mean},
};
use serde::{Deserialize, Serialize};

/// ST/T assessment of a single beat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StFinding {
    pub abnormal: bool,
    /// Mean ST level minus the pre-QRS baseline, in normalized units.
    pub elevation: f64,
    pub t_wave_inverted: bool,
}

/// Measure ST deviation and T-wave polarity relative to the beat's R peak.
///
/// Windows are offsets from R clamped to the last sample. Beats shorter than
/// `cfg.st.min_beat_len`, and beats whose R sits too late to leave an ST
/// window, report a normal finding with zero elevation.
pub fn analyze_st(beat: &[f64], cfg: &ClassifierConfig) -> StFinding {
    let st = &cfg.st;
    if beat.len() < st.min_beat_len {
        return StFinding::default();
    }
    let Some(r) = argmax(beat) else {
        return StFinding::default();
    };
    let last = beat.len() - 1;
    let after_r = |seconds: f64| r.saturating_add(cfg.samples(seconds)).min(last);

    let st_start = after_r(st.st_start_s);
    let st_end = after_r(st.st_end_s);
    if st_end <= st_start {
        return StFinding::default();
    }

    let baseline_start = r.saturating_sub(cfg.samples(st.baseline_start_s));
    let baseline_end = r.saturating_sub(cfg.samples(st.baseline_end_s)).max(1);
    let baseline = if baseline_end <= baseline_start {
        beat[0]
    } else {
        mean(&beat[baseline_start..baseline_end])
    };

    let elevation = mean(&beat[st_start..st_end]) - baseline;

    let t_start = after_r(st.t_start_s);
    let t_end = after_r(st.t_end_s);
    let t_wave_inverted =
        t_end > t_start && mean(&beat[t_start..t_end]) < baseline - st.t_inversion_margin;

    StFinding {
        abnormal: elevation.abs() > st.elevation_threshold || t_wave_inverted,
        elevation,
        t_wave_inverted,
    }
}
