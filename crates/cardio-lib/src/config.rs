use crate::error::ClassifyError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Immutable settings for one classifier instance.
///
/// Every threshold of the rule set lives here so it can be tuned from a TOML
/// file without touching the pipeline. Missing sections fall back to their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Sampling frequency of the incoming signal (Hz).
    pub sampling_rate: u32,
    pub filter: FilterConfig,
    pub peaks: PeakConfig,
    pub beats: BeatConfig,
    pub st: StConfig,
    pub lvh: LvhConfig,
}

/// Butterworth band-pass used to strip baseline drift and high-frequency noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub order: usize,
    pub lowcut_hz: f64,
    pub highcut_hz: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Minimum peak height as a multiple of the filtered signal's std.
    pub height_factor: f64,
    /// Refractory period between accepted peaks (seconds).
    pub min_rr_s: f64,
    /// Fewer peaks than this makes the analysis inconclusive.
    pub min_peaks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatConfig {
    /// Beat window length (seconds); one third sits before the peak.
    pub window_s: f64,
}

/// ST-segment and T-wave rules. Offsets are measured from the beat's R peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StConfig {
    pub min_beat_len: usize,
    pub st_start_s: f64,
    pub st_end_s: f64,
    /// Baseline window starts this long before R.
    pub baseline_start_s: f64,
    /// Baseline window ends this long before R.
    pub baseline_end_s: f64,
    pub t_start_s: f64,
    pub t_end_s: f64,
    /// Absolute ST deviation above which a beat is abnormal.
    pub elevation_threshold: f64,
    /// T wave counts as inverted when its mean sits this far below baseline.
    pub t_inversion_margin: f64,
    /// Fraction of abnormal beats above which the record is ST-T abnormal.
    pub abnormal_ratio: f64,
}

/// Simplified Estes point score for left ventricular hypertrophy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LvhConfig {
    pub min_beat_len: usize,
    /// S wave search span after R (seconds).
    pub s_search_s: f64,
    pub voltage_threshold: f64,
    pub voltage_points: u32,
    pub qrs_duration_s: f64,
    pub qrs_points: u32,
    /// R must exceed this multiple of S to score the axis points.
    pub axis_ratio: f64,
    pub axis_points: u32,
    /// Q onset search span before R (seconds).
    pub q_search_s: f64,
    /// S offset search span after R (seconds).
    pub s_search_end_s: f64,
    pub q_onset_delta: f64,
    pub s_offset_slope: f64,
    pub detection_score: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 250,
            filter: FilterConfig::default(),
            peaks: PeakConfig::default(),
            beats: BeatConfig::default(),
            st: StConfig::default(),
            lvh: LvhConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order: 4,
            lowcut_hz: 0.5,
            highcut_hz: 40.0,
        }
    }
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            height_factor: 1.5,
            min_rr_s: 0.3,
            min_peaks: 3,
        }
    }
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self { window_s: 0.8 }
    }
}

impl Default for StConfig {
    fn default() -> Self {
        Self {
            min_beat_len: 100,
            st_start_s: 0.08,
            st_end_s: 0.2,
            baseline_start_s: 0.1,
            baseline_end_s: 0.02,
            t_start_s: 0.2,
            t_end_s: 0.4,
            elevation_threshold: 0.05,
            t_inversion_margin: 0.1,
            abnormal_ratio: 0.5,
        }
    }
}

impl Default for LvhConfig {
    fn default() -> Self {
        Self {
            min_beat_len: 100,
            s_search_s: 0.1,
            voltage_threshold: 2.0,
            voltage_points: 3,
            qrs_duration_s: 0.09,
            qrs_points: 1,
            axis_ratio: 2.0,
            axis_points: 2,
            q_search_s: 0.08,
            s_search_end_s: 0.12,
            q_onset_delta: 0.1,
            s_offset_slope: 0.05,
            detection_score: 4,
        }
    }
}

impl ClassifierConfig {
    pub fn with_sampling_rate(sampling_rate: u32) -> Self {
        Self {
            sampling_rate,
            ..Self::default()
        }
    }

    pub fn fs(&self) -> f64 {
        self.sampling_rate as f64
    }

    /// Convert a duration to a sample count, truncating toward zero.
    pub fn samples(&self, seconds: f64) -> usize {
        (seconds * self.fs()) as usize
    }

    pub fn beat_len(&self) -> usize {
        self.samples(self.beats.window_s)
    }

    pub fn min_peak_distance(&self) -> usize {
        self.samples(self.peaks.min_rr_s)
    }

    /// Every window length in seconds, keyed by its TOML path.
    fn durations(&self) -> [(&'static str, f64); 12] {
        let (st, lvh) = (&self.st, &self.lvh);
        [
            ("peaks.min_rr_s", self.peaks.min_rr_s),
            ("beats.window_s", self.beats.window_s),
            ("st.st_start_s", st.st_start_s),
            ("st.st_end_s", st.st_end_s),
            ("st.baseline_start_s", st.baseline_start_s),
            ("st.baseline_end_s", st.baseline_end_s),
            ("st.t_start_s", st.t_start_s),
            ("st.t_end_s", st.t_end_s),
            ("lvh.s_search_s", lvh.s_search_s),
            ("lvh.qrs_duration_s", lvh.qrs_duration_s),
            ("lvh.q_search_s", lvh.q_search_s),
            ("lvh.s_search_end_s", lvh.s_search_end_s),
        ]
    }

    fn thresholds(&self) -> [(&'static str, f64); 7] {
        [
            ("peaks.height_factor", self.peaks.height_factor),
            ("st.elevation_threshold", self.st.elevation_threshold),
            ("st.t_inversion_margin", self.st.t_inversion_margin),
            ("lvh.voltage_threshold", self.lvh.voltage_threshold),
            ("lvh.axis_ratio", self.lvh.axis_ratio),
            ("lvh.q_onset_delta", self.lvh.q_onset_delta),
            ("lvh.s_offset_slope", self.lvh.s_offset_slope),
        ]
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        let invalid = |msg: String| Err(ClassifyError::InvalidConfig(msg));
        if self.sampling_rate == 0 {
            return invalid("sampling_rate must be positive".into());
        }
        let nyquist = self.fs() / 2.0;
        let f = &self.filter;
        if f.order == 0 {
            return invalid("filter order must be at least 1".into());
        }
        if !(f.lowcut_hz > 0.0 && f.lowcut_hz < f.highcut_hz && f.highcut_hz < nyquist) {
            return invalid(format!(
                "band {}..{} Hz must satisfy 0 < low < high < {} Hz",
                f.lowcut_hz, f.highcut_hz, nyquist
            ));
        }
        // Window ends are computed as index + samples(s) and must stay addressable.
        let max_seconds = u32::MAX as f64 / self.fs();
        for (key, seconds) in self.durations() {
            if !(seconds.is_finite() && seconds > 0.0 && seconds <= max_seconds) {
                return invalid(format!(
                    "{} = {} must be positive and at most {} s",
                    key, seconds, max_seconds
                ));
            }
        }
        for (key, value) in self.thresholds() {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{} = {} must be positive and finite", key, value));
            }
        }
        if self.beat_len() < 2 {
            return invalid(format!(
                "beat window of {} s is shorter than two samples",
                self.beats.window_s
            ));
        }
        if !(0.0..=1.0).contains(&self.st.abnormal_ratio) {
            return invalid("st.abnormal_ratio must lie in [0, 1]".into());
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: ClassifierConfig = toml::from_str(text).context("parsing classifier config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a TOML configuration file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("in {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing classifier config")
    }
}
