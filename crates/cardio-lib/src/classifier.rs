//! End-to-end rule-based classification of a single-lead ECG record.
//!
//! The pipeline is: zero-phase band-pass and normalization, QRS peak
//! detection, beat segmentation, per-beat ST/T assessment, an Estes score on
//! the average beat, and a priority decision where LVH outranks ST-T
//! abnormality, which outranks Normal.

use crate::{
    config::ClassifierConfig,
    detectors::{self, ecg::design_bandpass},
    dsp::{butterworth::ButterworthBandpass, stats::mean},
    error::ClassifyError,
    metrics::{rhythm_summary, RhythmSummary},
    morphology::{self, LvhFinding, StFinding},
    signal::{BeatSet, PeakSet, RRSeries},
};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassLabel {
    Normal,
    StTAbnormality,
    LeftVentricularHypertrophy,
}

impl ClassLabel {
    /// Numeric class code: 0 normal, 1 ST-T abnormality, 2 LVH.
    pub fn code(self) -> u8 {
        match self {
            ClassLabel::Normal => 0,
            ClassLabel::StTAbnormality => 1,
            ClassLabel::LeftVentricularHypertrophy => 2,
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassLabel::Normal => "Normal",
            ClassLabel::StTAbnormality => "ST-T abnormality",
            ClassLabel::LeftVentricularHypertrophy => "Left ventricular hypertrophy",
        };
        f.write_str(name)
    }
}

/// Why a record could not be analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconclusiveReason {
    InsufficientQrs,
    NoValidBeats,
}

impl fmt::Display for InconclusiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InconclusiveReason::InsufficientQrs => {
                f.write_str("Insufficient QRS complexes detected")
            }
            InconclusiveReason::NoValidBeats => f.write_str("No valid beats extracted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetail {
    pub num_beats: usize,
    pub st_abnormal_count: usize,
    /// Abnormal beats over analysed beats, in `[0, 1]`.
    pub st_abnormal_ratio: f64,
    pub avg_st_elevation: f64,
    pub lvh_detected: bool,
    pub estes_score: u32,
    /// Peaks per minute over the whole record.
    pub heart_rate: f64,
    pub st_elevations: Vec<f64>,
    pub lvh: LvhFinding,
    pub rhythm: RhythmSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Analysis {
    Complete(AnalysisDetail),
    /// Too little usable signal; the label falls back to `Normal`.
    Inconclusive {
        reason: InconclusiveReason,
        /// Human-readable form of `reason`.
        message: String,
        peak_count: usize,
    },
}

impl Analysis {
    pub fn detail(&self) -> Option<&AnalysisDetail> {
        match self {
            Analysis::Complete(detail) => Some(detail),
            Analysis::Inconclusive { .. } => None,
        }
    }

    pub fn is_inconclusive(&self) -> bool {
        matches!(self, Analysis::Inconclusive { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: ClassLabel,
    pub code: u8,
    pub analysis: Analysis,
}

impl Classification {
    fn new(label: ClassLabel, analysis: Analysis) -> Self {
        Self {
            label,
            code: label.code(),
            analysis,
        }
    }

    fn inconclusive(reason: InconclusiveReason, peak_count: usize) -> Self {
        warn!("classification inconclusive: {} ({} peaks)", reason, peak_count);
        Self::new(
            ClassLabel::Normal,
            Analysis::Inconclusive {
                reason,
                message: reason.to_string(),
                peak_count,
            },
        )
    }
}

/// Stateless classifier; the filter is designed once and shared by every call.
#[derive(Debug, Clone)]
pub struct EcgClassifier {
    cfg: ClassifierConfig,
    filter: ButterworthBandpass,
}

impl EcgClassifier {
    pub fn new(cfg: ClassifierConfig) -> Result<Self, ClassifyError> {
        cfg.validate()?;
        let filter = design_bandpass(&cfg)?;
        Ok(Self { cfg, filter })
    }

    pub fn with_sampling_rate(sampling_rate: u32) -> Result<Self, ClassifyError> {
        Self::new(ClassifierConfig::with_sampling_rate(sampling_rate))
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    pub fn preprocess(&self, raw: &[f64]) -> Result<Vec<f64>, ClassifyError> {
        detectors::ecg::preprocess_with(&self.filter, raw)
    }

    pub fn detect_peaks(&self, filtered: &[f64]) -> PeakSet {
        detectors::detect_peaks(filtered, &self.cfg)
    }

    pub fn extract_beats(&self, filtered: &[f64], peaks: &PeakSet) -> BeatSet {
        detectors::extract_beats(filtered, peaks, &self.cfg)
    }

    pub fn analyze_st(&self, beat: &[f64]) -> StFinding {
        morphology::analyze_st(beat, &self.cfg)
    }

    pub fn analyze_lvh(&self, beats: &BeatSet) -> LvhFinding {
        morphology::analyze_lvh(beats, &self.cfg)
    }

    pub fn classify(&self, raw: &[f64]) -> Result<Classification, ClassifyError> {
        let filtered = self.preprocess(raw)?;
        let peaks = self.detect_peaks(&filtered);
        if peaks.len() < self.cfg.peaks.min_peaks {
            return Ok(Classification::inconclusive(
                InconclusiveReason::InsufficientQrs,
                peaks.len(),
            ));
        }

        let beats = self.extract_beats(&filtered, &peaks);
        if beats.is_empty() {
            return Ok(Classification::inconclusive(
                InconclusiveReason::NoValidBeats,
                peaks.len(),
            ));
        }

        let mut st_abnormal_count = 0;
        let mut st_elevations = Vec::with_capacity(beats.len());
        for (peak, beat) in beats.peaks.iter().zip(beats.iter()) {
            let finding = self.analyze_st(beat);
            trace!(
                "beat at {}: st elevation {:.4}, t inverted {}, abnormal {}",
                peak,
                finding.elevation,
                finding.t_wave_inverted,
                finding.abnormal
            );
            if finding.abnormal {
                st_abnormal_count += 1;
            }
            st_elevations.push(finding.elevation);
        }

        let lvh = self.analyze_lvh(&beats);
        let st_abnormal_ratio = st_abnormal_count as f64 / beats.len() as f64;
        let label = if lvh.detected {
            ClassLabel::LeftVentricularHypertrophy
        } else if st_abnormal_ratio > self.cfg.st.abnormal_ratio {
            ClassLabel::StTAbnormality
        } else {
            ClassLabel::Normal
        };

        let duration_s = raw.len() as f64 / self.cfg.fs();
        let detail = AnalysisDetail {
            num_beats: beats.len(),
            st_abnormal_count,
            st_abnormal_ratio,
            avg_st_elevation: mean(&st_elevations),
            lvh_detected: lvh.detected,
            estes_score: lvh.score,
            heart_rate: peaks.len() as f64 * 60.0 / duration_s,
            st_elevations,
            lvh,
            rhythm: rhythm_summary(&RRSeries::from_peaks(&peaks, self.cfg.fs())),
        };
        debug!(
            "classified {} beats as {} (st ratio {:.2}, estes {})",
            detail.num_beats, label, detail.st_abnormal_ratio, detail.estes_score
        );
        Ok(Classification::new(label, Analysis::Complete(detail)))
    }
}
