use crate::signal::RRSeries;
use serde::{Deserialize, Serialize};

/// Time-domain summary of the RR intervals between detected peaks.
///
/// All durations are in seconds. With fewer than two intervals the spread
/// statistics are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RhythmSummary {
    pub rr_count: usize,
    pub mean_rr_s: f64,
    /// Sample standard deviation of the intervals.
    pub sdnn_s: f64,
    pub rmssd_s: f64,
    /// Fraction of successive differences longer than 50 ms.
    pub pnn50: f64,
}

pub fn rhythm_summary(rr: &RRSeries) -> RhythmSummary {
    let n = rr.rr.len();
    let mean_rr_s = if n > 0 {
        rr.rr.iter().sum::<f64>() / n as f64
    } else {
        0.0
    };
    if n < 2 {
        return RhythmSummary {
            rr_count: n,
            mean_rr_s,
            ..RhythmSummary::default()
        };
    }

    let sdnn_s = (rr.rr.iter().map(|x| (x - mean_rr_s).powi(2)).sum::<f64>()
        / (n as f64 - 1.0))
        .sqrt();
    let diffs: Vec<f64> = rr.rr.windows(2).map(|w| w[1] - w[0]).collect();
    let rmssd_s = (diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64).sqrt();
    let pnn50 = diffs.iter().filter(|d| d.abs() > 0.050).count() as f64 / diffs.len() as f64;

    RhythmSummary {
        rr_count: n,
        mean_rr_s,
        sdnn_s,
        rmssd_s,
        pnn50,
    }
}

impl RhythmSummary {
    /// Mean heart rate implied by the RR intervals (beats per minute).
    pub fn mean_hr_bpm(&self) -> f64 {
        if self.mean_rr_s > 0.0 {
            60.0 / self.mean_rr_s
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::PeakSet;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "{} vs {} (tol {})", a, b, tol);
    }

    #[test]
    fn regular_rhythm_has_no_variability() {
        let peaks = PeakSet::from_indices(vec![0, 250, 500, 750, 1000]);
        let summary = rhythm_summary(&RRSeries::from_peaks(&peaks, 250.0));
        assert_eq!(summary.rr_count, 4);
        assert_eq!(summary.mean_rr_s, 1.0);
        assert_eq!(summary.sdnn_s, 0.0);
        assert_eq!(summary.rmssd_s, 0.0);
        assert_eq!(summary.pnn50, 0.0);
        assert_eq!(summary.mean_hr_bpm(), 60.0);
    }

    #[test]
    fn irregular_rhythm_statistics() {
        let rr = RRSeries {
            rr: vec![0.8, 0.9, 0.8, 1.0],
        };
        let summary = rhythm_summary(&rr);
        assert_close(summary.mean_rr_s, 0.875, 1e-12);
        // Deviations -0.075, 0.025, -0.075, 0.125 over n - 1.
        assert_close(summary.sdnn_s, (0.0275_f64 / 3.0).sqrt(), 1e-12);
        // Successive differences 0.1, -0.1, 0.2.
        assert_close(summary.rmssd_s, (0.06_f64 / 3.0).sqrt(), 1e-12);
        assert_close(summary.pnn50, 1.0, 1e-12);
    }

    #[test]
    fn too_few_intervals() {
        let summary = rhythm_summary(&RRSeries { rr: vec![0.9] });
        assert_eq!(summary.rr_count, 1);
        assert_eq!(summary.mean_rr_s, 0.9);
        assert_eq!(summary.sdnn_s, 0.0);
        let empty = rhythm_summary(&RRSeries { rr: vec![] });
        assert_eq!(empty, RhythmSummary::default());
        assert_eq!(empty.mean_hr_bpm(), 0.0);
    }
}
