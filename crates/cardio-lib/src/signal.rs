use serde::{Deserialize, Serialize};

/// Uniformly sampled ECG lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Sampling frequency in Hz
    pub fs: f64,
    /// Samples
    pub data: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.fs
    }
}

/// Detected QRS peaks as strictly increasing sample indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakSet {
    pub indices: Vec<usize>,
}

impl PeakSet {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Fixed-length beat windows cut around accepted peaks.
///
/// `peaks[i]` is the sample index in the filtered signal that `beats[i]`
/// was centred on. Every row has exactly `window_len` samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeatSet {
    pub window_len: usize,
    pub peaks: Vec<usize>,
    pub beats: Vec<Vec<f64>>,
}

impl BeatSet {
    pub fn new(window_len: usize) -> Self {
        Self {
            window_len,
            peaks: Vec::new(),
            beats: Vec::new(),
        }
    }

    pub fn push(&mut self, peak: usize, beat: Vec<f64>) {
        debug_assert_eq!(beat.len(), self.window_len);
        self.peaks.push(peak);
        self.beats.push(beat);
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.beats.iter().map(Vec::as_slice)
    }

    /// Sample-wise mean across all beats. Empty when there are no beats.
    pub fn average_beat(&self) -> Vec<f64> {
        if self.beats.is_empty() {
            return Vec::new();
        }
        let mut avg = vec![0.0; self.window_len];
        for beat in &self.beats {
            for (acc, &v) in avg.iter_mut().zip(beat) {
                *acc += v;
            }
        }
        let n = self.beats.len() as f64;
        avg.iter_mut().for_each(|v| *v /= n);
        avg
    }
}

/// RR intervals (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RRSeries {
    pub rr: Vec<f64>,
}

impl RRSeries {
    pub fn from_peaks(peaks: &PeakSet, fs: f64) -> Self {
        let rr = peaks
            .indices
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64 / fs)
            .collect();
        Self { rr }
    }
}
