//! Deterministic synthetic ECG traces for demos and tests.
//!
//! Each beat is a narrow Gaussian R wave followed by a negative Gaussian S
//! wave, laid over a slow sinusoidal baseline wander that the band-pass
//! removes. An optional constant offset can be injected over every beat's ST
//! segment to mimic ischemic elevation or depression.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticEcg {
    pub sampling_rate: u32,
    pub duration_s: f64,
    /// Beats are evenly spaced, the first half a spacing into the record.
    pub beat_count: usize,
    pub r_amplitude: f64,
    pub s_amplitude: f64,
    /// S wave centre relative to R (seconds).
    pub s_delay_s: f64,
    /// Gaussian sigma of the R and S waves (seconds).
    pub qrs_width_s: f64,
    pub wander_amplitude: f64,
    pub wander_hz: f64,
    /// Offset added over `[R + st_start_s, R + st_end_s)` of every beat.
    pub st_offset: f64,
    pub st_start_s: f64,
    pub st_end_s: f64,
    /// Half-width of uniform noise; zero disables noise.
    pub noise_amplitude: f64,
    pub seed: u64,
}

impl Default for SyntheticEcg {
    fn default() -> Self {
        Self {
            sampling_rate: 250,
            duration_s: 10.0,
            beat_count: 8,
            r_amplitude: 3.0,
            s_amplitude: 2.0,
            s_delay_s: 0.02,
            qrs_width_s: 0.008,
            wander_amplitude: 0.5,
            wander_hz: 0.15,
            st_offset: 0.0,
            st_start_s: 0.08,
            st_end_s: 0.2,
            noise_amplitude: 0.0,
            seed: 0,
        }
    }
}

impl SyntheticEcg {
    /// R wave centres in seconds.
    pub fn beat_times(&self) -> Vec<f64> {
        if self.beat_count == 0 {
            return Vec::new();
        }
        let spacing = self.duration_s / self.beat_count as f64;
        (0..self.beat_count)
            .map(|k| spacing * (k as f64 + 0.5))
            .collect()
    }

    pub fn generate(&self) -> Vec<f64> {
        let fs = self.sampling_rate as f64;
        let n = (self.duration_s * fs) as usize;
        let centers = self.beat_times();
        let gauss = |t: f64, c: f64| (-0.5 * ((t - c) / self.qrs_width_s).powi(2)).exp();
        let mut rng = StdRng::seed_from_u64(self.seed);

        (0..n)
            .map(|i| {
                let t = i as f64 / fs;
                let mut v = self.wander_amplitude * (2.0 * PI * self.wander_hz * t).sin();
                for &c in &centers {
                    v += self.r_amplitude * gauss(t, c);
                    v -= self.s_amplitude * gauss(t, c + self.s_delay_s);
                    if self.st_offset != 0.0 && c + self.st_start_s <= t && t < c + self.st_end_s {
                        v += self.st_offset;
                    }
                }
                if self.noise_amplitude > 0.0 {
                    v += rng.gen_range(-self.noise_amplitude..=self.noise_amplitude);
                }
                v
            })
            .collect()
    }
}
