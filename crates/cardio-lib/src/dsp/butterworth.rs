//! Butterworth band-pass design and zero-phase filtering on top of `sci-rs`.
//!
//! The filter is kept as second-order sections and run forward and backward
//! with `sosfiltfilt_dyn`, which pads each end with an odd extension and
//! starts from the steady state of the first sample.

use crate::error::ClassifyError;
use sci_rs::signal::filter::{
    design::{butter_dyn, DigitalFilter, FilterBandType, FilterOutputType, Sos, SosFormatFilter},
    sosfiltfilt_dyn,
};

/// Digital Butterworth band-pass filter as a cascade of biquads.
#[derive(Debug, Clone)]
pub struct ButterworthBandpass {
    sections: Vec<Sos<f64>>,
}

impl ButterworthBandpass {
    /// Design an `order`-th order band-pass (2 * order poles) for `[low_hz, high_hz]`.
    pub fn design(order: usize, low_hz: f64, high_hz: f64, fs: f64) -> Result<Self, ClassifyError> {
        let nyquist = fs / 2.0;
        if order == 0 || !(low_hz > 0.0 && low_hz < high_hz && high_hz < nyquist) {
            return Err(ClassifyError::InvalidConfig(format!(
                "band-pass [{}, {}] Hz of order {} is not realizable at {} Hz",
                low_hz, high_hz, order, fs
            )));
        }
        let filter = butter_dyn(
            order,
            vec![low_hz, high_hz],
            Some(FilterBandType::Bandpass),
            Some(false),
            Some(FilterOutputType::Sos),
            Some(fs),
        );
        let DigitalFilter::Sos(SosFormatFilter { sos }) = filter else {
            return Err(ClassifyError::InvalidConfig(
                "butterworth design did not return second-order sections".into(),
            ));
        };
        Ok(Self { sections: sos })
    }

    /// Samples of odd extension added at each end by `filtfilt`.
    pub fn pad_len(&self) -> usize {
        let zero_b2 = self.sections.iter().filter(|s| s.b[2] == 0.0).count();
        let zero_a2 = self.sections.iter().filter(|s| s.a[2] == 0.0).count();
        3 * (2 * self.sections.len() + 1 - zero_b2.min(zero_a2))
    }

    /// Forward-backward filtering through the cascade.
    ///
    /// Requires more samples than [`pad_len`](Self::pad_len); shorter inputs
    /// return `SignalTooShort`.
    pub fn filtfilt(&self, data: &[f64]) -> Result<Vec<f64>, ClassifyError> {
        let edge = self.pad_len();
        if data.len() <= edge {
            return Err(ClassifyError::SignalTooShort {
                len: data.len(),
                min: edge + 1,
            });
        }
        Ok(sosfiltfilt_dyn(data.iter(), &self.sections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    fn ecg_band(fs: f64) -> ButterworthBandpass {
        ButterworthBandpass::design(4, 0.5, 40.0, fs).expect("design")
    }

    /// |H(e^jw)| of the whole cascade.
    fn magnitude(sections: &[Sos<f64>], freq_hz: f64, fs: f64) -> f64 {
        let w = 2.0 * PI * freq_hz / fs;
        let eval = |c: &[f64; 3]| {
            let re = c[0] + c[1] * w.cos() + c[2] * (2.0 * w).cos();
            let im = -c[1] * w.sin() - c[2] * (2.0 * w).sin();
            re.hypot(im)
        };
        sections.iter().map(|s| eval(&s.b) / eval(&s.a)).product()
    }

    #[test]
    fn band_edges_sit_at_half_power() {
        let fs = 250.0;
        let filter = ecg_band(fs);
        let sos = &filter.sections;
        assert_eq!(sos.len(), 4);
        assert!((magnitude(sos, 0.5, fs) - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((magnitude(sos, 40.0, fs) - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((magnitude(sos, 10.0, fs) - 1.0).abs() < 1e-4);
        assert!(magnitude(sos, 0.01, fs) < 1e-5);
        assert!(magnitude(sos, 124.0, fs) < 1e-5);
    }

    #[test]
    fn sections_are_stable() {
        for fs in [125.0, 250.0, 360.0, 1000.0] {
            for s in &ecg_band(fs).sections {
                let (a1, a2) = (s.a[1] / s.a[0], s.a[2] / s.a[0]);
                // Both roots of z^2 + a1 z + a2 inside the unit circle.
                assert!(a2.abs() < 1.0, "a2 {} at fs {}", a2, fs);
                assert!(a1.abs() < 1.0 + a2, "a1 {} at fs {}", a1, fs);
            }
        }
    }

    #[test]
    fn odd_order_design_has_one_section_per_order() {
        let filter = ButterworthBandpass::design(3, 1.0, 30.0, 250.0).expect("design");
        assert_eq!(filter.sections.len(), 3);
        assert!((magnitude(&filter.sections, 1.0, 250.0) - FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn rejects_band_outside_nyquist() {
        assert!(ButterworthBandpass::design(4, 0.5, 40.0, 60.0).is_err());
        assert!(ButterworthBandpass::design(0, 0.5, 40.0, 250.0).is_err());
        assert!(ButterworthBandpass::design(4, 40.0, 0.5, 250.0).is_err());
    }

    #[test]
    fn filtfilt_removes_dc() {
        let filter = ecg_band(250.0);
        let out = filter.filtfilt(&[5.0; 300]).expect("filter");
        assert_eq!(out.len(), 300);
        assert!(out.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn filtfilt_passes_in_band_sine_without_phase_shift() {
        let fs = 250.0;
        let filter = ecg_band(fs);
        let data: Vec<f64> = (0..5000)
            .map(|i| (2.0 * PI * 5.0 * i as f64 / fs).sin())
            .collect();
        let out = filter.filtfilt(&data).expect("filter");
        // Away from the edges the output tracks the input sample for sample.
        for i in 1500..3500 {
            assert!((out[i] - data[i]).abs() < 1e-3, "sample {}", i);
        }
    }

    #[test]
    fn filtfilt_requires_more_than_pad_len() {
        let filter = ecg_band(250.0);
        assert_eq!(filter.pad_len(), 27);
        let err = filter.filtfilt(&[1.0; 27]).unwrap_err();
        assert_eq!(err, ClassifyError::SignalTooShort { len: 27, min: 28 });
        assert!(filter.filtfilt(&[1.0; 28]).is_ok());
    }
}
