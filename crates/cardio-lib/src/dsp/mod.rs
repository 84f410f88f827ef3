//! Numeric building blocks shared by the pipeline stages.

pub mod butterworth;
pub mod peaks;
pub mod stats;

pub use butterworth::ButterworthBandpass;
pub use peaks::find_peaks;
