//! Per-beat waveform morphology: ST/T deviation and the LVH voltage score.

pub mod lvh;
pub mod st;

pub use lvh::{analyze_lvh, estimate_qrs_duration, LvhFinding};
pub use st::{analyze_st, StFinding};
