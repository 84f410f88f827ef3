pub mod beats;
pub mod ecg;

pub use beats::extract_beats;
pub use ecg::{detect_peaks, preprocess};
