pub mod classifier;
pub mod config;
pub mod detectors;
pub mod dsp;
pub mod error;
pub mod io;
pub mod metrics;
pub mod morphology;
pub mod plot;
pub mod signal;
pub mod synth;

pub use classifier::*;
pub use config::ClassifierConfig;
pub use error::ClassifyError;
pub use signal::*;
