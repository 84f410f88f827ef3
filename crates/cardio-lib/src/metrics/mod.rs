pub mod rhythm;

pub use rhythm::{rhythm_summary, RhythmSummary};
