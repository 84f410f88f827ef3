use thiserror::Error;

/// Structural failures of a classification call.
///
/// Inconclusive analyses (too few peaks, no usable beats) are not errors;
/// they come back as a `Normal` classification with an inconclusive detail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("signal has zero variance after filtering and cannot be normalized")]
    DegenerateSignal,
    #[error("signal has {len} samples but at least {min} are required")]
    SignalTooShort { len: usize, min: usize },
    #[error("sample {index} is not a finite number")]
    NonFiniteSample { index: usize },
    #[error("invalid classifier configuration: {0}")]
    InvalidConfig(String),
}

impl ClassifyError {
    /// True when the caller supplied an unusable signal, false for faults on our side.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, ClassifyError::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_distinguished_from_config_faults() {
        assert!(ClassifyError::DegenerateSignal.is_input_error());
        assert!(ClassifyError::SignalTooShort { len: 3, min: 28 }.is_input_error());
        assert!(ClassifyError::NonFiniteSample { index: 0 }.is_input_error());
        assert!(!ClassifyError::InvalidConfig("order".into()).is_input_error());
    }
}
