//! JSON envelope for handing a record to the classifier from another process.

use crate::{
    classifier::{Classification, EcgClassifier},
    config::ClassifierConfig,
    error::ClassifyError,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_sampling_rate() -> u32 {
    250
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub signal: Vec<f64>,
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: u32,
}

impl ClassifyRequest {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing classify request")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Classify with `base` thresholds at the request's sampling rate.
    pub fn run(&self, base: &ClassifierConfig) -> ClassifyResponse {
        let cfg = ClassifierConfig {
            sampling_rate: self.sampling_rate,
            ..base.clone()
        };
        let result = EcgClassifier::new(cfg).and_then(|c| c.classify(&self.signal));
        ClassifyResponse::from_result(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadInput,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassifyResponse {
    Success(Classification),
    Failure { error: String, kind: ErrorKind },
}

impl ClassifyResponse {
    pub fn from_result(result: Result<Classification, ClassifyError>) -> Self {
        match result {
            Ok(classification) => ClassifyResponse::Success(classification),
            Err(err) => ClassifyResponse::Failure {
                kind: if err.is_input_error() {
                    ErrorKind::BadInput
                } else {
                    ErrorKind::Internal
                },
                error: err.to_string(),
            },
        }
    }

    /// HTTP-style status: inconclusive analyses are still successes.
    pub fn status_code(&self) -> u16 {
        match self {
            ClassifyResponse::Success(_) => 200,
            ClassifyResponse::Failure {
                kind: ErrorKind::BadInput,
                ..
            } => 400,
            ClassifyResponse::Failure {
                kind: ErrorKind::Internal,
                ..
            } => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ClassifyResponse::Success(_))
    }
}
