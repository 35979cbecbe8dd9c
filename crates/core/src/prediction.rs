//! Prediction result and the decision threshold.

use serde::Serialize;

use crate::error::CoreError;

/// Failure probability strictly above which maintenance is recommended.
pub const DECISION_THRESHOLD: f64 = 0.7;

/// Index of the "failure" class in a classifier's `[ok, failure]` output.
pub const FAILURE_CLASS_INDEX: usize = 1;

/// Outcome of one prediction.
///
/// `prediction` and `maintenance_recommended` always carry the same value;
/// both are kept because existing clients read either field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: bool,
    pub probability: f64,
    pub maintenance_recommended: bool,
}

impl PredictionResult {
    /// Apply [`DECISION_THRESHOLD`] to a failure probability.
    ///
    /// Returns `CoreError::Inference` if the probability is outside `[0, 1]`.
    pub fn from_probability(probability: f64) -> Result<Self, CoreError> {
        validate_unit_range(probability, "failure probability")?;
        let positive = probability > DECISION_THRESHOLD;
        Ok(Self {
            prediction: positive,
            probability,
            maintenance_recommended: positive,
        })
    }
}

/// Validate that a value falls within `[0.0, 1.0]`.
///
/// NaN is rejected.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Inference(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}
