//! Feature preprocessing: Feature Record to numeric vector.
//!
//! [`ColumnTransformer`] is the on-disk preprocessor: numeric columns are
//! standardized, categorical columns are one-hot encoded against the category
//! lists fitted at training time, and any column listed in neither block is
//! dropped.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::features::{ColumnValue, FeatureRecord, CATEGORICAL_COLUMNS, FEATURE_COLUMNS, NUMERIC_COLUMNS};

/// Converts a Feature Record into the numeric vector a classifier consumes.
pub trait Preprocessor: Send + Sync {
    fn transform(&self, record: &FeatureRecord) -> Result<Vec<f64>, CoreError>;
}

// ---------------------------------------------------------------------------
// Column transformer
// ---------------------------------------------------------------------------

/// What to do with a categorical value not seen during fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Fail the transform.
    #[default]
    Error,
    /// Encode as an all-zero block.
    Ignore,
}

/// A numeric column scaled as `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledColumn {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

/// A categorical column one-hot encoded against fitted categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotColumn {
    pub column: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

/// Fitted column transformer loaded from the preprocessor artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    /// Input columns the transformer was fitted on, in order.
    pub columns: Vec<String>,
    #[serde(default)]
    pub numeric: Vec<ScaledColumn>,
    #[serde(default)]
    pub categorical: Vec<OneHotColumn>,
}

impl ColumnTransformer {
    /// Check the fitted parameters against the Feature Record contract.
    pub fn validate(&self) -> Result<(), String> {
        if self.columns.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
            return Err(format!(
                "column contract mismatch: expected [{}], got [{}]",
                FEATURE_COLUMNS.join(", "),
                self.columns.join(", ")
            ));
        }

        let mut seen = HashSet::new();

        for block in &self.numeric {
            if !NUMERIC_COLUMNS.contains(&block.column.as_str()) {
                return Err(format!("'{}' is not a numeric column", block.column));
            }
            if !seen.insert(block.column.as_str()) {
                return Err(format!("column '{}' is transformed twice", block.column));
            }
            if !block.mean.is_finite() {
                return Err(format!("mean for '{}' is not finite", block.column));
            }
            if !block.scale.is_finite() || block.scale == 0.0 {
                return Err(format!(
                    "scale for '{}' must be finite and non-zero, got {}",
                    block.column, block.scale
                ));
            }
        }

        for block in &self.categorical {
            if !CATEGORICAL_COLUMNS.contains(&block.column.as_str()) {
                return Err(format!("'{}' is not a categorical column", block.column));
            }
            if !seen.insert(block.column.as_str()) {
                return Err(format!("column '{}' is transformed twice", block.column));
            }
            if block.categories.is_empty() {
                return Err(format!("'{}' has no categories", block.column));
            }
            let unique: HashSet<&str> = block.categories.iter().map(String::as_str).collect();
            if unique.len() != block.categories.len() {
                return Err(format!("'{}' has duplicate categories", block.column));
            }
        }

        if self.output_width() == 0 {
            return Err("transformer produces no output columns".to_string());
        }

        Ok(())
    }

    /// Length of the vector produced by [`Preprocessor::transform`].
    pub fn output_width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|block| block.categories.len())
                .sum::<usize>()
    }
}

impl Preprocessor for ColumnTransformer {
    fn transform(&self, record: &FeatureRecord) -> Result<Vec<f64>, CoreError> {
        let mut output = Vec::with_capacity(self.output_width());

        for block in &self.numeric {
            match record.value(&block.column) {
                Some(ColumnValue::Numeric(x)) => output.push((x - block.mean) / block.scale),
                Some(ColumnValue::Categorical(_)) => {
                    return Err(CoreError::Inference(format!(
                        "column '{}' is categorical, expected numeric",
                        block.column
                    )))
                }
                None => return Err(missing_column(&block.column)),
            }
        }

        for block in &self.categorical {
            let value = match record.value(&block.column) {
                Some(ColumnValue::Categorical(v)) => v,
                Some(ColumnValue::Numeric(_)) => {
                    return Err(CoreError::Inference(format!(
                        "column '{}' is numeric, expected categorical",
                        block.column
                    )))
                }
                None => return Err(missing_column(&block.column)),
            };

            let hit = block.categories.iter().position(|c| c == value);
            if hit.is_none() && block.handle_unknown == HandleUnknown::Error {
                return Err(CoreError::Inference(format!(
                    "Found unknown category '{value}' in column '{}' during transform",
                    block.column
                )));
            }
            output.extend((0..block.categories.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        }

        Ok(output)
    }
}

fn missing_column(column: &str) -> CoreError {
    CoreError::Inference(format!("record has no column '{column}'"))
}
