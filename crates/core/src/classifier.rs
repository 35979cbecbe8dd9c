//! Probabilistic binary classifiers.
//!
//! [`ClassifierModel`] is the on-disk classifier, tagged by `kind`. Both
//! variants return a `[p(ok), p(failure)]` pair.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Per-class probabilities for one row: `[ok, failure]`.
pub type ClassProbabilities = [f64; 2];

/// Scores a preprocessed feature vector.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, CoreError>;
}

// ---------------------------------------------------------------------------
// Artifact model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl ClassifierModel {
    /// Number of features the model expects.
    pub fn n_features(&self) -> usize {
        match self {
            Self::LogisticRegression(m) => m.coefficients.len(),
            Self::RandomForest(m) => m.n_features,
        }
    }

    /// Check the fitted parameters are internally consistent.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::LogisticRegression(m) => m.validate(),
            Self::RandomForest(m) => m.validate(),
        }
    }
}

impl Classifier for ClassifierModel {
    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, CoreError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(CoreError::Inference(format!(
                "X has {} features, but the classifier is expecting {expected} features as input",
                features.len()
            )));
        }
        let p = match self {
            Self::LogisticRegression(m) => m.failure_probability(features),
            Self::RandomForest(m) => m.failure_probability(features),
        };
        Ok([1.0 - p, p])
    }
}

// ---------------------------------------------------------------------------
// Logistic regression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("logistic regression has no coefficients".to_string());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err("logistic regression has non-finite parameters".to_string());
        }
        Ok(())
    }

    fn failure_probability(&self, features: &[f64]) -> f64 {
        let z: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        sigmoid(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

// ---------------------------------------------------------------------------
// Random forest
// ---------------------------------------------------------------------------

/// A node of a fitted decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Weighted class counts `[ok, failure]` of the training samples here.
    Leaf { value: ClassProbabilities },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Flat node array; node 0 is the root.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(format!("node {i} splits on feature {feature} of {n_features}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    // Children must come after their parent, which also rules out cycles.
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child index {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
                        return Err(format!("leaf {i} has invalid class weights"));
                    }
                }
            }
        }
        Ok(())
    }

    fn failure_probability(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => index = if features[feature] <= threshold { left } else { right },
                TreeNode::Leaf { value } => return value[1] / (value[0] + value[1]),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("random forest expects zero features".to_string());
        }
        if self.trees.is_empty() {
            return Err("random forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    fn failure_probability(&self, features: &[f64]) -> f64 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.failure_probability(features))
            .sum();
        sum / self.trees.len() as f64
    }
}
