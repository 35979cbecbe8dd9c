//! Loading the classifier and preprocessor artifacts from disk.
//!
//! Both artifacts are JSON documents with a top-level `format_version`.
//! Loading is all-or-nothing: either both parse, validate, and agree on the
//! feature width, or an error is returned and nothing is kept.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::classifier::ClassifierModel;
use crate::error::CoreError;
use crate::preprocessing::ColumnTransformer;

/// The only artifact format version this build understands.
pub const ARTIFACT_FORMAT_VERSION: u64 = 1;

/// A validated classifier and preprocessor pair.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub classifier: ClassifierModel,
    pub preprocessor: ColumnTransformer,
}

/// Read, validate, and cross-check both artifacts.
///
/// Errors are logged before being returned; callers at startup treat them as
/// fatal.
pub async fn load(
    model_path: impl AsRef<Path>,
    preprocessor_path: impl AsRef<Path>,
) -> Result<ModelArtifacts, CoreError> {
    let model_path = model_path.as_ref();
    let preprocessor_path = preprocessor_path.as_ref();

    let result = load_inner(model_path, preprocessor_path).await;
    match &result {
        Ok(artifacts) => tracing::info!(
            model_features = artifacts.classifier.n_features(),
            "Model and preprocessor loaded successfully"
        ),
        Err(e) => tracing::error!(error = %e, "Error loading model or preprocessor"),
    }
    result
}

async fn load_inner(
    model_path: &Path,
    preprocessor_path: &Path,
) -> Result<ModelArtifacts, CoreError> {
    tracing::info!(path = %model_path.display(), "Loading model");
    let classifier: ClassifierModel = read_artifact(model_path).await?;
    classifier
        .validate()
        .map_err(|e| CoreError::artifact(model_path, e))?;

    tracing::info!(path = %preprocessor_path.display(), "Loading preprocessor");
    let preprocessor: ColumnTransformer = read_artifact(preprocessor_path).await?;
    preprocessor
        .validate()
        .map_err(|e| CoreError::artifact(preprocessor_path, e))?;

    let produced = preprocessor.output_width();
    let expected = classifier.n_features();
    if produced != expected {
        return Err(CoreError::artifact(
            model_path,
            format!("classifier expects {expected} features but the preprocessor produces {produced}"),
        ));
    }

    Ok(ModelArtifacts {
        classifier,
        preprocessor,
    })
}

async fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CoreError::artifact(path, format!("failed to read file: {e}")))?;
    parse_artifact(path, &bytes)
}

/// Parse one artifact document, checking its format version.
pub fn parse_artifact<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, CoreError> {
    let mut value: Value = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::artifact(path, format!("malformed JSON: {e}")))?;

    let version = value
        .as_object_mut()
        .ok_or_else(|| CoreError::artifact(path, "artifact must be a JSON object"))?
        .remove("format_version");

    match version.as_ref().and_then(Value::as_u64) {
        Some(ARTIFACT_FORMAT_VERSION) => {}
        Some(other) => {
            return Err(CoreError::artifact(
                path,
                format!("unsupported format_version {other}, expected {ARTIFACT_FORMAT_VERSION}"),
            ))
        }
        None => return Err(CoreError::artifact(path, "missing or invalid format_version")),
    }

    serde_json::from_value(value)
        .map_err(|e| CoreError::artifact(path, format!("invalid artifact: {e}")))
}
