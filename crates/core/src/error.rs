#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Model not loaded")]
    NotReady,

    #[error("Artifact error: {path}: {message}")]
    Artifact { path: String, message: String },

    #[error("Prediction failed: {0}")]
    Inference(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build a [`CoreError::Artifact`] for the artifact at `path`.
    pub fn artifact(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }
}
