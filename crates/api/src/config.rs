use std::path::PathBuf;

use predmaint_core::features::{CategoricalDefaults, DEFAULT_EQUIPMENT_TYPE, DEFAULT_PRODUCT_ID};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults matching a local checkout with the artifacts in
/// the working directory.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Path to the classifier artifact.
    pub model_path: PathBuf,
    /// Path to the preprocessor artifact.
    pub preprocessor_path: PathBuf,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Categorical values written into every Feature Record.
    pub categorical_defaults: CategoricalDefaults,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `5000`                   |
    /// | `MODEL_PATH`             | `best_model.json`        |
    /// | `PREPROCESSOR_PATH`      | `preprocessor.json`      |
    /// | `CORS_ORIGINS`           | `http://localhost:5000`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                     |
    /// | `DEFAULT_EQUIPMENT_TYPE` | `L`                      |
    /// | `DEFAULT_PRODUCT_ID`     | `M14860`                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let model_path = std::env::var("MODEL_PATH")
            .unwrap_or_else(|_| "best_model.json".into())
            .into();

        let preprocessor_path = std::env::var("PREPROCESSOR_PATH")
            .unwrap_or_else(|_| "preprocessor.json".into())
            .into();

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let categorical_defaults = CategoricalDefaults {
            equipment_type: std::env::var("DEFAULT_EQUIPMENT_TYPE")
                .unwrap_or_else(|_| DEFAULT_EQUIPMENT_TYPE.into()),
            product_id: std::env::var("DEFAULT_PRODUCT_ID")
                .unwrap_or_else(|_| DEFAULT_PRODUCT_ID.into()),
        };

        Self {
            host,
            port,
            model_path,
            preprocessor_path,
            cors_origins,
            request_timeout_secs,
            categorical_defaults,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
