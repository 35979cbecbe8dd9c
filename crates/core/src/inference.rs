//! The inference service: holds the loaded artifacts and scores requests.

use std::path::Path;
use std::sync::OnceLock;

use crate::artifacts;
use crate::classifier::Classifier;
use crate::error::CoreError;
use crate::features::{CategoricalDefaults, FeatureRecord, SensorReadings};
use crate::prediction::{PredictionResult, FAILURE_CLASS_INDEX};
use crate::preprocessing::Preprocessor;

/// A preprocessor and classifier installed together.
struct LoadedModel {
    preprocessor: Box<dyn Preprocessor>,
    classifier: Box<dyn Classifier>,
}

/// Scores sensor readings with the loaded artifacts.
///
/// Starts unloaded; [`InferenceService::load`] or [`InferenceService::install`]
/// sets the artifacts exactly once. After that the service is read-only and
/// can be shared across request tasks behind an `Arc` without locking.
pub struct InferenceService {
    defaults: CategoricalDefaults,
    model: OnceLock<LoadedModel>,
}

impl InferenceService {
    pub fn new(defaults: CategoricalDefaults) -> Self {
        Self {
            defaults,
            model: OnceLock::new(),
        }
    }

    /// Whether artifacts have been installed.
    pub fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }

    /// Load both artifacts from disk and install them.
    pub async fn load(
        &self,
        model_path: impl AsRef<Path>,
        preprocessor_path: impl AsRef<Path>,
    ) -> Result<(), CoreError> {
        let loaded = artifacts::load(model_path, preprocessor_path).await?;
        self.install(loaded.preprocessor, loaded.classifier)
    }

    /// Install an already-built preprocessor and classifier.
    ///
    /// Fails if artifacts were installed before; there is no reload.
    pub fn install(
        &self,
        preprocessor: impl Preprocessor + 'static,
        classifier: impl Classifier + 'static,
    ) -> Result<(), CoreError> {
        self.model
            .set(LoadedModel {
                preprocessor: Box::new(preprocessor),
                classifier: Box::new(classifier),
            })
            .map_err(|_| CoreError::Internal("Model already loaded".to_string()))
    }

    /// Build the single Feature Record for a request.
    ///
    /// The categorical columns always come from the configured defaults.
    pub fn build_record(&self, readings: SensorReadings) -> FeatureRecord {
        FeatureRecord::new(readings, &self.defaults)
    }

    /// Check readiness, validate a raw JSON body, then predict.
    pub fn predict_json(&self, body: &[u8]) -> Result<PredictionResult, CoreError> {
        if !self.is_ready() {
            return Err(CoreError::NotReady);
        }
        let readings = SensorReadings::from_json_slice(body)?;
        self.predict(readings)
    }

    /// Score one set of readings.
    pub fn predict(&self, readings: SensorReadings) -> Result<PredictionResult, CoreError> {
        let model = self.model.get().ok_or(CoreError::NotReady)?;
        let record = self.build_record(readings);

        let result = model
            .preprocessor
            .transform(&record)
            .and_then(|features| model.classifier.predict_proba(&features))
            .and_then(|probabilities| {
                PredictionResult::from_probability(probabilities[FAILURE_CLASS_INDEX])
            });

        match &result {
            Ok(r) => tracing::debug!(
                probability = r.probability,
                maintenance_recommended = r.maintenance_recommended,
                "Prediction complete"
            ),
            Err(e) => tracing::warn!(error = %e, "Error in predict"),
        }
        result
    }
}

impl Default for InferenceService {
    fn default() -> Self {
        Self::new(CategoricalDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::classifier::ClassProbabilities;
    use crate::features::{ColumnValue, EQUIPMENT_TYPE, PRODUCT_ID};

    struct FixedClassifier(f64);

    impl Classifier for FixedClassifier {
        fn predict_proba(&self, _features: &[f64]) -> Result<ClassProbabilities, CoreError> {
            Ok([1.0 - self.0, self.0])
        }
    }

    /// Records every Feature Record it sees and passes the numeric cells through.
    #[derive(Default)]
    struct RecordingPreprocessor {
        seen: std::sync::Arc<Mutex<Vec<FeatureRecord>>>,
    }

    impl Preprocessor for RecordingPreprocessor {
        fn transform(&self, record: &FeatureRecord) -> Result<Vec<f64>, CoreError> {
            self.seen.lock().unwrap().push(record.clone());
            Ok(record.numeric_values().to_vec())
        }
    }

    struct FailingPreprocessor;

    impl Preprocessor for FailingPreprocessor {
        fn transform(&self, _record: &FeatureRecord) -> Result<Vec<f64>, CoreError> {
            Err(CoreError::Inference("shape mismatch".to_string()))
        }
    }

    fn readings() -> SensorReadings {
        SensorReadings {
            air_temperature: 300.0,
            process_temperature: 310.0,
            rotational_speed: 1500.0,
            torque: 40.0,
            tool_wear: 10.0,
        }
    }

    #[test]
    fn predict_before_load_is_not_ready() {
        let service = InferenceService::default();
        assert!(!service.is_ready());
        assert_matches!(service.predict(readings()), Err(CoreError::NotReady));
    }

    #[test]
    fn not_ready_wins_over_invalid_input() {
        let service = InferenceService::default();
        assert_matches!(service.predict_json(b"not json"), Err(CoreError::NotReady));
    }

    #[test]
    fn high_probability_recommends_maintenance() {
        let service = InferenceService::default();
        service
            .install(RecordingPreprocessor::default(), FixedClassifier(0.9))
            .unwrap();
        assert!(service.is_ready());

        let result = service.predict(readings()).unwrap();
        assert_eq!(
            result,
            PredictionResult {
                prediction: true,
                probability: 0.9,
                maintenance_recommended: true,
            }
        );
    }

    #[test]
    fn low_probability_is_healthy() {
        let service = InferenceService::default();
        service
            .install(RecordingPreprocessor::default(), FixedClassifier(0.1))
            .unwrap();

        let result = service.predict(readings()).unwrap();
        assert!(!result.prediction);
        assert!(!result.maintenance_recommended);
        assert_eq!(result.probability, 0.1);
    }

    #[test]
    fn caller_categoricals_are_ignored() {
        let preprocessor = RecordingPreprocessor::default();
        let seen = std::sync::Arc::clone(&preprocessor.seen);
        let service = InferenceService::default();
        service.install(preprocessor, FixedClassifier(0.5)).unwrap();

        let body = br#"{
            "Air temperature [K]": 300, "Process temperature [K]": 310,
            "Rotational speed [rpm]": 1500, "Torque [Nm]": 40, "Tool wear [min]": 10,
            "Type": "H", "Product ID": "H29424"
        }"#;
        service.predict_json(body).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].value(EQUIPMENT_TYPE), Some(ColumnValue::Categorical("L")));
        assert_eq!(seen[0].value(PRODUCT_ID), Some(ColumnValue::Categorical("M14860")));
    }

    #[test]
    fn transform_failure_propagates() {
        let service = InferenceService::default();
        service
            .install(FailingPreprocessor, FixedClassifier(0.9))
            .unwrap();

        assert_matches!(
            service.predict(readings()),
            Err(CoreError::Inference(msg)) if msg == "shape mismatch"
        );
    }

    #[test]
    fn out_of_range_probability_is_an_inference_error() {
        let service = InferenceService::default();
        service
            .install(RecordingPreprocessor::default(), FixedClassifier(1.5))
            .unwrap();
        assert_matches!(service.predict(readings()), Err(CoreError::Inference(_)));
    }

    #[test]
    fn second_install_is_rejected() {
        let service = InferenceService::default();
        service
            .install(RecordingPreprocessor::default(), FixedClassifier(0.2))
            .unwrap();
        assert_matches!(
            service.install(RecordingPreprocessor::default(), FixedClassifier(0.9)),
            Err(CoreError::Internal(_))
        );
        assert_eq!(service.predict(readings()).unwrap().probability, 0.2);
    }

    #[tokio::test]
    async fn failed_load_installs_nothing() {
        let mut model = NamedTempFile::new().unwrap();
        let model_json = json!({
            "format_version": 1,
            "kind": "logistic_regression",
            "coefficients": vec![0.01; 8],
            "intercept": -2.0
        });
        model.write_all(model_json.to_string().as_bytes()).unwrap();

        let mut preprocessor = NamedTempFile::new().unwrap();
        preprocessor.write_all(b"{\"format_version\": 1, ").unwrap();

        let service = InferenceService::default();
        let result = service.load(model.path(), preprocessor.path()).await;

        assert_matches!(result, Err(CoreError::Artifact { .. }));
        assert!(!service.is_ready());
        assert_matches!(service.predict(readings()), Err(CoreError::NotReady));
    }
}
