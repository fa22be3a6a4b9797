/// Turns an uploaded image into a displayable record.
///
/// The catalog only reports absence; choosing what to show instead is done here.
/// Any outcome other than a known label (no prediction, unknown label, classifier
/// failure) falls back to the maintenance placeholder record.
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::DiseaseCatalog;
use crate::classifier::Classifier;
use crate::error::CommonError;
use crate::model::{DiseaseRecord, Severity};

pub const PLACEHOLDER_CLASS_ID: &str = "__unavailable__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosisSource {
    /// The classifier produced a label found in the catalog.
    Classifier,
    /// No usable prediction; the placeholder record is shown.
    Placeholder,
}

#[derive(Debug, Clone, Copy)]
pub struct Diagnosis<'a> {
    pub record: &'a DiseaseRecord,
    pub source: DiagnosisSource,
    pub healthy: bool,
}

pub struct Diagnoser {
    catalog: Arc<DiseaseCatalog>,
    classifier: Arc<dyn Classifier>,
    placeholder: DiseaseRecord,
}

impl Diagnoser {
    pub fn new(catalog: Arc<DiseaseCatalog>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            catalog,
            classifier,
            placeholder: placeholder_record(),
        }
    }

    pub fn diagnose(&self, image: &[u8]) -> Diagnosis<'_> {
        let label = match self.classifier.classify(image) {
            Ok(Some(label)) => label,
            Ok(None) => {
                debug!(classifier = self.classifier.name(), "no prediction available");
                return self.fallback();
            }
            Err(e) => {
                warn!(
                    classifier = self.classifier.name(),
                    error = %e,
                    "classification failed, showing placeholder"
                );
                return self.fallback();
            }
        };

        match self.catalog.lookup(&label) {
            Ok(record) => Diagnosis {
                record,
                source: DiagnosisSource::Classifier,
                healthy: self.catalog.is_healthy(&label),
            },
            Err(CommonError::NotFound(_)) => {
                warn!(class_id = %label, "classifier emitted unknown label, showing placeholder");
                self.fallback()
            }
            Err(e) => {
                warn!(class_id = %label, error = %e, "catalog lookup failed, showing placeholder");
                self.fallback()
            }
        }
    }

    pub fn placeholder(&self) -> &DiseaseRecord {
        &self.placeholder
    }

    fn fallback(&self) -> Diagnosis<'_> {
        Diagnosis {
            record: &self.placeholder,
            source: DiagnosisSource::Placeholder,
            healthy: false,
        }
    }
}

fn placeholder_record() -> DiseaseRecord {
    DiseaseRecord {
        class_id: PLACEHOLDER_CLASS_ID.to_string(),
        name: "AI Analysis (Maintenance)".to_string(),
        description: "The AI detection engine is currently offline to save resources. \
                      Use the chatbot below for help!"
            .to_string(),
        treatment: vec![
            "Ensure proper watering".to_string(),
            "Check soil pH".to_string(),
            "Monitor for pests".to_string(),
        ],
        pesticide: None,
        severity: Severity::Unassessed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::OfflineClassifier;

    struct FixedClassifier(Result<Option<&'static str>, &'static str>);

    impl Classifier for FixedClassifier {
        fn classify(&self, _image: &[u8]) -> Result<Option<String>, CommonError> {
            match self.0 {
                Ok(label) => Ok(label.map(str::to_string)),
                Err(msg) => Err(CommonError::Classifier(msg.to_string())),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn diagnoser(classifier: impl Classifier + 'static) -> Diagnoser {
        let catalog = Arc::new(DiseaseCatalog::builtin().unwrap());
        Diagnoser::new(catalog, Arc::new(classifier))
    }

    #[test]
    fn offline_classifier_yields_placeholder() {
        let d = diagnoser(OfflineClassifier);
        let diagnosis = d.diagnose(b"png bytes");
        assert_eq!(diagnosis.source, DiagnosisSource::Placeholder);
        assert_eq!(diagnosis.record.name, "AI Analysis (Maintenance)");
        assert_eq!(diagnosis.record.severity, Severity::Unassessed);
        assert_eq!(diagnosis.record.treatment.len(), 3);
        assert!(!diagnosis.healthy);
    }

    #[test]
    fn known_label_resolves_to_catalog_record() {
        let d = diagnoser(FixedClassifier(Ok(Some("Potato_Late_blight"))));
        let diagnosis = d.diagnose(&[]);
        assert_eq!(diagnosis.source, DiagnosisSource::Classifier);
        assert_eq!(diagnosis.record.class_id, "Potato_Late_blight");
        assert!(!diagnosis.healthy);

        let d = diagnoser(FixedClassifier(Ok(Some("Grape_healthy"))));
        assert!(d.diagnose(&[]).healthy);
    }

    #[test]
    fn unknown_label_and_failures_fall_back() {
        let d = diagnoser(FixedClassifier(Ok(Some("Banana_mystery"))));
        let diagnosis = d.diagnose(&[]);
        assert_eq!(diagnosis.source, DiagnosisSource::Placeholder);
        assert_eq!(diagnosis.record, d.placeholder());

        let d = diagnoser(FixedClassifier(Err("model crashed")));
        assert_eq!(d.diagnose(&[]).source, DiagnosisSource::Placeholder);
    }
}
