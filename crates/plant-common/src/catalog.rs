/// Immutable disease-information catalog keyed by classifier label.
///
/// The catalog is built once at startup from a JSON document (the embedded
/// `data/diseases.json` unless overridden) and is read-only afterwards, so it can be
/// shared across request handlers behind an `Arc` without locking.
///
/// Loading enforces that every label in `CLASS_LABELS` has a record. A classifier can
/// therefore never emit a label the catalog cannot display, and `lookup` misses only
/// happen for input that did not come from the classifier.
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::CommonError;
use crate::model::DiseaseRecord;

const BUILTIN_CATALOG: &str = include_str!("../data/diseases.json");

/// Labels emitted by the plant disease classifier, in output-index order.
pub const CLASS_LABELS: [&str; 38] = [
    "Apple_Apple_scab",
    "Apple_Black_rot",
    "Apple_Cedar_apple_rust",
    "Apple_healthy",
    "Blueberry_healthy",
    "Cherry_(including_sour)_Powdery_mildew",
    "Cherry_(including_sour)_healthy",
    "Corn_(maize)_Cercospora_leaf_spot_Gray_leaf_spot",
    "Corn_(maize)_Common_rust",
    "Corn_(maize)_Northern_Leaf_Blight",
    "Corn_(maize)_healthy",
    "Grape_Black_rot",
    "Grape_Esca_(Black_Measles)",
    "Grape_Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape_healthy",
    "Orange_Haunglongbing_(Citrus_greening)",
    "Peach_Bacterial_spot",
    "Peach_healthy",
    "Pepper,_bell_Bacterial_spot",
    "Pepper,_bell_healthy",
    "Potato_Early_blight",
    "Potato_Late_blight",
    "Potato_healthy",
    "Raspberry_healthy",
    "Soybean_healthy",
    "Squash_Powdery_mildew",
    "Strawberry_Leaf_scorch",
    "Strawberry_healthy",
    "Tomato_Bacterial_spot",
    "Tomato_Early_blight",
    "Tomato_Late_blight",
    "Tomato_Leaf_Mold",
    "Tomato_Septoria_leaf_spot",
    "Tomato_Spider_mites_Two-spotted_spider_mite",
    "Tomato_Target_Spot",
    "Tomato_Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato_Tomato_mosaic_virus",
    "Tomato_healthy",
];

/// Labels that denote a healthy plant rather than a disease.
pub const HEALTHY_LABELS: [&str; 12] = [
    "Apple_healthy",
    "Blueberry_healthy",
    "Cherry_(including_sour)_healthy",
    "Corn_(maize)_healthy",
    "Grape_healthy",
    "Peach_healthy",
    "Pepper,_bell_healthy",
    "Potato_healthy",
    "Raspberry_healthy",
    "Soybean_healthy",
    "Strawberry_healthy",
    "Tomato_healthy",
];

/// Map a classifier output index to its label.
pub fn label_for_index(index: usize) -> Option<&'static str> {
    CLASS_LABELS.get(index).copied()
}

#[derive(Debug)]
pub struct DiseaseCatalog {
    records: Vec<DiseaseRecord>,
    index: HashMap<String, usize>,
}

impl DiseaseCatalog {
    /// Load the catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CommonError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a catalog document: a JSON array of `DiseaseRecord`s.
    ///
    /// Fails on duplicate class ids, records with no treatment steps, and documents
    /// missing any classifier label.
    pub fn from_json(content: &str) -> Result<Self, CommonError> {
        let records: Vec<DiseaseRecord> = serde_json::from_str(content)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<DiseaseRecord>) -> Result<Self, CommonError> {
        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if record.treatment.is_empty() {
                return Err(CommonError::Data(format!(
                    "record '{}' has no treatment steps",
                    record.class_id
                )));
            }
            if index.insert(record.class_id.clone(), pos).is_some() {
                return Err(CommonError::Data(format!(
                    "duplicate class id '{}'",
                    record.class_id
                )));
            }
        }

        let missing: Vec<&str> = CLASS_LABELS
            .iter()
            .copied()
            .filter(|label| !index.contains_key(*label))
            .collect();
        if !missing.is_empty() {
            return Err(CommonError::Data(format!(
                "catalog is missing classifier labels: {}",
                missing.join(", ")
            )));
        }

        debug!(records = records.len(), "disease catalog loaded");
        Ok(Self { records, index })
    }

    /// Exact-match lookup. No case folding or trimming is applied to `class_id`.
    pub fn lookup(&self, class_id: &str) -> Result<&DiseaseRecord, CommonError> {
        self.index
            .get(class_id)
            .map(|&pos| &self.records[pos])
            .ok_or_else(|| CommonError::NotFound(class_id.to_string()))
    }

    pub fn is_healthy(&self, class_id: &str) -> bool {
        HEALTHY_LABELS.contains(&class_id)
    }

    /// All records in declaration order.
    pub fn list(&self) -> &[DiseaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Class ids present in the catalog but not emitted by the classifier.
    pub fn extra_labels(&self) -> Vec<&str> {
        let known: HashSet<&str> = CLASS_LABELS.iter().copied().collect();
        self.records
            .iter()
            .map(|r| r.class_id.as_str())
            .filter(|id| !known.contains(id))
            .collect()
    }
}
