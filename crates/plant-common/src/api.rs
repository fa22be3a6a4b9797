use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{DiseaseRecord, Severity};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ChatRequest {
    /// Free-text question from the user. Missing or null is treated as empty.
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDiseaseParams {
    /// Classifier label such as "Tomato_Late_blight". Matched exactly.
    pub class_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiseaseSummary {
    pub class_id: String,
    pub name: String,
    pub severity: Severity,
    pub healthy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiseaseListResponse {
    pub diseases: Vec<DiseaseSummary>,
}

impl DiseaseSummary {
    pub fn from_record(record: &DiseaseRecord, healthy: bool) -> Self {
        Self {
            class_id: record.class_id.clone(),
            name: record.name.clone(),
            severity: record.severity,
            healthy,
        }
    }
}
