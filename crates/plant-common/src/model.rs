use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Display record for one crop/disease combination (or a healthy state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiseaseRecord {
    /// Classifier label, e.g. "Tomato_Late_blight", "Apple_healthy"
    pub class_id: String,
    /// Human-readable title, e.g. "Tomato Late Blight"
    pub name: String,
    /// One-sentence summary of the condition
    pub description: String,
    /// Ordered, short imperative treatment steps
    pub treatment: Vec<String>,
    /// Chemical and organic product guidance. Absent only on the placeholder record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pesticide: Option<PesticideGuidance>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PesticideGuidance {
    pub chemical: Product,
    pub organic: Product,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    pub name: String,
    pub usage: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Severity {
    None,
    Moderate,
    High,
    Severe,
    /// Not assessed. Only used when no diagnosis is available.
    #[serde(rename = "N/A")]
    Unassessed,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::None => "None",
            Severity::Moderate => "Moderate",
            Severity::High => "High",
            Severity::Severe => "Severe",
            Severity::Unassessed => "N/A",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical question phrasing paired with a fixed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}
