use crate::error::CommonError;

/// Image classifier seam: turns uploaded image bytes into a catalog class id.
///
/// `Ok(None)` means no prediction is available (for example, the model is offline).
/// Implementations must be callable concurrently from request handlers.
pub trait Classifier: Send + Sync {
    fn classify(&self, image: &[u8]) -> Result<Option<String>, CommonError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

/// Classifier used while no detection model is deployed. Never predicts.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClassifier;

impl Classifier for OfflineClassifier {
    fn classify(&self, _image: &[u8]) -> Result<Option<String>, CommonError> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "offline"
    }
}
