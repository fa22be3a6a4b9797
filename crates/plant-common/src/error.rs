/// Error types shared by the plant knowledge crates.
///
/// Lookup misses and malformed data documents are reported here. Server-specific
/// failures (uploads, configuration) live in the server crate and wrap `CommonError`
/// via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("disease class not found: {0}")]
    NotFound(String),

    #[error("invalid data: {0}")]
    Data(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("classifier error: {0}")]
    Classifier(String),
}
