use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid upload: {0}")]
    Upload(String),

    #[error("upload too large: {0}")]
    UploadTooLarge(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Common(#[from] plant_common::error::CommonError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::UploadTooLarge(e.body_text())
        } else {
            AppError::Upload(e.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, format!("Error: {self}")).into_response()
    }
}
