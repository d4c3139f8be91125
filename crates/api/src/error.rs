use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mailsnap_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for conversion failures and adds the upload
/// validation failures that only exist at the HTTP boundary. Implements
/// [`IntoResponse`] to produce `{"error": "..."}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A conversion error from `mailsnap_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The multipart body has no `file` field.
    #[error("No file part")]
    MissingUpload,

    /// The `file` field carries an empty filename.
    #[error("No selected file")]
    EmptyFilename,

    /// The request body exceeded the configured upload limit.
    #[error("Uploaded file is too large")]
    UploadTooLarge,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // --- Upload validation ---
            AppError::MissingUpload | AppError::EmptyFilename => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::UploadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),

            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::UnsupportedFormat(_) => (
                    StatusCode::BAD_REQUEST,
                    "Unsupported file format".to_string(),
                ),
                CoreError::Parse(_) | CoreError::NoBodyFound => {
                    (StatusCode::UNPROCESSABLE_ENTITY, core.to_string())
                }
                CoreError::Scratch(_) | CoreError::Encode(_) => {
                    tracing::error!(error = %core, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
