//! Handler for the `/converter` resource.
//!
//! Accepts a multipart upload of a `.msg` or `.eml` file and answers with the
//! message body rendered as a JPEG.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use mailsnap_core::convert::{convert_upload, ScratchTarget};
use mailsnap_core::format::EmailFormat;
use mailsnap_core::render::CONTENT_TYPE;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the email file.
pub const UPLOAD_FIELD: &str = "file";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// A validated upload: known format, bytes not yet parsed.
struct Upload {
    filename: String,
    format: EmailFormat,
    bytes: Bytes,
}

/// POST /converter
///
/// Validate the upload, extract the email body, and return it as an
/// `image/jpeg`. Extraction and rendering run on the blocking pool.
pub async fn convert_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    // A request that is not multipart at all carries no file part.
    let mut multipart = multipart.map_err(|_| AppError::MissingUpload)?;

    let Upload {
        filename,
        format,
        bytes,
    } = read_upload(&mut multipart).await?;
    tracing::info!(%filename, %format, size = bytes.len(), "Accepted email upload");

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let config = Arc::clone(&state.config);

    let image = tokio::task::spawn_blocking(move || {
        convert_upload(
            format,
            &bytes,
            ScratchTarget {
                root: &config.scratch_dir,
                tag: &request_id,
            },
            &config.render,
        )
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Conversion task failed: {e}")))??;

    if image.truncated {
        tracing::warn!(
            lines = image.lines,
            height = image.height,
            "Body exceeds the maximum image height, output truncated"
        );
    }
    tracing::info!(
        width = image.width,
        height = image.height,
        lines = image.lines,
        "Rendered email body"
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        image.bytes,
    ))
}

/// Find the `file` field and validate its filename before reading the bytes.
async fn read_upload(multipart: &mut Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // A plain form value named `file` is not a file part.
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if filename.is_empty() {
            return Err(AppError::EmptyFilename);
        }
        let format = EmailFormat::from_filename(&filename)?;

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload {
            filename,
            format,
            bytes,
        });
    }

    Err(AppError::MissingUpload)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge
    } else {
        AppError::BadRequest(err.body_text())
    }
}
