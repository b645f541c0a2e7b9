// handlers/public/download.rs - GET /download/:filename handler

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::api::upload::sanitize_download_name;
use crate::app::AppState;
use crate::error::ApiError;

/// GET /download/:filename - stream an uploaded file as an attachment
pub async fn download(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Response, ApiError> {
    let name = sanitize_download_name(&filename).ok_or_else(|| ApiError::bad_request("invalid file name"))?;
    let path = state.config.api.uploads_dir.join(name);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ApiError::not_found("file not found")),
        Err(e) => {
            tracing::error!("Cannot read {}: {}", path.display(), e);
            return Err(ApiError::internal_server_error("could not read the file"));
        }
    };

    let mime = mime_guess::from_path(name).first_or_octet_stream();
    let content_type =
        HeaderValue::from_str(mime.as_ref()).unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name.replace('"', "")))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(bytes),
    )
        .into_response())
}
