// handlers/elevated/send_pdf.rs - POST /api/stats/send-pdf handler

use axum::extract::{Extension, Multipart, State};
use serde_json::Value;

use crate::api::MultipartForm;
use crate::app::AppState;
use crate::auth::validation::is_valid_email;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::mail_relay::{send_pdf_report, MailReceipt};
use crate::services::PdfReport;

/**
 * POST /api/stats/send-pdf - mail a chart PDF through the institutional relay
 *
 * Multipart fields:
 * - `pdf`: the document (required)
 * - `email`: recipient (required)
 * - `dataset`: label shown in the body (optional)
 * - `filters`: JSON object of applied filters (optional)
 *
 * Oversized documents are recompressed before the size limit is enforced.
 *
 * Response:
 * ```json
 * { "success": true, "message": "PDF sent to ana@uaslp.mx",
 *   "data": { "threadId": "abc", "estado": "En cola", "destino": "ana@uaslp.mx" } }
 * ```
 */
pub async fn send_pdf(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<MailReceipt> {
    let form = MultipartForm::collect(multipart).await?;

    let pdf = form
        .file("pdf")
        .ok_or_else(|| ApiError::field_error("pdf", "a PDF file is required"))?;
    let email = form.require("email")?;
    if !is_valid_email(&email) {
        return Err(ApiError::field_error("email", "invalid email format"));
    }

    let filters = match form.text("filters") {
        Some(raw) => Some(
            serde_json::from_str::<Value>(&raw)
                .map_err(|_| ApiError::field_error("filters", "filters must be a JSON object"))?,
        ),
        None => None,
    };

    let report = PdfReport {
        pdf: pdf.bytes.to_vec(),
        email,
        dataset: form.text("dataset"),
        filters,
    };

    tracing::info!("User {} requested a PDF report by mail", user.id);
    let receipt = send_pdf_report(state.mail.as_ref(), &state.config.mail, report).await?;
    let message = format!("PDF sent to {}", receipt.destino);
    Ok(ApiResponse::success(receipt).with_message(message))
}
