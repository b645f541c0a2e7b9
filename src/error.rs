// HTTP API Error Types
use axum::{extract::multipart::MultipartError, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::services::account_service::AccountError;
use crate::services::mail_relay::MailError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (mail relay and other upstreams)
    BadGateway {
        message: String,
        details: Option<Value>,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway { .. } => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "message": self.message(),
            "error": self.error_code()
        });

        match self {
            ApiError::ValidationError {
                field_errors: Some(field_errors),
                ..
            } => {
                response["field_errors"] = json!(field_errors);
            }
            ApiError::BadGateway {
                details: Some(details), ..
            } => {
                response["details"] = details.clone();
            }
            _ => {}
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway { .. } => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Single-field validation failure
    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ApiError::validation_error(message, Some(field_errors))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>, details: Option<Value>) -> Self {
        ApiError::BadGateway {
            message: message.into(),
            details,
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

/// Client message for a unique constraint, by constraint name
fn unique_violation_message(constraint: &str) -> String {
    let message = match constraint {
        "users_email_key" | "users_email_lower_key" | "users_clave_key" => "email or code already exists",
        "becas_nombre_pais_key" => "a scholarship with this name already exists in that country",
        "universidades_nombre_pais_key" => "a university with this name already exists in that country",
        "facultades_nombre_universidad_id_key" => "a faculty with this name already exists in that university",
        "carreras_nombre_facultad_id_key" => "a major with this name already exists in that faculty",
        "materias_nombre_carrera_id_key" => "a subject with this name already exists in that major",
        "visitantes_info_user_id_key" => "visitor information already exists for this user",
        _ => "record already exists",
    };
    message.to_string()
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::UniqueViolation { constraint } => ApiError::conflict(unique_violation_message(&constraint)),
            DatabaseError::ForeignKeyViolation { constraint } => {
                tracing::warn!("Foreign key violation: {}", constraint);
                ApiError::bad_request("referenced record does not exist")
            }
            DatabaseError::StillReferenced { constraint } => {
                tracing::warn!("Delete blocked by {}", constraint);
                ApiError::conflict("record is still referenced by other records")
            }
            DatabaseError::CheckViolation { constraint } => {
                tracing::warn!("Check violation: {}", constraint);
                ApiError::bad_request("value not allowed")
            }
            DatabaseError::ValueTooLong(detail) => {
                tracing::warn!("Rejected oversized value: {}", detail);
                ApiError::bad_request("a value exceeds the maximum allowed length")
            }
            DatabaseError::Filter(err) => err.into(),
            DatabaseError::ConfigMissing(name) => {
                tracing::error!("Database misconfigured: missing {}", name);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: invalid URL");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err @ (sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))) => {
                tracing::error!("Database unavailable: {}", sqlx_err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidValue { field, value } => {
                ApiError::field_error(field, format!("invalid value '{}'", value))
            }
            FilterError::UnsupportedField(field) => {
                ApiError::bad_request(format!("filter '{}' is not supported here", field))
            }
            FilterError::InvalidCombination => ApiError::bad_request("invalid query parameters"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::unauthorized("no token provided"),
            AuthError::InvalidToken => ApiError::unauthorized("invalid token"),
            AuthError::ExpiredToken => ApiError::unauthorized("expired token"),
            AuthError::InvalidCredentials => ApiError::unauthorized("invalid credentials"),
            AuthError::MissingSecret | AuthError::TokenGeneration(_) | AuthError::Hashing(_) => {
                tracing::error!("Auth failure: {}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Invalid { field, message } => ApiError::field_error(field, message),
            AccountError::Auth(e) => e.into(),
            AccountError::Database(e) => e.into(),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::TooLarge { size_mb, limit_mb } => ApiError::payload_too_large(format!(
                "PDF is too large ({:.2} MB, limit {:.2} MB)",
                size_mb, limit_mb
            )),
            MailError::NoResponse => ApiError::bad_gateway("mail server did not respond", None),
            MailError::Rejected(payload) => ApiError::bad_gateway("mail server rejected the message", Some(payload)),
            MailError::Transport(e) => {
                tracing::error!("Mail relay transport error: {}", e);
                ApiError::bad_gateway("could not reach the mail server", None)
            }
            MailError::MissingApiKey => {
                tracing::error!("Mail relay is not configured");
                ApiError::service_unavailable("mail service is not configured")
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::payload_too_large("request body is too large");
        }
        ApiError::bad_request(format!("invalid multipart body: {}", err.body_text()))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_code_and_message() {
        let body = ApiError::not_found("application not found").to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "application not found");
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[test]
    fn unique_violations_become_conflicts() {
        let err: ApiError = DatabaseError::UniqueViolation {
            constraint: "users_email_key".into(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.message(), "email or code already exists");

        let err: ApiError = DatabaseError::UniqueViolation {
            constraint: "becas_nombre_pais_key".into(),
        }
        .into();
        assert_eq!(err.message(), "a scholarship with this name already exists in that country");
    }

    #[test]
    fn foreign_key_violation_is_client_error() {
        let err: ApiError = DatabaseError::ForeignKeyViolation {
            constraint: "facultades_universidad_id_fkey".into(),
        }
        .into();
        assert_eq!(err.status_code(), 400);

        let err: ApiError = DatabaseError::StillReferenced {
            constraint: "facultades_universidad_id_fkey".into(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn oversized_text_is_a_client_error() {
        let err: ApiError = DatabaseError::ValueTooLong("value too long for type character varying(255)".into()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "a value exceeds the maximum allowed length");

        let err: ApiError = DatabaseError::UniqueViolation {
            constraint: "users_email_lower_key".into(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn bad_filter_value_names_the_field() {
        let err: ApiError = FilterError::InvalidValue {
            field: "universidad_id",
            value: "abc".into(),
        }
        .into();
        let body = err.to_json();
        assert_eq!(err.status_code(), 400);
        assert_eq!(body["field_errors"]["universidad_id"], "invalid value 'abc'");
    }

    #[test]
    fn rejected_mail_keeps_relay_payload() {
        let err: ApiError = MailError::Rejected(json!({"error": "cuota excedida"})).into();
        let body = err.to_json();
        assert_eq!(err.status_code(), 502);
        assert_eq!(body["details"]["error"], "cuota excedida");
    }

    #[test]
    fn oversized_pdf_reports_size() {
        let err: ApiError = MailError::TooLarge {
            size_mb: 2.5,
            limit_mb: 1.8,
        }
        .into();
        assert_eq!(err.status_code(), 413);
        assert!(err.message().contains("2.50 MB"));
    }
}
