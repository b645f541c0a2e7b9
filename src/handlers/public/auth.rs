// handlers/public/auth.rs - POST /api/auth/register and POST /api/auth/login handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::issue_token;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AccountInput, AccountService};

/// Token plus the user it was issued for
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or clave
    #[serde(alias = "email", alias = "clave")]
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/**
 * POST /api/auth/register - Create a student account and sign it in
 *
 * Expected Input:
 * ```json
 * {
 *   "nombres": "Ana",
 *   "apellidos": "Ruiz López",
 *   "clave": "123456",
 *   "email": "a123456@alumnos.uaslp.mx",
 *   "password": "secret1"
 * }
 * ```
 *
 * Responds 201 with `{user, token}`; 409 when the email or clave is taken.
 */
pub async fn register(State(state): State<AppState>, Json(input): Json<AccountInput>) -> ApiResult<AuthPayload> {
    let user = AccountService::new(&state.db).register(input).await?;
    let token = issue_token(&state.config, user.id)?;

    tracing::info!("Registered user {} <{}>", user.id, user.email);
    Ok(ApiResponse::created(AuthPayload { user, token }).with_message("user registered"))
}

/// POST /api/auth/login - exchange an email or clave and password for a token
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<AuthPayload> {
    let identifier = request.identifier.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();
    if identifier.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("identifier and password are required"));
    }

    let user = AccountService::new(&state.db).authenticate(identifier, password).await?;
    let token = issue_token(&state.config, user.id)?;

    tracing::info!("User {} logged in", user.id);
    Ok(ApiResponse::success(AuthPayload { user, token }).with_message("login successful"))
}
