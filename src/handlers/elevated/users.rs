// handlers/elevated/users.rs - administrator endpoints under /api/users

use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::User;
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::filter::{Filter, FilterField};
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{AccountInput, AccountService, ImportSummary};
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub users: Vec<AccountInput>,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub rol: Option<String>,
}

/// GET /api/users/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(UserRepository::new(&state.db).get_all().await?))
}

/// GET /api/users/search - placement filters from the query string
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<User>> {
    let filter = Filter::from_query(&query, FilterField::USER_PLACEMENT)?;
    Ok(ApiResponse::success(UserRepository::new(&state.db).search(&filter).await?))
}

/**
 * POST /api/users/import - bulk account creation
 *
 * Expected Input:
 * ```json
 * { "users": [ { "nombres": "Luis", "email": "luis@uaslp.mx", "password": "123456" } ] }
 * ```
 *
 * Each row stands alone; the response counts successes and failures and
 * explains every failed row.
 */
pub async fn import(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<ImportSummary> {
    if request.users.is_empty() {
        return Err(ApiError::bad_request("a non-empty list of users is required"));
    }

    tracing::info!("User {} importing {} accounts", admin.id, request.users.len());
    let summary = AccountService::new(&state.db).import(request.users).await;
    let message = format!("{} imported, {} failed", summary.successful, summary.failed);
    Ok(ApiResponse::success(summary).with_message(message))
}

/// PATCH /api/users/:id/rol
pub async fn update_role(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<RoleUpdate>,
) -> ApiResult<User> {
    let id = parse_id(&id, "user")?;
    let role = update
        .rol
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .ok_or_else(|| ApiError::field_error("rol", "invalid role"))?;

    let user = UserRepository::new(&state.db)
        .update_role(id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    tracing::info!("User {} set role of user {} to {}", admin.id, id, role.as_str());
    Ok(ApiResponse::success(user))
}
