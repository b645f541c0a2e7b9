// handlers/protected/auth.rs - GET /api/auth/profile and GET /api/auth/verify handlers

use axum::extract::{Extension, State};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::User;
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/profile - the caller's account, without the password hash
pub async fn profile(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<User> {
    UserRepository::new(&state.db)
        .find_by_id(user.id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("user not found"))
}

/// GET /api/auth/verify - the token is valid and the user still exists
pub async fn verify(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "valid": true,
        "user": {
            "id": user.id,
            "clave": user.clave,
            "rol": user.rol,
            "tipo_movilidad": user.tipo_movilidad,
        }
    })))
}
