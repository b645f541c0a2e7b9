// handlers/protected/users.rs - per-user endpoints under /api/users/:id
//
// GET /:id, PATCH /:id/field and PATCH /:id/password. Updates are allowed
// for the account owner or an administrator.

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::auth::validation::{is_valid_clave, is_valid_email};
use crate::database::models::{User, UserDetail, UserField};
use crate::database::repository::UserRepository;
use crate::database::SqlParam;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::AccountService;
use crate::types::MobilityType;

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub field: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// GET /api/users/:id - user with catalog references resolved
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserDetail> {
    let id = parse_id(&id, "user")?;
    UserRepository::new(&state.db)
        .find_detail(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("user not found"))
}

/// PATCH /api/users/:id/field - set one allow-listed column
pub async fn update_field(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> ApiResult<User> {
    let id = parse_id(&id, "user")?;
    if !caller.can_act_for(id) {
        return Err(ApiError::forbidden("you can only update your own account"));
    }

    let name = update.field.as_deref().unwrap_or_default();
    let field = UserField::parse(name)
        .ok_or_else(|| ApiError::field_error("field", format!("field '{}' cannot be updated", name)))?;
    let value = field_value(field, &update.value)?;

    let user = UserRepository::new(&state.db)
        .update_field(id, field, value)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    tracing::info!("User {} updated {} of user {}", caller.id, field.column(), id);
    Ok(ApiResponse::success(user))
}

/// PATCH /api/users/:id/password - the old password is required unless an admin resets someone else's
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(change): Json<PasswordChange>,
) -> ApiResult<()> {
    let id = parse_id(&id, "user")?;
    if !caller.can_act_for(id) {
        return Err(ApiError::forbidden("you can only change your own password"));
    }

    let new_password = change.new_password.unwrap_or_default();
    let admin_reset = caller.is_admin() && caller.id != id;

    let changed = AccountService::new(&state.db)
        .change_password(id, change.old_password.as_deref(), &new_password, admin_reset)
        .await?;
    if !changed {
        return Err(ApiError::not_found("user not found"));
    }

    tracing::info!("Password of user {} changed by user {}", id, caller.id);
    Ok(ApiResponse::message("password updated"))
}

/// Convert a JSON value into the typed parameter for `field`
fn field_value(field: UserField, value: &Value) -> Result<SqlParam, ApiError> {
    let invalid = |message: &str| ApiError::field_error("value", message.to_string());

    if field.is_reference() {
        return match value {
            Value::Null => Ok(SqlParam::Int(None)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(SqlParam::from)
                .ok_or_else(|| invalid("expected an id")),
            Value::String(s) if s.trim().is_empty() => Ok(SqlParam::Int(None)),
            Value::String(s) => s.trim().parse::<i32>().map(SqlParam::from).map_err(|_| invalid("expected an id")),
            _ => Err(invalid("expected an id")),
        };
    }

    let text = match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => return Err(invalid("expected text")),
    };

    let Some(text) = text else {
        if field.is_required() {
            return Err(invalid(&format!("{} cannot be empty", field.column())));
        }
        return Ok(SqlParam::Text(None));
    };

    match field {
        UserField::TipoMovilidad => {
            let tipo = text.parse::<MobilityType>().map_err(|_| invalid("invalid tipo_movilidad"))?;
            Ok(SqlParam::from(tipo.as_str()))
        }
        UserField::Clave if !is_valid_clave(&text) => Err(invalid("clave must be exactly 6 digits")),
        UserField::Email if !is_valid_email(&text) => Err(invalid("invalid email format")),
        UserField::Email => Ok(SqlParam::from(text.to_lowercase())),
        _ => Ok(SqlParam::from(text)),
    }
}
