// handlers/protected/visitantes_info.rs - visitor self-service under /api/visitantes-info
//
// POST /, GET /my-info and DELETE /:user_id. Only visiting students keep
// visitor information; the admin listings live in `elevated`.

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::app::AppState;
use crate::database::models::{VisitanteInfo, VisitanteInfoDetail, VisitanteInfoInput};
use crate::database::repository::VisitanteInfoRepository;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

fn require_visitor(user: &AuthUser) -> Result<(), ApiError> {
    match user.tipo_movilidad {
        Some(tipo) if tipo.is_visitor() => Ok(()),
        _ => Err(ApiError::forbidden(
            "only national and international visitors have visitor information",
        )),
    }
}

/// POST /api/visitantes-info - create or replace the caller's visitor information
pub async fn upsert(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<VisitanteInfoInput>,
) -> ApiResult<VisitanteInfo> {
    require_visitor(&user)?;
    let info = VisitanteInfoRepository::new(&state.db).upsert(user.id, &input).await?;
    Ok(ApiResponse::success(info).with_message("visitor information saved"))
}

/// GET /api/visitantes-info/my-info - `data` is null until the visitor fills it in
pub async fn mine(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Option<VisitanteInfoDetail>> {
    require_visitor(&user)?;
    let info = VisitanteInfoRepository::new(&state.db).find_by_user(user.id).await?;
    Ok(ApiResponse::success(info))
}

/// DELETE /api/visitantes-info/:user_id - owner or administrator
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<()> {
    let user_id = parse_id(&user_id, "user")?;
    if !user.can_act_for(user_id) {
        return Err(ApiError::forbidden("insufficient permissions"));
    }

    if !VisitanteInfoRepository::new(&state.db).delete(user_id).await? {
        return Err(ApiError::not_found("visitor information not found"));
    }
    tracing::info!("User {} deleted visitor information of user {}", user.id, user_id);
    Ok(ApiResponse::message("visitor information deleted"))
}
