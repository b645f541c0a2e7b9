// handlers/elevated/visitantes_info.rs - administrator listings under /api/visitantes-info

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::VisitanteInfoDetail;
use crate::database::repository::VisitanteInfoRepository;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::MobilityType;

/// GET /api/visitantes-info/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<VisitanteInfoDetail>> {
    Ok(ApiResponse::success(VisitanteInfoRepository::new(&state.db).get_all().await?))
}

/// GET /api/visitantes-info/tipo/:tipo - `visitante_nacional` or `visitante_internacional`
pub async fn by_tipo(State(state): State<AppState>, Path(tipo): Path<String>) -> ApiResult<Vec<VisitanteInfoDetail>> {
    let tipo = tipo
        .parse::<MobilityType>()
        .ok()
        .filter(MobilityType::is_visitor)
        .ok_or_else(|| ApiError::bad_request("tipo must be visitante_nacional or visitante_internacional"))?;
    Ok(ApiResponse::success(VisitanteInfoRepository::new(&state.db).get_by_tipo(tipo).await?))
}

/// GET /api/visitantes-info/:user_id
pub async fn show(State(state): State<AppState>, Path(user_id): Path<String>) -> ApiResult<VisitanteInfoDetail> {
    let user_id = parse_id(&user_id, "user")?;
    VisitanteInfoRepository::new(&state.db)
        .find_by_user(user_id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("visitor information not found"))
}
