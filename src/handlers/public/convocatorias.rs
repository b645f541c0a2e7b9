// handlers/public/convocatorias.rs - GET /api/convocatorias and GET /api/convocatorias/:id handlers

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::Convocatoria;
use crate::database::repository::ConvocatoriaRepository;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/convocatorias - newest announcement date first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Convocatoria>> {
    let rows = ConvocatoriaRepository::new(&state.db).get_all().await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/convocatorias/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Convocatoria> {
    let id = parse_id(&id, "convocatoria")?;
    ConvocatoriaRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("convocatoria not found"))
}
