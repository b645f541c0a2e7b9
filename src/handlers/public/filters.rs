// handlers/public/filters.rs - GET /api/filters/* handlers
//
// `{id, nombre}` pairs for dropdowns, ordered by nombre.

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::CatalogRef;
use crate::database::repository::{BecaRepository, CarreraRepository, FacultadRepository, UniversidadRepository};
use crate::middleware::{ApiResponse, ApiResult};

pub async fn universidades(State(state): State<AppState>) -> ApiResult<Vec<CatalogRef>> {
    Ok(ApiResponse::success(UniversidadRepository::new(&state.db).options().await?))
}

pub async fn facultades(State(state): State<AppState>) -> ApiResult<Vec<CatalogRef>> {
    Ok(ApiResponse::success(FacultadRepository::new(&state.db).options().await?))
}

pub async fn carreras(State(state): State<AppState>) -> ApiResult<Vec<CatalogRef>> {
    Ok(ApiResponse::success(CarreraRepository::new(&state.db).options().await?))
}

pub async fn becas(State(state): State<AppState>) -> ApiResult<Vec<CatalogRef>> {
    Ok(ApiResponse::success(BecaRepository::new(&state.db).options().await?))
}
