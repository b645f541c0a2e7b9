// handlers/public/catalog.rs - GET /api/catalogo/* handlers
//
// Lists and single rows of the five reference catalogs, plus the nested
// universidad → facultades → carreras → materias listings.

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::{Beca, Carrera, Facultad, Materia, Universidad};
use crate::database::repository::{
    BecaRepository, CarreraRepository, FacultadRepository, MateriaRepository, UniversidadRepository,
};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/catalogo/universidades
pub async fn universidades_list(State(state): State<AppState>) -> ApiResult<Vec<Universidad>> {
    let rows = UniversidadRepository::new(&state.db).get_all().await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/catalogo/universidades/:id
pub async fn universidad_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Universidad> {
    let id = parse_id(&id, "universidad")?;
    UniversidadRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("universidad not found"))
}

/// GET /api/catalogo/universidades/:id/facultades
pub async fn universidad_facultades(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Facultad>> {
    let id = parse_id(&id, "universidad")?;
    if UniversidadRepository::new(&state.db).find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("universidad not found"));
    }
    let rows = FacultadRepository::new(&state.db).get_all(Some(id)).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/catalogo/facultades
pub async fn facultades_list(State(state): State<AppState>) -> ApiResult<Vec<Facultad>> {
    let rows = FacultadRepository::new(&state.db).get_all(None).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/catalogo/facultades/:id
pub async fn facultad_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Facultad> {
    let id = parse_id(&id, "facultad")?;
    FacultadRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("facultad not found"))
}

/// GET /api/catalogo/facultades/:id/carreras
pub async fn facultad_carreras(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Carrera>> {
    let id = parse_id(&id, "facultad")?;
    if FacultadRepository::new(&state.db).find_ref(id).await?.is_none() {
        return Err(ApiError::not_found("facultad not found"));
    }
    let rows = CarreraRepository::new(&state.db).get_all(Some(id)).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/catalogo/carreras
pub async fn carreras_list(State(state): State<AppState>) -> ApiResult<Vec<Carrera>> {
    let rows = CarreraRepository::new(&state.db).get_all(None).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/catalogo/carreras/:id
pub async fn carrera_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Carrera> {
    let id = parse_id(&id, "carrera")?;
    CarreraRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("carrera not found"))
}

/// GET /api/catalogo/carreras/:id/materias
pub async fn carrera_materias(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Materia>> {
    let id = parse_id(&id, "carrera")?;
    if CarreraRepository::new(&state.db).find_ref(id).await?.is_none() {
        return Err(ApiError::not_found("carrera not found"));
    }
    let rows = MateriaRepository::new(&state.db).get_all(Some(id)).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/catalogo/materias
pub async fn materias_list(State(state): State<AppState>) -> ApiResult<Vec<Materia>> {
    let rows = MateriaRepository::new(&state.db).get_all(None).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/catalogo/materias/:id
pub async fn materia_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Materia> {
    let id = parse_id(&id, "materia")?;
    MateriaRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("materia not found"))
}

/// GET /api/catalogo/becas
pub async fn becas_list(State(state): State<AppState>) -> ApiResult<Vec<Beca>> {
    let rows = BecaRepository::new(&state.db).get_all().await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/catalogo/becas/:id
pub async fn beca_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Beca> {
    let id = parse_id(&id, "beca")?;
    BecaRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("beca not found"))
}
