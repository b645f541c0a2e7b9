// handlers/elevated/catalog.rs - POST, PUT and DELETE /api/catalogo/* handlers
//
// Administrator maintenance of the reference catalogs. A duplicate name
// answers 409, an unknown parent id 400. Universities and scholarships
// are keyed by (nombre, pais), so both are required.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::app::AppState;
use crate::database::models::{
    Beca, BecaInput, Carrera, CarreraInput, Facultad, FacultadInput, Materia, MateriaInput, Universidad,
    UniversidadInput,
};
use crate::database::repository::{
    BecaRepository, CarreraRepository, FacultadRepository, MateriaRepository, UniversidadRepository,
};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};

fn require_nombre(nombre: &str) -> Result<(), ApiError> {
    if nombre.trim().is_empty() {
        return Err(ApiError::field_error("nombre", "nombre is required"));
    }
    Ok(())
}

fn require_pais(pais: &Option<String>) -> Result<(), ApiError> {
    if pais.as_deref().map_or(true, |p| p.trim().is_empty()) {
        return Err(ApiError::field_error("pais", "pais is required"));
    }
    Ok(())
}

fn require_parent(id: Option<i32>, field: &str) -> Result<(), ApiError> {
    if id.is_none() {
        return Err(ApiError::field_error(field, format!("{} is required", field)));
    }
    Ok(())
}

fn deleted(found: bool, what: &str) -> ApiResult<()> {
    if !found {
        return Err(ApiError::not_found(format!("{} not found", what)));
    }
    tracing::info!("Deleted {}", what);
    Ok(ApiResponse::message(format!("{} deleted", what)))
}

// Universidades

pub async fn universidad_create(
    State(state): State<AppState>,
    Json(input): Json<UniversidadInput>,
) -> ApiResult<Universidad> {
    require_nombre(&input.nombre)?;
    require_pais(&input.pais)?;
    let row = UniversidadRepository::new(&state.db).create(&input).await?;
    Ok(ApiResponse::created(row))
}

pub async fn universidad_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UniversidadInput>,
) -> ApiResult<Universidad> {
    let id = parse_id(&id, "universidad")?;
    require_nombre(&input.nombre)?;
    require_pais(&input.pais)?;
    UniversidadRepository::new(&state.db)
        .update(id, &input)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("universidad not found"))
}

/// Cascades to the university's facultades, carreras and materias
pub async fn universidad_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, "universidad")?;
    deleted(UniversidadRepository::new(&state.db).delete(id).await?, "universidad")
}

// Facultades

pub async fn facultad_create(State(state): State<AppState>, Json(input): Json<FacultadInput>) -> ApiResult<Facultad> {
    require_nombre(&input.nombre)?;
    require_parent(input.universidad_id, "universidad_id")?;
    let row = FacultadRepository::new(&state.db).create(&input).await?;
    Ok(ApiResponse::created(row))
}

pub async fn facultad_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<FacultadInput>,
) -> ApiResult<Facultad> {
    let id = parse_id(&id, "facultad")?;
    require_nombre(&input.nombre)?;
    FacultadRepository::new(&state.db)
        .update(id, &input)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("facultad not found"))
}

pub async fn facultad_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, "facultad")?;
    deleted(FacultadRepository::new(&state.db).delete(id).await?, "facultad")
}

// Carreras

pub async fn carrera_create(State(state): State<AppState>, Json(input): Json<CarreraInput>) -> ApiResult<Carrera> {
    require_nombre(&input.nombre)?;
    require_parent(input.facultad_id, "facultad_id")?;
    let row = CarreraRepository::new(&state.db).create(&input).await?;
    Ok(ApiResponse::created(row))
}

pub async fn carrera_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CarreraInput>,
) -> ApiResult<Carrera> {
    let id = parse_id(&id, "carrera")?;
    require_nombre(&input.nombre)?;
    CarreraRepository::new(&state.db)
        .update(id, &input)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("carrera not found"))
}

pub async fn carrera_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, "carrera")?;
    deleted(CarreraRepository::new(&state.db).delete(id).await?, "carrera")
}

// Materias

pub async fn materia_create(State(state): State<AppState>, Json(input): Json<MateriaInput>) -> ApiResult<Materia> {
    require_nombre(&input.nombre)?;
    require_parent(input.carrera_id, "carrera_id")?;
    let row = MateriaRepository::new(&state.db).create(&input).await?;
    Ok(ApiResponse::created(row))
}

pub async fn materia_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MateriaInput>,
) -> ApiResult<Materia> {
    let id = parse_id(&id, "materia")?;
    require_nombre(&input.nombre)?;
    MateriaRepository::new(&state.db)
        .update(id, &input)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("materia not found"))
}

pub async fn materia_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, "materia")?;
    deleted(MateriaRepository::new(&state.db).delete(id).await?, "materia")
}

// Becas

pub async fn beca_create(State(state): State<AppState>, Json(input): Json<BecaInput>) -> ApiResult<Beca> {
    require_nombre(&input.nombre)?;
    require_pais(&input.pais)?;
    let row = BecaRepository::new(&state.db).create(&input).await?;
    Ok(ApiResponse::created(row))
}

pub async fn beca_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<BecaInput>,
) -> ApiResult<Beca> {
    let id = parse_id(&id, "beca")?;
    require_nombre(&input.nombre)?;
    require_pais(&input.pais)?;
    BecaRepository::new(&state.db)
        .update(id, &input)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("beca not found"))
}

pub async fn beca_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, "beca")?;
    deleted(BecaRepository::new(&state.db).delete(id).await?, "beca")
}
